//! Node configuration
//!
//! The service base URL and transport limits are injected here instead of
//! being baked into the client, so tests can point the node at a local mock.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Production Datawing host
pub const DEFAULT_BASE_URL: &str = "http://nuwa.datawing.zhangyou.com";

/// Name used when the node input is left blank
pub const DEFAULT_NAME: &str = "datawing";

/// JPEG quality matching the usual image-library default
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Datawing node configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatawingConfig {
    /// Service base URL, without trailing slash
    pub base_url: String,
    /// Whole-request timeout in milliseconds; `None` waits indefinitely
    pub request_timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds; `None` uses the transport default
    pub connect_timeout_ms: Option<u64>,
    /// JPEG quality (1..=100)
    pub jpeg_quality: u8,
    /// Name substituted when the `name` input is empty
    pub default_name: String,
}

impl DatawingConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    /// With connect timeout
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    /// With JPEG quality
    #[inline]
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// With default upload name
    #[inline]
    #[must_use]
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error on TOML syntax errors, unknown keys, or invalid values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        config.base_url = normalize_base_url(config.base_url);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not parse
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check field constraints
    ///
    /// # Errors
    /// Returns error if the base URL is not absolute http(s), quality is out of
    /// range, or a timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout("request_timeout_ms"));
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout("connect_timeout_ms"));
        }
        Ok(())
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Connect timeout as a duration
    #[inline]
    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Join a service path onto the base URL
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for DatawingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: None,
            connect_timeout_ms: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Whole milliseconds, rounding a non-zero sub-millisecond duration up to 1
fn duration_to_millis(timeout: Duration) -> u64 {
    let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    if millis == 0 && !timeout.is_zero() {
        1
    } else {
        millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config() {
        let config = DatawingConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.default_name, "datawing");
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let config = DatawingConfig::new().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(
            config.endpoint("/nuwa/x"),
            "http://127.0.0.1:8080/nuwa/x"
        );
    }

    #[test]
    fn from_toml_partial() {
        let config = DatawingConfig::from_toml_str(
            r#"
            base_url = "https://example.com/"
            request_timeout_ms = 30000
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn from_toml_rejects_unknown_key() {
        let result = DatawingConfig::from_toml_str("upload_url = \"http://x\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_non_http_url() {
        let result = DatawingConfig::from_toml_str("base_url = \"ftp://example.com\"");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));

        let result = DatawingConfig::from_toml_str("base_url = \"not a url\"");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn rejects_zero_quality() {
        let config = DatawingConfig::new().with_jpeg_quality(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidQuality(0))
        ));
    }

    #[test]
    fn sub_second_timeouts_keep_precision() {
        let config = DatawingConfig::new()
            .with_request_timeout(Duration::from_millis(1500))
            .with_connect_timeout(Duration::from_millis(500));

        assert_eq!(config.request_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.connect_timeout(), Some(Duration::from_millis(500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sub_millisecond_timeout_rounds_up() {
        let config = DatawingConfig::new().with_request_timeout(Duration::from_micros(10));
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn rejects_zero_timeouts() {
        let result = DatawingConfig::from_toml_str("request_timeout_ms = 0");
        assert!(matches!(
            result,
            Err(ConfigError::ZeroTimeout("request_timeout_ms"))
        ));

        let config = DatawingConfig::new().with_connect_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("connect_timeout_ms"))
        ));
    }

    #[test]
    fn from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datawing.toml");
        std::fs::write(&path, "default_name = \"studio\"\njpeg_quality = 90\n").unwrap();

        let config = DatawingConfig::from_file(&path).unwrap();
        assert_eq!(config.default_name, "studio");
        assert_eq!(config.jpeg_quality, 90);
    }

    #[test]
    fn from_file_missing() {
        let result = DatawingConfig::from_file("/nonexistent/datawing.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
