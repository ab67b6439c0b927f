//! HTTP client for the Datawing workshop API

use crate::config::DatawingConfig;
use crate::error::{ConfigError, DatawingError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Game options listing
pub const GAME_OPTIONS_PATH: &str = "/nuwa/workshop/v3/api-open/game/options";

/// User options listing
pub const USER_OPTIONS_PATH: &str = "/nuwa/workshop/v3/api-open/user/options";

/// Material upload
pub const MATERIAL_UPLOAD_PATH: &str = "/nuwa/workshop/v3/api-open/ai/material/upload";

/// Client for the Datawing service
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DatawingClient {
    http: reqwest::Client,
    config: DatawingConfig,
}

impl DatawingClient {
    /// Create client from configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be built
    pub fn new(config: DatawingConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().map_err(ConfigError::Client)?;

        Ok(Self { http, config })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DatawingConfig {
        &self.config
    }

    /// POST a JSON body and decode the JSON response
    ///
    /// The HTTP status code is not inspected; the service reports failures
    /// inside the body.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, DatawingError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST json");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| DatawingError::transport(&url, e))?;

        Self::decode_body(&url, response).await
    }

    /// POST a multipart form and decode the JSON response
    pub(crate) async fn post_multipart<T>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, DatawingError>
    where
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "POST multipart");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DatawingError::transport(&url, e))?;

        Self::decode_body(&url, response).await
    }

    async fn decode_body<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, DatawingError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DatawingError::transport(url, e))?;
        tracing::debug!(%url, %status, len = bytes.len(), "response received");

        serde_json::from_slice(&bytes).map_err(|e| DatawingError::decode(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_invalid_config() {
        let config = DatawingConfig::new().with_base_url("nope");
        assert!(matches!(
            DatawingClient::new(config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn client_keeps_config() {
        let config = DatawingConfig::new()
            .with_base_url("http://127.0.0.1:9")
            .with_request_timeout(std::time::Duration::from_secs(5));
        let client = DatawingClient::new(config.clone()).unwrap();
        assert_eq!(client.config(), &config);
    }

    #[test]
    fn endpoint_paths_share_prefix() {
        for path in [GAME_OPTIONS_PATH, USER_OPTIONS_PATH, MATERIAL_UPLOAD_PATH] {
            assert!(path.starts_with("/nuwa/workshop/v3/api-open/"));
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let base = format!("http://127.0.0.1:{port}");
        let client = DatawingClient::new(DatawingConfig::new().with_base_url(&base)).unwrap();

        let result: Result<serde_json::Value, _> =
            client.post_json(GAME_OPTIONS_PATH, &serde_json::json!({})).await;
        let err = result.unwrap_err();
        assert!(err.is_network());
        assert!(err.to_string().contains(&base));
    }
}
