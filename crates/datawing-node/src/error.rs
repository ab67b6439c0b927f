//! Error types for the Datawing node
//!
//! Provides error handling for:
//! - Transport failures talking to the Datawing service
//! - Response bodies that are not the expected JSON
//! - Tensor shape problems before encoding
//! - JPEG encoding failures and multipart form assembly
//! - Configuration loading

use std::path::PathBuf;

/// Main Datawing error type
#[derive(Debug, thiserror::Error)]
pub enum DatawingError {
    /// Request could not be sent or the response could not be read
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body is not valid JSON for the expected shape
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Response parsed but lacks a field the success path requires
    #[error("malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// Multipart body could not be assembled
    #[error("invalid upload form: {0}")]
    Form(#[source] reqwest::Error),

    /// Image tensor cannot be encoded
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),

    /// JPEG serialization failed
    #[error("jpeg encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DatawingError {
    /// Create transport error for url
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Create decode error for url
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Create malformed response error for url
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if the failure happened on the wire rather than in local processing
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Tensor shape and conversion errors
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// Batch holds no images
    #[error("image batch is empty")]
    EmptyBatch,

    /// Channel count has no JPEG color type
    #[error("unsupported channel count: {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),

    /// Height or width is zero or exceeds u32
    #[error("invalid image dimensions {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },

    /// Bit depth outside the representable range
    #[error("unsupported bit depth: {0} (expected 1..=16)")]
    InvalidBits(u32),

    /// Array could not be reshaped
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Base URL is not an absolute http(s) URL
    #[error("invalid base url: '{0}'")]
    InvalidBaseUrl(String),

    /// JPEG quality outside 1..=100
    #[error("jpeg quality must be within 1..=100, got {0}")]
    InvalidQuality(u8),

    /// Timeout set to zero
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    /// HTTP client could not be constructed
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
