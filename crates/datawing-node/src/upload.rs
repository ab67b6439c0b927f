//! Material upload

use crate::client::{DatawingClient, MATERIAL_UPLOAD_PATH};
use crate::error::DatawingError;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// MIME type of the uploaded file part
pub const JPEG_MIME: &str = "image/jpeg";

/// Pick the upload name, falling back when the input is blank
#[must_use]
pub fn resolve_name<'a>(name: Option<&'a str>, fallback: &'a str) -> &'a str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => fallback,
    }
}

/// Unix timestamp with fractional seconds, always containing a dot
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    format!("{}.{:06}", at.timestamp(), at.timestamp_subsec_micros())
}

/// File name sent with the upload: `"{name}_{timestamp}.jpg"`
#[must_use]
pub fn upload_filename(name: &str, at: DateTime<Utc>) -> String {
    format!("{name}_{}.jpg", format_timestamp(at))
}

/// One multipart upload to the material endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// File name of the JPEG part
    pub filename: String,
    /// Encoded JPEG
    pub jpeg: Vec<u8>,
    /// `name` field
    pub name: String,
    /// `gameId` field
    pub game_id: String,
    /// `nickname` field
    pub nickname: String,
    /// `tags` field
    pub tags: String,
}

impl UploadRequest {
    /// Build request with the file name derived from `name` and `at`
    #[must_use]
    pub fn new(
        jpeg: Vec<u8>,
        name: impl Into<String>,
        game_id: impl Into<String>,
        nickname: impl Into<String>,
        tags: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        let name = name.into();
        Self {
            filename: upload_filename(&name, at),
            jpeg,
            name,
            game_id: game_id.into(),
            nickname: nickname.into(),
            tags: tags.into(),
        }
    }

    /// Text fields in the order they are sent
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", self.name.as_str()),
            ("gameId", self.game_id.as_str()),
            ("nickname", self.nickname.as_str()),
            ("tags", self.tags.as_str()),
        ]
    }

    /// Convert to a multipart form (consumes self)
    ///
    /// # Errors
    /// Returns error if the file part MIME type is rejected
    pub fn into_form(self) -> Result<Form, DatawingError> {
        let mut form = Form::new();
        for (key, value) in self.fields() {
            form = form.text(key, value.to_string());
        }
        let part = file_part(self.jpeg, self.filename, JPEG_MIME)?;
        Ok(form.part("file", part))
    }
}

fn file_part(bytes: Vec<u8>, filename: String, mime: &str) -> Result<Part, DatawingError> {
    Part::bytes(bytes)
        .file_name(filename)
        .mime_str(mime)
        .map_err(DatawingError::Form)
}

impl DatawingClient {
    /// Send an upload and return the service's JSON answer
    ///
    /// The answer is logged and returned as-is; it is not checked for a
    /// success status.
    ///
    /// # Errors
    /// Returns error on transport failure or a non-JSON body
    pub async fn upload_material(&self, request: UploadRequest) -> Result<Value, DatawingError> {
        let filename = request.filename.clone();
        let size = request.jpeg.len();

        let form = request.into_form()?;
        let response: Value = self.post_multipart(MATERIAL_UPLOAD_PATH, form).await?;

        tracing::info!(target: "datawing", %filename, size, "[datawing]{response}");
        Ok(response)
    }
}
