//! Testing utilities for the Datawing workspace
//!
//! Shared test helpers: an in-process mock of the Datawing workshop API that
//! records what it receives, plus image batch fixtures.

#![allow(missing_docs)]

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use ndarray::Array4;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub const GAME_OPTIONS_PATH: &str = "/nuwa/workshop/v3/api-open/game/options";
pub const USER_OPTIONS_PATH: &str = "/nuwa/workshop/v3/api-open/user/options";
pub const MATERIAL_UPLOAD_PATH: &str = "/nuwa/workshop/v3/api-open/ai/material/upload";

/// Canned HTTP answer
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(value: &Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// File part received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Multipart upload received by the mock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedUpload {
    pub fields: BTreeMap<String, String>,
    pub field_order: Vec<String>,
    pub files: Vec<CapturedFile>,
}

impl CapturedUpload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn file(&self, field: &str) -> Option<&CapturedFile> {
        self.files.iter().find(|f| f.field == field)
    }
}

#[derive(Clone)]
struct MockState {
    games: Arc<Mutex<Reply>>,
    users: Arc<Mutex<Reply>>,
    upload: Arc<Mutex<Reply>>,
    option_requests: Arc<Mutex<Vec<(String, Value)>>>,
    uploads: Arc<Mutex<Vec<CapturedUpload>>>,
}

/// Running mock of the Datawing workshop API
pub struct MockDatawing {
    base_url: String,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockDatawing {
    pub fn builder() -> MockDatawingBuilder {
        MockDatawingBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn uploads(&self) -> Vec<CapturedUpload> {
        self.state.uploads.lock().await.clone()
    }

    /// `(path, parsed body)` of every options request
    pub async fn option_requests(&self) -> Vec<(String, Value)> {
        self.state.option_requests.lock().await.clone()
    }

    pub async fn set_games(&self, reply: Reply) {
        *self.state.games.lock().await = reply;
    }

    pub async fn set_users(&self, reply: Reply) {
        *self.state.users.lock().await = reply;
    }

    pub async fn set_upload(&self, reply: Reply) {
        *self.state.upload.lock().await = reply;
    }
}

impl Drop for MockDatawing {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct MockDatawingBuilder {
    games: Reply,
    users: Reply,
    upload: Reply,
}

impl Default for MockDatawingBuilder {
    fn default() -> Self {
        Self {
            games: Reply::json(&games_envelope(&[])),
            users: Reply::json(&users_envelope(&[])),
            upload: Reply::json(&json!({"status": 200, "msg": "ok"})),
        }
    }
}

impl MockDatawingBuilder {
    pub fn games(mut self, reply: Reply) -> Self {
        self.games = reply;
        self
    }

    pub fn users(mut self, reply: Reply) -> Self {
        self.users = reply;
        self
    }

    pub fn upload(mut self, reply: Reply) -> Self {
        self.upload = reply;
        self
    }

    /// Bind to a random loopback port and start serving
    pub async fn spawn(self) -> MockDatawing {
        let state = MockState {
            games: Arc::new(Mutex::new(self.games)),
            users: Arc::new(Mutex::new(self.users)),
            upload: Arc::new(Mutex::new(self.upload)),
            option_requests: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route(GAME_OPTIONS_PATH, post(game_options))
            .route(USER_OPTIONS_PATH, post(user_options))
            .route(MATERIAL_UPLOAD_PATH, post(material_upload))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        MockDatawing {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }
}

async fn record_options(state: &MockState, path: &str, body: &Bytes) {
    let parsed = serde_json::from_slice(body).unwrap_or(Value::Null);
    state
        .option_requests
        .lock()
        .await
        .push((path.to_string(), parsed));
}

async fn game_options(State(state): State<MockState>, body: Bytes) -> impl IntoResponse {
    record_options(&state, GAME_OPTIONS_PATH, &body).await;
    state.games.lock().await.clone().into_response()
}

async fn user_options(State(state): State<MockState>, body: Bytes) -> impl IntoResponse {
    record_options(&state, USER_OPTIONS_PATH, &body).await;
    state.users.lock().await.clone().into_response()
}

async fn material_upload(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut captured = CapturedUpload::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let Ok(bytes) = field.bytes().await else {
            break;
        };

        captured.field_order.push(name.clone());
        if file_name.is_some() {
            captured.files.push(CapturedFile {
                field: name,
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            captured
                .fields
                .insert(name, String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    state.uploads.lock().await.push(captured);
    state.upload.lock().await.clone().into_response()
}

/// `{"status":200,"data":{"list":[{"id":..,"name":..}]}}`
pub fn games_envelope(games: &[(i64, &str)]) -> Value {
    let list: Vec<Value> = games
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect();
    json!({"status": 200, "data": {"list": list}})
}

/// `{"status":200,"data":{"list":[{"nickname":..}]}}`
pub fn users_envelope(nicknames: &[&str]) -> Value {
    let list: Vec<Value> = nicknames
        .iter()
        .map(|n| json!({"nickname": n}))
        .collect();
    json!({"status": 200, "data": {"list": list}})
}

/// Envelope reporting a service-side failure
pub fn error_envelope(status: i64) -> Value {
    json!({"status": status, "msg": "error"})
}

/// Batch of `batch` images of `height`×`width`×3 filled with `value`
pub fn solid_batch(batch: usize, height: usize, width: usize, value: f32) -> Array4<f32> {
    Array4::from_elem((batch, height, width, 3), value)
}

/// Single image whose red channel ramps left to right, green top to bottom
#[allow(clippy::cast_precision_loss)]
pub fn gradient_batch(height: usize, width: usize) -> Array4<f32> {
    Array4::from_shape_fn((1, height, width, 3), |(_, y, x, c)| match c {
        0 => x as f32 / (width.max(2) - 1) as f32,
        1 => y as f32 / (height.max(2) - 1) as f32,
        _ => 0.5,
    })
}
