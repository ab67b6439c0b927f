//! Option loading for the node's dropdown inputs
//!
//! Both option endpoints answer with an envelope of the form
//! `{"status": 200, "data": {"list": [...]}}`. A `status` other than 200 is
//! the service's way of reporting failure and is surfaced as
//! [`OptionsOutcome::RemoteError`] rather than as an error.

use crate::client::{DatawingClient, GAME_OPTIONS_PATH, USER_OPTIONS_PATH};
use crate::error::DatawingError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Envelope status meaning success
pub const STATUS_OK: i64 = 200;

/// Record identifier as sent by the service (number or string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric id
    Int(i64),
    /// Textual id
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Game entry from the game options listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Game id
    pub id: RecordId,
    /// Display name
    pub name: String,
}

/// User entry from the user options listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Nickname, also used as the upload's `nickname` field
    pub nickname: String,
}

/// Selectable choice: what the user sees and what gets sent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Display label
    pub label: String,
    /// Submitted value
    pub value: String,
}

impl OptionChoice {
    /// Create choice from label and value
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Game choice labelled `"<name>[<id>]"` carrying the id as value
    #[must_use]
    pub fn from_game(game: &GameRecord) -> Self {
        let id = game.id.to_string();
        Self::new(format!("{}[{}]", game.name, id), id)
    }

    /// User choice where label and value are both the nickname
    #[must_use]
    pub fn from_user(user: &UserRecord) -> Self {
        Self::new(user.nickname.clone(), user.nickname.clone())
    }

    /// Game choice recovered from a bare `"<name>[<id>]"` label
    ///
    /// Only for callers that kept the label alone; see [`extract_game_id`].
    #[must_use]
    pub fn from_game_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let value = extract_game_id(&label).to_string();
        Self { label, value }
    }

    /// Choice whose label is also its value
    #[must_use]
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }
}

impl fmt::Display for OptionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Take the text strictly between the first `[` and the first `]`
///
/// Follows slice semantics of the labels' original consumers: a missing `[`
/// starts at the beginning, a missing `]` stops before the last character,
/// and inverted bounds give an empty string. Names containing brackets
/// therefore yield garbage; nothing here validates the result.
#[must_use]
pub fn extract_game_id(label: &str) -> &str {
    let start = label.find('[').map_or(0, |i| i + 1);
    let end = match label.find(']') {
        Some(i) => i,
        None => label.char_indices().last().map_or(0, |(i, _)| i),
    };
    if end <= start {
        return "";
    }
    &label[start..end]
}

/// Result of an options query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsOutcome<T> {
    /// Service answered with status 200
    Loaded(Vec<T>),
    /// Service answered with another status
    RemoteError {
        /// Envelope status value
        status: i64,
    },
}

impl<T> OptionsOutcome<T> {
    /// Items, or an empty list when the service reported an error
    #[must_use]
    pub fn into_choices(self) -> Vec<T> {
        match self {
            Self::Loaded(items) => items,
            Self::RemoteError { .. } => Vec::new(),
        }
    }

    /// Check if the service answered with status 200
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Envelope status when the service reported an error
    #[inline]
    #[must_use]
    pub fn remote_status(&self) -> Option<i64> {
        match self {
            Self::Loaded(_) => None,
            Self::RemoteError { status } => Some(*status),
        }
    }

    /// Map loaded items
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> OptionsOutcome<U> {
        match self {
            Self::Loaded(items) => OptionsOutcome::Loaded(items.into_iter().map(f).collect()),
            Self::RemoteError { status } => OptionsOutcome::RemoteError { status },
        }
    }
}

impl OptionsOutcome<OptionChoice> {
    /// Display labels in service order; empty on remote error
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Loaded(items) => items.iter().map(|c| c.label.clone()).collect(),
            Self::RemoteError { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OptionEnvelope {
    status: i64,
    #[serde(default)]
    data: Option<Value>,
}

impl DatawingClient {
    /// Fetch the game options
    ///
    /// # Errors
    /// Returns error on transport failure, a non-JSON body, or a success
    /// envelope without `data.list`
    pub async fn load_games(&self) -> Result<OptionsOutcome<OptionChoice>, DatawingError> {
        let outcome = self.fetch_options::<GameRecord>(GAME_OPTIONS_PATH).await?;
        Ok(outcome.map(|game| OptionChoice::from_game(&game)))
    }

    /// Fetch the user options
    ///
    /// # Errors
    /// See [`DatawingClient::load_games`]
    pub async fn load_users(&self) -> Result<OptionsOutcome<OptionChoice>, DatawingError> {
        let outcome = self.fetch_options::<UserRecord>(USER_OPTIONS_PATH).await?;
        Ok(outcome.map(|user| OptionChoice::from_user(&user)))
    }

    /// POST `{}` to an options path and unpack the envelope
    ///
    /// # Errors
    /// See [`DatawingClient::load_games`]
    pub async fn fetch_options<T>(&self, path: &str) -> Result<OptionsOutcome<T>, DatawingError>
    where
        T: DeserializeOwned,
    {
        let envelope: OptionEnvelope = self.post_json(path, &serde_json::json!({})).await?;
        let url = self.config().endpoint(path);

        if envelope.status != STATUS_OK {
            return Ok(OptionsOutcome::RemoteError {
                status: envelope.status,
            });
        }

        let list = envelope
            .data
            .and_then(|mut data| data.get_mut("list").map(Value::take))
            .ok_or_else(|| DatawingError::malformed(&url, "missing data.list"))?;
        let items: Vec<T> =
            serde_json::from_value(list).map_err(|e| DatawingError::decode(&url, e))?;

        tracing::debug!(%url, count = items.len(), "options loaded");
        Ok(OptionsOutcome::Loaded(items))
    }
}
