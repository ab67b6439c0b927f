//! Graph node contract and the Datawing upload node
//!
//! # Workflow
//! 1. Host calls [`Node::input_types`]: game and user options are fetched
//! 2. Host renders the dropdowns and the user submits
//! 3. Host calls [`Node::execute`] with the selections and the image batch
//! 4. The first image is encoded as JPEG and uploaded
//! 5. The batch is handed back unchanged so the graph can continue

use crate::client::DatawingClient;
use crate::config::DatawingConfig;
use crate::encoder::JpegEncoder;
use crate::error::DatawingError;
use crate::options::OptionChoice;
use crate::schema::{FieldKind, NodeSchema, ValueKind};
use crate::tensor::ImageBatch;
use crate::upload::{resolve_name, UploadRequest};
use async_trait::async_trait;
use chrono::Utc;

/// Static description of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// Globally unique registration key
    pub key: &'static str,
    /// Human-readable title
    pub display_name: &'static str,
    /// UI category
    pub category: &'static str,
    /// Entry point name
    pub function: &'static str,
    /// Output kinds, in order
    pub return_types: &'static [ValueKind],
    /// Whether the node is a graph output
    pub output_node: bool,
}

/// A unit of computation the host can place in a graph
#[async_trait]
pub trait Node: Send + Sync {
    /// Typed inputs of the entry point
    type Inputs: Send;
    /// Typed outputs of the entry point
    type Outputs: Send;

    /// Static description used for registration
    const DESCRIPTOR: NodeDescriptor;

    /// Describe inputs; may query remote services for choices
    async fn input_types(&self) -> Result<NodeSchema, DatawingError>;

    /// Run the node
    async fn execute(&self, inputs: Self::Inputs) -> Result<Self::Outputs, DatawingError>;
}

/// Inputs of the upload entry point
#[derive(Debug, Clone, PartialEq)]
pub struct UploadInputs {
    /// Image batch from upstream; only the first image is uploaded
    pub image: ImageBatch,
    /// Upload name; blank falls back to the configured default
    pub name: Option<String>,
    /// Selected game
    pub game: OptionChoice,
    /// Selected user (sent as `nickname`)
    pub user: OptionChoice,
    /// Free-form tags
    pub tags: Option<String>,
}

impl UploadInputs {
    /// Inputs as the host delivers them: display labels for game and user
    #[must_use]
    pub fn from_labels(
        image: ImageBatch,
        name: impl Into<String>,
        game_label: impl Into<String>,
        user_label: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            image,
            name: Some(name.into()),
            game: OptionChoice::from_game_label(game_label),
            user: OptionChoice::plain(user_label),
            tags: Some(tags.into()),
        }
    }
}

/// Node that uploads the first image of a batch to Datawing
#[derive(Debug, Clone)]
pub struct DatawingNode {
    client: DatawingClient,
    encoder: JpegEncoder,
}

impl DatawingNode {
    /// Create node from configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(config: DatawingConfig) -> Result<Self, DatawingError> {
        let encoder = JpegEncoder::new(config.jpeg_quality);
        let client = DatawingClient::new(config)?;
        Ok(Self { client, encoder })
    }

    /// Create node around an existing client
    #[must_use]
    pub fn with_client(client: DatawingClient) -> Self {
        let encoder = JpegEncoder::new(client.config().jpeg_quality);
        Self { client, encoder }
    }

    /// Get client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &DatawingClient {
        &self.client
    }

    /// Encode and send the first image, returning the service's answer
    ///
    /// # Errors
    /// Returns error for an empty or unencodable batch, on transport failure,
    /// or if the answer is not JSON
    pub async fn upload(&self, inputs: &UploadInputs) -> Result<serde_json::Value, DatawingError> {
        let first = inputs.image.first()?;
        let jpeg = self.encoder.encode_tensor(first)?;

        let config = self.client.config();
        let name = resolve_name(inputs.name.as_deref(), &config.default_name);
        let request = UploadRequest::new(
            jpeg,
            name,
            inputs.game.value.clone(),
            inputs.user.value.clone(),
            inputs.tags.clone().unwrap_or_default(),
            Utc::now(),
        );

        tracing::debug!(
            filename = %request.filename,
            game_id = %request.game_id,
            nickname = %request.nickname,
            "uploading material"
        );
        self.client.upload_material(request).await
    }
}

#[async_trait]
impl Node for DatawingNode {
    type Inputs = UploadInputs;
    type Outputs = (ImageBatch,);

    const DESCRIPTOR: NodeDescriptor = NodeDescriptor {
        key: "Datawing",
        display_name: "Datawing Upload",
        category: "Datawing",
        function: "upload",
        return_types: &[ValueKind::Image],
        output_node: false,
    };

    async fn input_types(&self) -> Result<NodeSchema, DatawingError> {
        let games = self.client.load_games().await?;
        if let Some(status) = games.remote_status() {
            tracing::warn!(status, "game options unavailable");
        }
        let users = self.client.load_users().await?;
        if let Some(status) = users.remote_status() {
            tracing::warn!(status, "user options unavailable");
        }

        Ok(NodeSchema::new()
            .required("image", FieldKind::Image)
            .required("name", FieldKind::text())
            .required("game_id", FieldKind::Choice(games.into_choices()))
            .required("user_id", FieldKind::Choice(users.into_choices()))
            .optional("tags", FieldKind::multiline_text()))
    }

    async fn execute(&self, inputs: UploadInputs) -> Result<(ImageBatch,), DatawingError> {
        self.upload(&inputs).await?;
        Ok((inputs.image,))
    }
}
