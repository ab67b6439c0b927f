//! Datawing Node - graph-host upload node
//!
//! Takes an image batch produced upstream in a node graph, encodes its first
//! image as JPEG and uploads it with metadata to the Datawing workshop
//! service. Game and user dropdowns are populated from the service whenever
//! the host asks for the node's input schema.
//!
//! # Example
//!
//! ```rust,ignore
//! use datawing_node::prelude::*;
//!
//! # async fn example(image: ImageBatch) -> Result<(), DatawingError> {
//! let config = DatawingConfig::new().with_base_url("http://127.0.0.1:8080");
//! let node = DatawingNode::new(config)?;
//!
//! let schema = node.input_types().await?;
//! let game = schema.field("game_id").and_then(|f| f.choices()).unwrap()[0].clone();
//!
//! let inputs = UploadInputs {
//!     image,
//!     name: Some("cover".into()),
//!     game,
//!     user: OptionChoice::plain("bob"),
//!     tags: Some("x,y".into()),
//! };
//! let (image,) = node.execute(inputs).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod node;
pub mod options;
pub mod registry;
pub mod schema;
pub mod tensor;
pub mod upload;

// Re-exports for convenience
pub use client::{DatawingClient, GAME_OPTIONS_PATH, MATERIAL_UPLOAD_PATH, USER_OPTIONS_PATH};
pub use config::{DatawingConfig, DEFAULT_BASE_URL, DEFAULT_JPEG_QUALITY, DEFAULT_NAME};
pub use encoder::JpegEncoder;
pub use error::{ConfigError, DatawingError, TensorError};
pub use node::{DatawingNode, Node, NodeDescriptor, UploadInputs};
pub use options::{
    extract_game_id, GameRecord, OptionChoice, OptionsOutcome, RecordId, UserRecord,
};
pub use registry::NodeRegistry;
pub use schema::{FieldKind, InputField, NodeSchema, ValueKind};
pub use tensor::{tensor_to_bytes, tensor_to_int, ImageBatch};
pub use upload::{resolve_name, upload_filename, UploadRequest};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the Datawing node
    pub use crate::{
        DatawingClient, DatawingConfig, DatawingError, DatawingNode, ImageBatch, Node,
        NodeRegistry, NodeSchema, OptionChoice, OptionsOutcome, UploadInputs,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
