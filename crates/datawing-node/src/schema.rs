//! Node input/output descriptions
//!
//! A host asks a node for its input schema before rendering it. The schema is
//! described here as typed fields and can be rendered into the host's
//! dictionary form with [`NodeSchema::to_host_json`].

use crate::options::OptionChoice;
use serde_json::{json, Map, Value};

/// Kind of an input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Image batch wired from another node
    Image,
    /// Free text
    Text {
        /// Render as a multi-line box
        multiline: bool,
        /// Initial value
        default: String,
    },
    /// One of a fixed list of choices
    Choice(Vec<OptionChoice>),
}

impl FieldKind {
    /// Single-line text with empty default
    #[inline]
    #[must_use]
    pub fn text() -> Self {
        Self::Text {
            multiline: false,
            default: String::new(),
        }
    }

    /// Multi-line text with empty default
    #[inline]
    #[must_use]
    pub fn multiline_text() -> Self {
        Self::Text {
            multiline: true,
            default: String::new(),
        }
    }

    fn to_host_json(&self) -> Value {
        match self {
            Self::Image => json!([ValueKind::Image.as_str()]),
            Self::Text { multiline, default } => json!([
                "STRING",
                { "multiline": multiline, "default": default }
            ]),
            Self::Choice(choices) => {
                let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
                json!([labels])
            }
        }
    }
}

/// Named input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    /// Argument name
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
}

impl InputField {
    /// Create field
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Choices of a choice field
    #[must_use]
    pub fn choices(&self) -> Option<&[OptionChoice]> {
        match &self.kind {
            FieldKind::Choice(choices) => Some(choices),
            _ => None,
        }
    }
}

/// Value kinds flowing between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Image batch
    Image,
}

impl ValueKind {
    /// Host type name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
        }
    }
}

/// Input schema of a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSchema {
    /// Inputs the host must supply
    pub required: Vec<InputField>,
    /// Inputs the host may omit
    pub optional: Vec<InputField>,
}

impl NodeSchema {
    /// Create empty schema
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add required field
    #[inline]
    #[must_use]
    pub fn required(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.required.push(InputField::new(name, kind));
        self
    }

    /// Add optional field
    #[inline]
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.optional.push(InputField::new(name, kind));
        self
    }

    /// Look up a field in either group
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|f| f.name == name)
    }

    /// Check if field is required
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|f| f.name == name)
    }

    /// Render the host's `{"required": {...}, "optional": {...}}` form
    #[must_use]
    pub fn to_host_json(&self) -> Value {
        let group = |fields: &[InputField]| {
            fields
                .iter()
                .map(|f| (f.name.clone(), f.kind.to_host_json()))
                .collect::<Map<String, Value>>()
        };

        let mut root = Map::new();
        root.insert("required".into(), Value::Object(group(&self.required)));
        if !self.optional.is_empty() {
            root.insert("optional".into(), Value::Object(group(&self.optional)));
        }
        Value::Object(root)
    }
}
