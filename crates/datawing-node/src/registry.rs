//! Node registry
//!
//! Provides [`NodeRegistry`], the pair of mappings a host reads once at load
//! time: registration key to node descriptor, and key to display name.

use crate::node::{DatawingNode, Node, NodeDescriptor};
use std::collections::BTreeMap;

/// Registry of node types exported to the host
#[derive(Debug, Default, Clone)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, NodeDescriptor>,
}

impl NodeRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Create registry with the nodes this crate exports
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register::<DatawingNode>();
        registry
    }

    /// Register a node type under its descriptor key
    ///
    /// Returns the descriptor previously registered under the same key.
    pub fn register<N: Node>(&mut self) -> Option<NodeDescriptor> {
        self.insert(N::DESCRIPTOR)
    }

    /// Register a descriptor directly
    pub fn insert(&mut self, descriptor: NodeDescriptor) -> Option<NodeDescriptor> {
        self.nodes.insert(descriptor.key, descriptor)
    }

    /// Get descriptor by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NodeDescriptor> {
        self.nodes.get(key)
    }

    /// Check if key is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Key to descriptor mapping
    #[inline]
    #[must_use]
    pub fn class_mappings(&self) -> &BTreeMap<&'static str, NodeDescriptor> {
        &self.nodes
    }

    /// Key to display name mapping
    #[must_use]
    pub fn display_name_mappings(&self) -> BTreeMap<&'static str, &'static str> {
        self.nodes
            .values()
            .map(|d| (d.key, d.display_name))
            .collect()
    }

    /// Get number of registered nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
