// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builder patterns for constructing trees and structured values with
//! sensible defaults.

use std::sync::Arc;

use canopy_core::consumer::RecordConsumer;
use canopy_core::link::LinkConfig;
use canopy_core::types::Value;
use canopy_element::{Element, ElementTree};

use super::mocks::{MockProtocolItem, MockRecordConsumer};

// =============================================================================
// Struct Value Builder
// =============================================================================

/// Builder for structured test values.
#[derive(Debug, Clone, Default)]
pub struct StructValueBuilder {
    fields: Vec<(String, Value)>,
}

impl StructValueBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Build the structured value.
    pub fn build(self) -> Value {
        Value::Struct(self.fields)
    }
}

// =============================================================================
// Tree Builder
// =============================================================================

/// A bound leaf: the element plus the mock consumer observing it.
pub struct BoundLeaf {
    /// The leaf element (the consumer-side owning handle).
    pub leaf: Arc<Element>,
    /// The consumer the leaf wakes.
    pub consumer: Arc<MockRecordConsumer>,
}

/// Builder assembling an element tree with mock-bound leaves.
///
/// # Example
///
/// ```rust,ignore
/// let item = MockProtocolItem::up();
/// let mut builder = TreeBuilder::new(item);
/// let speed = builder.bind("motor.speed");
/// let state = builder.bind("motor.state");
/// let tree = builder.tree();
/// ```
pub struct TreeBuilder {
    item: Arc<MockProtocolItem>,
    tree: ElementTree,
}

impl TreeBuilder {
    /// Create a builder for a fresh tree on the given item.
    pub fn new(item: Arc<MockProtocolItem>) -> Self {
        let tree = ElementTree::new(item.clone());
        Self { item, tree }
    }

    /// Bind a leaf at `path` with a default-configured mock consumer.
    ///
    /// The leaf name is the last path component (unescaped).
    pub fn bind(&mut self, path: &str) -> BoundLeaf {
        self.bind_with_config(path, LinkConfig::default())
    }

    /// Bind a leaf at `path` with a specific link configuration.
    pub fn bind_with_config(&mut self, path: &str, config: LinkConfig) -> BoundLeaf {
        let mut rest = path.to_string();
        let name = canopy_element::split_last_name(&mut rest);
        let leaf_name = if path.is_empty() { String::new() } else { name };

        let consumer =
            MockRecordConsumer::with_link_config(format!("rec({})", path), config);
        let leaf = Element::leaf(
            leaf_name,
            self.item.clone(),
            consumer.clone() as Arc<dyn RecordConsumer>,
        );
        self.tree
            .add_leaf(Arc::clone(&leaf), path)
            .expect("binding failed");
        BoundLeaf { leaf, consumer }
    }

    /// Returns the underlying item.
    pub fn item(&self) -> Arc<MockProtocolItem> {
        self.item.clone()
    }

    /// Finishes building, returning the tree.
    pub fn tree(self) -> ElementTree {
        self.tree
    }
}
