// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # canopy-element
//!
//! The data-element core of canopy: bounded per-leaf update queues and a
//! shared tree of structural and leaf elements bridging asynchronous
//! protocol notifications to a single-consumer record-processing model.
//!
//! ## Data flow
//!
//! ```text
//! protocol worker ──▶ Element (vertex: fan-out) ──▶ Element (leaf)
//!                                                       │
//!                                              UpdateQueue (bounded)
//!                                                       │ edge-triggered wake-up
//!                                                       ▼
//!                                              record consumer (pop)
//! ```
//!
//! For structured values the vertex decomposes the incoming structure
//! onto its mapped children; on the way out it reassembles the structure
//! from children whose outgoing data is dirty before the protocol layer
//! sends it upstream.
//!
//! ## Modules
//!
//! - [`update`]: immutable update records
//! - [`queue`]: the capacity-bounded update queue with discard policies
//! - [`path`]: escaping-aware hierarchical path splitting
//! - [`element`]: leaf and vertex tree nodes
//! - [`tree`]: path-based tree construction and lookup
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use canopy_element::{Element, ElementTree};
//!
//! let tree = ElementTree::new(item);
//! let leaf = Element::leaf("speed", item.clone(), consumer);
//! tree.add_leaf(Arc::clone(&leaf), "motor.speed")?;
//!
//! // protocol side
//! tree.root().unwrap().set_incoming_value(reason, value);
//!
//! // consumer side
//! let popped = leaf.read_update()?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod element;
pub mod leaf;
pub mod path;
pub mod queue;
pub mod tree;
pub mod update;

mod vertex;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use element::Element;
pub use leaf::PoppedUpdate;
pub use path::{escape_name, split_first_name, split_last_name, ROOT_NAME, SEPARATOR};
pub use queue::UpdateQueue;
pub use tree::{ElementTree, TREE_ROOT_NAME};
pub use update::UpdateRecord;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
