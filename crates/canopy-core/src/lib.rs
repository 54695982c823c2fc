// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # canopy-core
//!
//! Core abstractions and shared types for the canopy data-binding layer.
//!
//! This crate provides the foundational types and capability traits used
//! across all canopy components:
//!
//! - **Types**: Protocol-agnostic `Value`, `DataQuality`, `ProcessReason`,
//!   `ConnectionState`
//! - **Link**: Per-record binding configuration (queue sizing, discard
//!   policy, timestamp selection)
//! - **Error**: Unified error hierarchy
//! - **Consumer**: The record-processing collaborator capability
//! - **Item**: The protocol/session collaborator capability
//!
//! ## Example
//!
//! ```rust,ignore
//! use canopy_core::types::{Value, DataQuality, ProcessReason};
//! use canopy_core::link::{LinkConfig, DiscardPolicy};
//!
//! let value = Value::Struct(vec![
//!     ("speed".into(), Value::Float64(25.5)),
//!     ("state".into(), Value::Bool(true)),
//! ]);
//!
//! let config = LinkConfig {
//!     queue_capacity: 3,
//!     discard_policy: DiscardPolicy::Oldest,
//!     ..LinkConfig::default()
//! };
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod consumer;
pub mod error;
pub mod item;
pub mod link;
pub mod types;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use consumer::RecordConsumer;
pub use error::{
    CanopyError, CanopyResult, QueueError, QueueResult, TreeError, TreeResult, ValueError,
    ValueResult,
};
pub use item::ProtocolItem;
pub use link::{DiscardPolicy, LinkConfig, QueueConfig, DEFAULT_QUEUE_CAPACITY};
pub use types::{
    BadReason, ConnectionState, DataQuality, ProcessReason, Timestamp, TimestampSource,
    UncertainReason, Value, ValueKind,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
