// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Unified error hierarchy for canopy.
//!
//! # Error Hierarchy
//!
//! ```text
//! CanopyError (root)
//! ├── TreeError   - Element tree construction
//! ├── QueueError  - Update queue operations
//! └── ValueError  - Write-side value coercion
//! ```
//!
//! Tree-construction errors abort only the single binding under
//! construction; queue errors are local to one leaf. Neither corrupts
//! sibling bindings, and no internal retries exist at this layer.
//!
//! # Examples
//!
//! ```
//! use canopy_core::error::{CanopyError, TreeError};
//!
//! let error = TreeError::leaf_conflict("motor");
//! let root: CanopyError = error.into();
//! assert_eq!(root.error_type(), "tree");
//! ```

use thiserror::Error;

use crate::types::ValueKind;

// =============================================================================
// CanopyError - Root Error Type
// =============================================================================

/// The root error type for canopy.
///
/// All errors in canopy can be converted to this type, providing a unified
/// error handling interface at the configuration boundary.
#[derive(Debug, Error)]
pub enum CanopyError {
    /// Element tree construction error.
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// Update queue error.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Value coercion error.
    #[error("Value error: {0}")]
    Value(#[from] ValueError),
}

impl CanopyError {
    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            CanopyError::Tree(_) => "tree",
            CanopyError::Queue(_) => "queue",
            CanopyError::Value(_) => "value",
        }
    }
}

// =============================================================================
// TreeError
// =============================================================================

/// Element tree construction errors.
///
/// These abort the configuration of the one binding being inserted and
/// leave the rest of the tree intact.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Attempt to attach a child element under an existing leaf.
    #[error("Cannot add element below existing leaf '{name}'")]
    LeafConflict {
        /// Name of the leaf that blocked the insertion.
        name: String,
    },

    /// Attempt to install a second root element.
    #[error("Root element already exists")]
    RootConflict,
}

impl TreeError {
    /// Creates a leaf conflict error.
    pub fn leaf_conflict(name: impl Into<String>) -> Self {
        Self::LeafConflict { name: name.into() }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            TreeError::LeafConflict { .. } => "leaf_conflict",
            TreeError::RootConflict => "root_conflict",
        }
    }
}

// =============================================================================
// QueueError
// =============================================================================

/// Update queue errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The consumer polled an empty queue.
    ///
    /// Processing was requested without a corresponding push; surfaced as
    /// a fault on that single consumer, never escalated process-wide.
    #[error("Incoming update queue is empty")]
    Empty,
}

impl QueueError {
    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            QueueError::Empty => "empty",
        }
    }
}

// =============================================================================
// ValueError
// =============================================================================

/// Write-side value coercion errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The written value does not fit the target wire type.
    #[error("Value '{value}' out of range for {target}")]
    OutOfRange {
        /// Display form of the offending value.
        value: String,
        /// The conversion target kind.
        target: ValueKind,
    },

    /// No conversion exists between the two kinds.
    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Kind of the written value.
        from: ValueKind,
        /// The conversion target kind.
        to: ValueKind,
    },

    /// The element has no incoming value yet, so the wire type is unknown.
    #[error("No incoming value to derive the wire type from")]
    NoIncomingType,
}

impl ValueError {
    /// Creates an out-of-range error.
    pub fn out_of_range(value: impl Into<String>, target: ValueKind) -> Self {
        Self::OutOfRange {
            value: value.into(),
            target,
        }
    }

    /// Creates an unsupported conversion error.
    pub fn unsupported_conversion(from: ValueKind, to: ValueKind) -> Self {
        Self::UnsupportedConversion { from, to }
    }

    /// Returns the error type for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            ValueError::OutOfRange { .. } => "out_of_range",
            ValueError::UnsupportedConversion { .. } => "unsupported_conversion",
            ValueError::NoIncomingType => "no_incoming_type",
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with CanopyError.
pub type CanopyResult<T> = Result<T, CanopyError>;

/// A Result type with TreeError.
pub type TreeResult<T> = Result<T, TreeError>;

/// A Result type with QueueError.
pub type QueueResult<T> = Result<T, QueueError>;

/// A Result type with ValueError.
pub type ValueResult<T> = Result<T, ValueError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_error() {
        let error = TreeError::leaf_conflict("motor");
        assert!(matches!(error, TreeError::LeafConflict { .. }));
        assert_eq!(error.error_type(), "leaf_conflict");
        assert!(error.to_string().contains("motor"));

        assert_eq!(TreeError::RootConflict.error_type(), "root_conflict");
    }

    #[test]
    fn test_queue_error() {
        assert_eq!(QueueError::Empty.error_type(), "empty");
    }

    #[test]
    fn test_value_error() {
        let error = ValueError::out_of_range("300", ValueKind::UInt8);
        assert_eq!(error.error_type(), "out_of_range");
        assert!(error.to_string().contains("uint8"));

        let error = ValueError::unsupported_conversion(ValueKind::Struct, ValueKind::Bool);
        assert_eq!(error.error_type(), "unsupported_conversion");
    }

    #[test]
    fn test_canopy_error_conversion() {
        let error: CanopyError = TreeError::RootConflict.into();
        assert_eq!(error.error_type(), "tree");

        let error: CanopyError = QueueError::Empty.into();
        assert_eq!(error.error_type(), "queue");
    }
}
