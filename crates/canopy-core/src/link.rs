// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-record link configuration.
//!
//! Each record binding carries a [`LinkConfig`] that parameterizes the
//! leaf element created for it: how deep its incoming update queue is,
//! what happens on overflow, and which timestamp is stamped onto
//! data-carrying updates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::TimestampSource;

// =============================================================================
// Constants
// =============================================================================

/// Default incoming queue capacity, used when a binding requests 0.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

// =============================================================================
// Discard Policy
// =============================================================================

/// Overflow behavior of a bounded update queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscardPolicy {
    /// Drop the oldest queued record to make room for the incoming one.
    #[default]
    Oldest,

    /// Drop the incoming record, keeping the queued ones.
    Newest,
}

impl fmt::Display for DiscardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardPolicy::Oldest => write!(f, "discard-oldest"),
            DiscardPolicy::Newest => write!(f, "discard-newest"),
        }
    }
}

// =============================================================================
// Queue Configuration
// =============================================================================

/// Sizing and overflow configuration for one leaf's update queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Requested capacity; 0 means "use the default of 1".
    pub capacity: usize,

    /// Overflow behavior when the queue is full.
    pub policy: DiscardPolicy,
}

impl QueueConfig {
    /// Creates a queue configuration.
    pub fn new(capacity: usize, policy: DiscardPolicy) -> Self {
        Self { capacity, policy }
    }

    /// Returns the effective capacity (0 normalized to the default).
    #[inline]
    pub fn effective_capacity(&self) -> usize {
        if self.capacity == 0 {
            DEFAULT_QUEUE_CAPACITY
        } else {
            self.capacity
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            policy: DiscardPolicy::Oldest,
        }
    }
}

// =============================================================================
// Link Configuration
// =============================================================================

/// Configuration of one record binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    /// Capacity of the incoming update queue (0 = default of 1).
    #[serde(default)]
    pub queue_capacity: usize,

    /// Overflow behavior of the incoming update queue.
    #[serde(default)]
    pub discard_policy: DiscardPolicy,

    /// Which timestamp is captured onto data-carrying updates.
    #[serde(default)]
    pub timestamp_source: TimestampSource,

    /// Whether the binding is driven by server-side monitoring (as
    /// opposed to explicit reads).
    #[serde(default = "default_monitor")]
    pub monitor: bool,
}

fn default_monitor() -> bool {
    true
}

impl LinkConfig {
    /// Returns the queue configuration view of this link.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::new(self.queue_capacity, self.discard_policy)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            discard_policy: DiscardPolicy::Oldest,
            timestamp_source: TimestampSource::Server,
            monitor: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
