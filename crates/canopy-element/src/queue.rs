// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bounded per-leaf update queue.
//!
//! Each leaf element owns one [`UpdateQueue`], filled by the protocol
//! worker and drained by the record consumer. The queue is capacity
//! bounded and never blocks: a full queue discards per its policy, an
//! empty queue fails fast.
//!
//! # Features
//!
//! - **Bounded**: never holds more than `capacity` records
//! - **FIFO Ordering**: records are delivered in protocol-arrival order
//! - **Overflow Accounting**: discarded records increment a counter
//! - **Edge-Triggered Wake-Up**: `push` reports the empty-to-non-empty
//!   transition exactly once per batch of back-to-back arrivals
//!
//! # Synchronization
//!
//! The queue itself is not synchronized. The owning leaf serializes all
//! access through the per-record lock (one producer thread, one consumer
//! context), so push and pop never execute concurrently.

use std::collections::VecDeque;

use tracing::debug;

use canopy_core::error::QueueError;
use canopy_core::link::{DiscardPolicy, QueueConfig};
use canopy_core::types::ProcessReason;

use crate::update::UpdateRecord;

// =============================================================================
// Update Queue
// =============================================================================

/// A capacity-bounded FIFO queue of update records.
///
/// # Examples
///
/// ```
/// use canopy_element::queue::UpdateQueue;
/// use canopy_element::update::UpdateRecord;
/// use canopy_core::link::{DiscardPolicy, QueueConfig};
/// use canopy_core::types::ProcessReason;
/// use chrono::Utc;
///
/// let mut queue = UpdateQueue::new(QueueConfig::new(2, DiscardPolicy::Oldest));
///
/// let was_first = queue.push(UpdateRecord::event(Utc::now(), ProcessReason::ValueChanged));
/// assert!(was_first);
///
/// let record = queue.pop().unwrap();
/// assert_eq!(record.reason(), ProcessReason::ValueChanged);
/// ```
#[derive(Debug)]
pub struct UpdateQueue {
    /// The queued records (FIFO).
    updates: VecDeque<UpdateRecord>,

    /// Maximum number of queued records, always >= 1.
    capacity: usize,

    /// Overflow behavior when full.
    policy: DiscardPolicy,

    /// Number of records discarded due to overflow.
    overflows: u64,
}

impl UpdateQueue {
    /// Creates a new queue from a queue configuration.
    ///
    /// A requested capacity of 0 is normalized to the default of 1.
    pub fn new(config: QueueConfig) -> Self {
        let capacity = config.effective_capacity();
        Self {
            updates: VecDeque::with_capacity(capacity),
            capacity,
            policy: config.policy,
            overflows: 0,
        }
    }

    /// Appends a record, applying the discard policy when full.
    ///
    /// Returns `true` iff the queue was empty immediately before this
    /// call. The caller uses this to request consumer processing exactly
    /// once per empty-to-non-empty transition; a slow consumer is not
    /// re-signalled for every additional arrival.
    pub fn push(&mut self, update: UpdateRecord) -> bool {
        let was_first = self.updates.is_empty();

        if self.updates.len() >= self.capacity {
            self.overflows += 1;
            match self.policy {
                DiscardPolicy::Oldest => {
                    let dropped = self.updates.pop_front();
                    debug!(
                        policy = %self.policy,
                        overflows = self.overflows,
                        reason = dropped.map(|d| d.reason().as_str()).unwrap_or("none"),
                        "Queue full, discarded oldest record"
                    );
                    self.updates.push_back(update);
                }
                DiscardPolicy::Newest => {
                    debug!(
                        policy = %self.policy,
                        overflows = self.overflows,
                        reason = update.reason().as_str(),
                        "Queue full, discarded incoming record"
                    );
                }
            }
        } else {
            self.updates.push_back(update);
        }

        was_first
    }

    /// Removes and returns the oldest record.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] when no record is pending; the queue
    /// is left unchanged.
    pub fn pop(&mut self) -> Result<UpdateRecord, QueueError> {
        self.updates.pop_front().ok_or(QueueError::Empty)
    }

    /// Returns the reason of the oldest pending record, if any.
    ///
    /// After draining one record, the consumer uses this to re-request
    /// processing for records still pending, so a batch of arrivals is
    /// fully drained without further producer-side wake-ups.
    #[inline]
    pub fn next_reason(&self) -> Option<ProcessReason> {
        self.updates.front().map(|u| u.reason())
    }

    /// Returns the number of queued records.
    #[inline]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns `true` if no records are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Returns the queue capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the overflow behavior.
    #[inline]
    pub fn policy(&self) -> DiscardPolicy {
        self.policy
    }

    /// Returns the number of records discarded due to overflow.
    #[inline]
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}

// =============================================================================
// Tests
// =============================================================================
