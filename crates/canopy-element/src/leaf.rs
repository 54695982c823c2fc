// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Leaf-side element operations.
//!
//! A leaf bridges the protocol worker to its one record consumer: it
//! queues incoming updates (waking the consumer exactly once per
//! empty-to-non-empty transition) and hands queued records out to the
//! consumer one at a time.
//!
//! Timestamp and status capture assumes that only one thread pushes data
//! into an item's element structure at any time.

use tracing::debug;

use canopy_core::error::QueueError;
use canopy_core::types::{ProcessReason, Timestamp, TimestampSource, Value};
use canopy_core::ConnectionState;

use crate::element::{Element, LeafState};
use crate::update::UpdateRecord;

// =============================================================================
// Popped Update
// =============================================================================

/// One update handed to the record consumer, plus the reason of the next
/// record still pending.
///
/// When `next_reason` is `Some`, the consumer re-requests processing with
/// that reason after finishing the current record, so a batch of
/// back-to-back arrivals drains completely from the single producer-side
/// wake-up.
#[derive(Debug, Clone, PartialEq)]
pub struct PoppedUpdate {
    /// The record removed from the queue.
    pub record: UpdateRecord,
    /// Reason of the oldest record still queued, if any.
    pub next_reason: Option<ProcessReason>,
}

impl Element {
    /// Removes and returns the oldest queued update.
    ///
    /// Takes the record lock for the duration of the exchange.
    ///
    /// # Errors
    ///
    /// [`QueueError::Empty`] when nothing is pending, meaning processing
    /// was requested without a corresponding push. Vertices own no queue
    /// and always report empty.
    pub fn read_update(&self) -> Result<PoppedUpdate, QueueError> {
        let leaf = match self.leaf_state() {
            Some(leaf) => leaf,
            None => return Err(QueueError::Empty),
        };

        let _record_guard = leaf.consumer.lock();
        let mut queue = leaf.queue.lock();
        let record = queue.pop()?;
        let next_reason = queue.next_reason();

        debug!(
            element = %self.display_name(),
            record = leaf.consumer.name(),
            reason = %record.reason(),
            queue_len = queue.len(),
            queue_capacity = queue.capacity(),
            "handed update to consumer"
        );

        Ok(PoppedUpdate { record, next_reason })
    }

    /// Returns the occupancy of the incoming queue as `(len, capacity)`.
    ///
    /// `(0, 0)` for vertices, which own no queue.
    pub fn queue_usage(&self) -> (usize, usize) {
        match self.leaf_state() {
            Some(leaf) => {
                let queue = leaf.queue.lock();
                (queue.len(), queue.capacity())
            }
            None => (0, 0),
        }
    }

    /// Returns the overflow count of the incoming queue.
    pub fn queue_overflows(&self) -> u64 {
        match self.leaf_state() {
            Some(leaf) => leaf.queue.lock().overflows(),
            None => 0,
        }
    }

    pub(crate) fn leaf_incoming_value(
        &self,
        leaf: &LeafState,
        reason: ProcessReason,
        value: Value,
    ) {
        // Cache incoming data unconditionally
        *self.incoming.write() = Some(value.clone());

        // Ignore data updates during the initial read; wait for the
        // read-complete that finishes it.
        let state = self.item.connection_state();
        let accept = (state == ConnectionState::InitialRead
            && reason == ProcessReason::ReadComplete)
            || state == ConnectionState::Up;
        if !accept {
            debug!(
                element = %self.display_name(),
                state = %state,
                reason = %reason,
                "ignored incoming data in current connection state"
            );
            return;
        }

        let record = UpdateRecord::with_value(
            self.incoming_timestamp(leaf, reason),
            reason,
            value,
            self.item.last_read_status(),
        );
        self.enqueue(leaf, record, reason);
    }

    pub(crate) fn leaf_incoming_event(&self, leaf: &LeafState, reason: ProcessReason) {
        let record = UpdateRecord::event(self.item.client_timestamp(), reason);
        self.enqueue(leaf, record, reason);
    }

    /// Queues one record under the record lock and wakes the consumer on
    /// the empty-to-non-empty transition.
    fn enqueue(&self, leaf: &LeafState, record: UpdateRecord, reason: ProcessReason) {
        let _record_guard = leaf.consumer.lock();
        let was_first = {
            let mut queue = leaf.queue.lock();
            let was_first = queue.push(record);
            debug!(
                element = %self.display_name(),
                record = leaf.consumer.name(),
                reason = %reason,
                queue_len = queue.len(),
                queue_capacity = queue.capacity(),
                "queued incoming update"
            );
            was_first
        };
        if was_first {
            leaf.consumer.request_processing(reason);
        }
    }

    /// Selects the timestamp to capture onto a record.
    ///
    /// Data-carrying reasons use the server or source timestamp per the
    /// binding configuration; everything else gets the client-receipt
    /// time.
    fn incoming_timestamp(&self, leaf: &LeafState, reason: ProcessReason) -> Timestamp {
        if reason.carries_data() {
            match leaf.consumer.link_config().timestamp_source {
                TimestampSource::Server => self.item.server_timestamp(),
                TimestampSource::Source => self.item.source_timestamp(),
            }
        } else {
            self.item.client_timestamp()
        }
    }

    fn leaf_state(&self) -> Option<&LeafState> {
        match &self.kind {
            crate::element::ElementKind::Leaf(leaf) => Some(leaf),
            crate::element::ElementKind::Vertex(_) => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
