// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Record consumer capability.
//!
//! The record-processing collaborator implements [`RecordConsumer`] for
//! each bound record. A leaf element holds exactly one consumer handle and
//! uses it to request processing when its queue transitions from empty to
//! non-empty, to obtain its binding configuration, and to serialize queue
//! and outgoing-value access through the per-record lock.

use parking_lot::MutexGuard;

use crate::link::LinkConfig;
use crate::types::ProcessReason;

/// The capability a record-processing collaborator exposes to its leaf.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the leaf calls
/// [`request_processing`](RecordConsumer::request_processing) from the
/// protocol worker thread while record processing runs in its own
/// context.
///
/// # Locking
///
/// [`lock`](RecordConsumer::lock) returns a guard over the per-record
/// mutex. The protocol side holds it while pushing onto the incoming
/// queue; the processing side holds it while draining the queue and
/// exchanging outgoing values. Push and pop therefore never run
/// concurrently for the same leaf.
pub trait RecordConsumer: Send + Sync {
    /// Requests one processing pass for the bound record.
    ///
    /// Called at most once per empty-to-non-empty queue transition
    /// (edge-triggered), and again by the processing side itself when a
    /// drained queue still holds records.
    fn request_processing(&self, reason: ProcessReason);

    /// Returns the binding configuration for this record.
    fn link_config(&self) -> LinkConfig;

    /// Acquires the per-record lock.
    fn lock(&self) -> MutexGuard<'_, ()>;

    /// Returns the record's name, for diagnostics only.
    fn name(&self) -> &str;
}
