// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Protocol item capability.
//!
//! The protocol/session collaborator implements [`ProtocolItem`] for each
//! subscribed item. The element tree queries it for connection state and
//! for the timestamps and read status to capture onto update records.
//!
//! All accessors are only meaningful from the context of an incoming
//! notification being pushed; the session worker updates them before
//! delivering data into the tree.

use crate::types::{ConnectionState, DataQuality, Timestamp};

/// The capability a protocol/session collaborator exposes to the tree.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. A single session worker thread
/// delivers all notifications for one item, so the timestamp and status
/// accessors are read on that same thread during delivery.
pub trait ProtocolItem: Send + Sync {
    /// Returns the item's connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Returns the server timestamp of the notification being delivered.
    fn server_timestamp(&self) -> Timestamp;

    /// Returns the source (device) timestamp of the notification being
    /// delivered.
    fn source_timestamp(&self) -> Timestamp;

    /// Returns the wall-clock capture taken when the notification was
    /// received from the session.
    fn client_timestamp(&self) -> Timestamp;

    /// Returns the read status of the notification being delivered.
    fn last_read_status(&self) -> DataQuality;
}
