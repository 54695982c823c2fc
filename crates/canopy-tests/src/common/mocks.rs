// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Mock implementations of the canopy capability traits for testing the
//! element tree in isolation.
//!
//! ## Design Principles
//!
//! - Configurable behavior for different test scenarios
//! - Recording of interactions for verification
//! - Thread-safe for concurrent testing

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};

use canopy_core::consumer::RecordConsumer;
use canopy_core::item::ProtocolItem;
use canopy_core::link::LinkConfig;
use canopy_core::types::{ConnectionState, DataQuality, ProcessReason, Timestamp};

// =============================================================================
// Mock Protocol Item
// =============================================================================

/// A configurable mock protocol item.
///
/// The session-side state (connection state, notification timestamps,
/// read status) is settable per test; a fixed epoch keeps timestamp
/// assertions deterministic.
pub struct MockProtocolItem {
    state: RwLock<ConnectionState>,
    read_status: RwLock<DataQuality>,
    epoch: DateTime<Utc>,
}

impl MockProtocolItem {
    /// Create a mock item in the down state.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(ConnectionState::Down),
            read_status: RwLock::new(DataQuality::Good),
            epoch: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        })
    }

    /// Create a mock item already in the up state.
    pub fn up() -> Arc<Self> {
        let item = Self::new();
        item.set_state(ConnectionState::Up);
        item
    }

    /// Set the connection state.
    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// Set the read status captured onto subsequent updates.
    pub fn set_read_status(&self, status: DataQuality) {
        *self.read_status.write() = status;
    }

    /// The fixed server timestamp this mock reports.
    pub fn server_time(&self) -> Timestamp {
        self.epoch + Duration::seconds(1)
    }

    /// The fixed source timestamp this mock reports.
    pub fn source_time(&self) -> Timestamp {
        self.epoch + Duration::seconds(2)
    }

    /// The fixed client timestamp this mock reports.
    pub fn client_time(&self) -> Timestamp {
        self.epoch + Duration::seconds(3)
    }
}

impl ProtocolItem for MockProtocolItem {
    fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    fn server_timestamp(&self) -> Timestamp {
        self.server_time()
    }

    fn source_timestamp(&self) -> Timestamp {
        self.source_time()
    }

    fn client_timestamp(&self) -> Timestamp {
        self.client_time()
    }

    fn last_read_status(&self) -> DataQuality {
        *self.read_status.read()
    }
}

// =============================================================================
// Mock Record Consumer
// =============================================================================

/// A recording mock record consumer.
///
/// Counts processing requests and records their reasons for
/// verification; the link configuration is set at construction.
pub struct MockRecordConsumer {
    name: String,
    config: LinkConfig,
    record_lock: Mutex<()>,
    request_count: AtomicU64,
    request_history: Mutex<Vec<ProcessReason>>,
}

impl MockRecordConsumer {
    /// Create a consumer with the default link configuration.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_link_config(name, LinkConfig::default())
    }

    /// Create a consumer with a specific link configuration.
    pub fn with_link_config(name: impl Into<String>, config: LinkConfig) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            config,
            record_lock: Mutex::new(()),
            request_count: AtomicU64::new(0),
            request_history: Mutex::new(Vec::new()),
        })
    }

    /// Number of processing requests received.
    pub fn processing_requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Reasons of all processing requests, in order.
    pub fn request_history(&self) -> Vec<ProcessReason> {
        self.request_history.lock().clone()
    }

    /// Clears the recorded requests.
    pub fn reset(&self) {
        self.request_count.store(0, Ordering::Relaxed);
        self.request_history.lock().clear();
    }
}

impl RecordConsumer for MockRecordConsumer {
    fn request_processing(&self, reason: ProcessReason) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.request_history.lock().push(reason);
    }

    fn link_config(&self) -> LinkConfig {
        self.config.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.record_lock.lock()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
