// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Minimal in-crate test doubles.
//!
//! Unit tests in this crate need a protocol item and a record consumer;
//! these lightweight recording mocks keep them self-contained. The
//! full-featured mocks for cross-crate scenarios live in `canopy-tests`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use parking_lot::{Mutex, MutexGuard, RwLock};

use canopy_core::consumer::RecordConsumer;
use canopy_core::item::ProtocolItem;
use canopy_core::link::LinkConfig;
use canopy_core::types::{ConnectionState, DataQuality, ProcessReason, Timestamp};

use crate::element::Element;

/// A protocol item with settable state, timestamps, and status.
pub(crate) struct TestItem {
    state: RwLock<ConnectionState>,
    read_status: RwLock<DataQuality>,
}

impl TestItem {
    pub(crate) fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub(crate) fn set_read_status(&self, status: DataQuality) {
        *self.read_status.write() = status;
    }
}

impl ProtocolItem for TestItem {
    fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    fn server_timestamp(&self) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap()
    }

    fn source_timestamp(&self) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 2).unwrap()
    }

    fn client_timestamp(&self) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 3).unwrap()
    }

    fn last_read_status(&self) -> DataQuality {
        *self.read_status.read()
    }
}

/// A record consumer that counts processing requests.
pub(crate) struct TestConsumer {
    name: String,
    config: LinkConfig,
    record_lock: Mutex<()>,
    requests: AtomicU64,
    last_reason: RwLock<Option<ProcessReason>>,
}

impl TestConsumer {
    pub(crate) fn processing_requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        *self.last_reason.write() = None;
    }

    #[allow(dead_code)]
    pub(crate) fn last_reason(&self) -> Option<ProcessReason> {
        *self.last_reason.read()
    }
}

impl RecordConsumer for TestConsumer {
    fn request_processing(&self, reason: ProcessReason) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        *self.last_reason.write() = Some(reason);
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

/// Creates a test item in the default (down) state.
pub(crate) fn item() -> Arc<TestItem> {
    Arc::new(TestItem {
        state: RwLock::new(ConnectionState::Down),
        read_status: RwLock::new(DataQuality::Good),
    })
}

/// Creates a leaf with a default-configured recording consumer.
pub(crate) fn leaf_with_consumer(
    name: &str,
    item: Arc<TestItem>,
) -> (Arc<Element>, Arc<TestConsumer>) {
    leaf_with_link_config(name, item, LinkConfig::default())
}

/// Creates a leaf with a recording consumer using the given link config.
pub(crate) fn leaf_with_link_config(
    name: &str,
    item: Arc<TestItem>,
    config: LinkConfig,
) -> (Arc<Element>, Arc<TestConsumer>) {
    let consumer = Arc::new(TestConsumer {
        name: format!("rec-{}", if name.is_empty() { "root" } else { name }),
        config,
        record_lock: Mutex::new(()),
        requests: AtomicU64::new(0),
        last_reason: RwLock::new(None),
    });
    let leaf = Element::leaf(name, item, Arc::clone(&consumer) as Arc<dyn RecordConsumer>);
    (leaf, consumer)
}
