// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Immutable update records.
//!
//! An [`UpdateRecord`] is the snapshot of one value or event transition,
//! created by the protocol layer on every notification and consumed
//! exactly once by the record-processing layer. Records are never mutated
//! after construction.

use std::fmt;

use canopy_core::types::{DataQuality, ProcessReason, Timestamp, Value};

// =============================================================================
// Update Record
// =============================================================================

/// One immutable notification of a value or event transition.
///
/// # Examples
///
/// ```
/// use canopy_element::update::UpdateRecord;
/// use canopy_core::types::{DataQuality, ProcessReason, Value};
/// use chrono::Utc;
///
/// let record = UpdateRecord::with_value(
///     Utc::now(),
///     ProcessReason::ValueChanged,
///     Value::Float64(25.5),
///     DataQuality::Good,
/// );
/// assert!(record.value().is_some());
///
/// let event = UpdateRecord::event(Utc::now(), ProcessReason::ConnectionLoss);
/// assert!(event.value().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRecord {
    timestamp: Timestamp,
    reason: ProcessReason,
    payload: Option<Value>,
    status: DataQuality,
}

impl UpdateRecord {
    /// Creates a data-carrying update record.
    pub fn with_value(
        timestamp: Timestamp,
        reason: ProcessReason,
        value: Value,
        status: DataQuality,
    ) -> Self {
        Self {
            timestamp,
            reason,
            payload: Some(value),
            status,
        }
    }

    /// Creates an event-only update record (failed read/write,
    /// connection loss).
    pub fn event(timestamp: Timestamp, reason: ProcessReason) -> Self {
        Self {
            timestamp,
            reason,
            payload: None,
            status: DataQuality::default(),
        }
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the reason for this update.
    #[inline]
    pub fn reason(&self) -> ProcessReason {
        self.reason
    }

    /// Returns the payload value, if this record carries data.
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Consumes the record, returning its payload value.
    #[inline]
    pub fn into_value(self) -> Option<Value> {
        self.payload
    }

    /// Returns the protocol-level read status.
    #[inline]
    pub fn status(&self) -> DataQuality {
        self.status
    }
}

impl fmt::Display for UpdateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(value) => write!(
                f,
                "{} = {} [{}] @ {}",
                self.reason,
                value,
                self.status,
                self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
            ),
            None => write!(
                f,
                "{} @ {}",
                self.reason,
                self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_data_record() {
        let record = UpdateRecord::with_value(
            Utc::now(),
            ProcessReason::ValueChanged,
            Value::Int32(7),
            DataQuality::Good,
        );
        assert_eq!(record.reason(), ProcessReason::ValueChanged);
        assert_eq!(record.value(), Some(&Value::Int32(7)));
        assert!(record.status().is_good());
        assert_eq!(record.into_value(), Some(Value::Int32(7)));
    }

    #[test]
    fn test_event_record() {
        let record = UpdateRecord::event(Utc::now(), ProcessReason::ConnectionLoss);
        assert_eq!(record.reason(), ProcessReason::ConnectionLoss);
        assert!(record.value().is_none());
    }

    #[test]
    fn test_display() {
        let record = UpdateRecord::with_value(
            Utc::now(),
            ProcessReason::ReadComplete,
            Value::Bool(true),
            DataQuality::Good,
        );
        let text = record.to_string();
        assert!(text.contains("read-complete"));
        assert!(text.contains("true"));
    }
}
