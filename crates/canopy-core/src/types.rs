// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for canopy.
//!
//! This module provides the protocol-agnostic value and status types that
//! flow through the data-element tree and its update queues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValueError;

// =============================================================================
// Value Types
// =============================================================================

/// A protocol-agnostic data value.
///
/// This enum can represent any value type delivered by an industrial
/// protocol session, including nested structures (OPC UA extension
/// objects, structured tags).
///
/// # Examples
///
/// ```
/// use canopy_core::types::Value;
///
/// let temp = Value::Float64(25.5);
/// assert_eq!(temp.as_f64(), Some(25.5));
///
/// let status = Value::Bool(true);
/// assert_eq!(status.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 8-bit integer
    Int8(i8),

    /// Signed 16-bit integer
    Int16(i16),

    /// Signed 32-bit integer
    Int32(i32),

    /// Signed 64-bit integer
    Int64(i64),

    /// Unsigned 8-bit integer
    UInt8(u8),

    /// Unsigned 16-bit integer
    UInt16(u16),

    /// Unsigned 32-bit integer
    UInt32(u32),

    /// Unsigned 64-bit integer
    UInt64(u64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// UTF-8 string
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Array of values
    Array(Vec<Value>),

    /// Named-field structure, fields in wire order
    Struct(Vec<(String, Value)>),

    /// Null/undefined value
    Null,
}

impl Value {
    /// Returns the type name of this value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns the kind discriminant of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int8(_) => ValueKind::Int8,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt8(_) => ValueKind::UInt8,
            Value::UInt16(_) => ValueKind::UInt16,
            Value::UInt32(_) => ValueKind::UInt32,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Array(_) => ValueKind::Array,
            Value::Struct(_) => ValueKind::Struct,
            Value::Null => ValueKind::Null,
        }
    }

    /// Returns `true` if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a numeric value (integer or float).
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int8(_)
                | Value::Int16(_)
                | Value::Int32(_)
                | Value::Int64(_)
                | Value::UInt8(_)
                | Value::UInt16(_)
                | Value::UInt32(_)
                | Value::UInt64(_)
                | Value::Float32(_)
                | Value::Float64(_)
        )
    }

    /// Attempts to convert this value to a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::UInt8(v) => Some(*v as i64),
            Value::UInt16(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            Value::Float32(v) => Some(*v as i64),
            Value::Float64(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Attempts to convert this value to a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Bool(v) => Some(if *v { 1 } else { 0 }),
            Value::Int8(v) if *v >= 0 => Some(*v as u64),
            Value::Int16(v) if *v >= 0 => Some(*v as u64),
            Value::Int32(v) if *v >= 0 => Some(*v as u64),
            Value::Int64(v) if *v >= 0 => Some(*v as u64),
            Value::UInt8(v) => Some(*v as u64),
            Value::UInt16(v) => Some(*v as u64),
            Value::UInt32(v) => Some(*v as u64),
            Value::UInt64(v) => Some(*v),
            Value::Float32(v) if *v >= 0.0 => Some(*v as u64),
            Value::Float64(v) if *v >= 0.0 => Some(*v as u64),
            _ => None,
        }
    }

    /// Attempts to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Int8(v) => Some(*v as f64),
            Value::Int16(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::UInt8(v) => Some(*v as f64),
            Value::UInt16(v) => Some(*v as f64),
            Value::UInt32(v) => Some(*v as f64),
            Value::UInt64(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get this value as a string reference.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to get this value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to get this value as an array reference.
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to get this value as a structure field slice.
    #[inline]
    pub fn as_struct(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the field names of a structure value, in wire order.
    pub fn field_names(&self) -> Option<Vec<&str>> {
        self.as_struct()
            .map(|fields| fields.iter().map(|(name, _)| name.as_str()).collect())
    }

    /// Returns a reference to the structure field at `index`.
    #[inline]
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.as_struct().and_then(|fields| fields.get(index)).map(|(_, v)| v)
    }

    /// Replaces the structure field at `index`.
    ///
    /// Returns `false` if this value is not a structure or the index is
    /// out of bounds.
    pub fn set_field(&mut self, index: usize, value: Value) -> bool {
        match self {
            Value::Struct(fields) => match fields.get_mut(index) {
                Some(slot) => {
                    slot.1 = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Converts this value to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int8(v) => serde_json::json!(*v),
            Value::Int16(v) => serde_json::json!(*v),
            Value::Int32(v) => serde_json::json!(*v),
            Value::Int64(v) => serde_json::json!(*v),
            Value::UInt8(v) => serde_json::json!(*v),
            Value::UInt16(v) => serde_json::json!(*v),
            Value::UInt32(v) => serde_json::json!(*v),
            Value::UInt64(v) => serde_json::json!(*v),
            Value::Float32(v) => serde_json::json!(*v),
            Value::Float64(v) => serde_json::json!(*v),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Bytes(v) => serde_json::json!(v),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|v| v.to_json()).collect())
            }
            Value::Struct(fields) => {
                let map: serde_json::Map<String, serde_json::Value> =
                    fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
                serde_json::Value::Object(map)
            }
            Value::Null => serde_json::Value::Null,
        }
    }

    /// Converts this value to the given target kind, range-checking
    /// narrowing numeric conversions.
    ///
    /// This is the write-side conversion: a value produced by the record
    /// consumer is coerced to the wire type of the element's last incoming
    /// value before being cached as outgoing data.
    ///
    /// # Examples
    ///
    /// ```
    /// use canopy_core::types::{Value, ValueKind};
    ///
    /// let v = Value::Int64(200).coerce_to(ValueKind::UInt8).unwrap();
    /// assert_eq!(v, Value::UInt8(200));
    ///
    /// assert!(Value::Int64(300).coerce_to(ValueKind::UInt8).is_err());
    /// ```
    pub fn coerce_to(&self, target: ValueKind) -> Result<Value, ValueError> {
        let out_of_range = || ValueError::out_of_range(self.to_string(), target);
        let unsupported = || ValueError::unsupported_conversion(self.kind(), target);

        match target {
            ValueKind::Bool => match self {
                Value::Bool(v) => Ok(Value::Bool(*v)),
                Value::String(s) => {
                    Ok(Value::Bool(s.starts_with(&['Y', 'y', 'T', 't', '1'][..])))
                }
                v if v.is_numeric() => Ok(Value::Bool(v.as_f64() != Some(0.0))),
                _ => Err(unsupported()),
            },
            ValueKind::Int8 => self.coerce_i64(target)?.try_into().map(Value::Int8).map_err(|_| out_of_range()),
            ValueKind::Int16 => self.coerce_i64(target)?.try_into().map(Value::Int16).map_err(|_| out_of_range()),
            ValueKind::Int32 => self.coerce_i64(target)?.try_into().map(Value::Int32).map_err(|_| out_of_range()),
            ValueKind::Int64 => self.coerce_i64(target).map(Value::Int64),
            ValueKind::UInt8 => self.coerce_u64(target)?.try_into().map(Value::UInt8).map_err(|_| out_of_range()),
            ValueKind::UInt16 => self.coerce_u64(target)?.try_into().map(Value::UInt16).map_err(|_| out_of_range()),
            ValueKind::UInt32 => self.coerce_u64(target)?.try_into().map(Value::UInt32).map_err(|_| out_of_range()),
            ValueKind::UInt64 => self.coerce_u64(target).map(Value::UInt64),
            ValueKind::Float32 => {
                let v = self.coerce_f64(target)?;
                if v.is_finite() && (v < f32::MIN as f64 || v > f32::MAX as f64) {
                    Err(out_of_range())
                } else {
                    Ok(Value::Float32(v as f32))
                }
            }
            ValueKind::Float64 => self.coerce_f64(target).map(Value::Float64),
            ValueKind::String => match self {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Bool(_) | Value::Null => Err(unsupported()),
                v if v.is_numeric() => Ok(Value::String(v.to_string())),
                _ => Err(unsupported()),
            },
            ValueKind::Bytes => match self {
                Value::Bytes(b) => Ok(Value::Bytes(b.clone())),
                _ => Err(unsupported()),
            },
            // Aggregates and null are passed through only when the kinds
            // already match; element-wise conversion happens per child.
            ValueKind::Array | ValueKind::Struct | ValueKind::Null => {
                if self.kind() == target {
                    Ok(self.clone())
                } else {
                    Err(unsupported())
                }
            }
        }
    }

    fn coerce_i64(&self, target: ValueKind) -> Result<i64, ValueError> {
        match self {
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValueError::out_of_range(s.clone(), target)),
            v => v
                .as_i64()
                .ok_or_else(|| ValueError::unsupported_conversion(self.kind(), target)),
        }
    }

    fn coerce_u64(&self, target: ValueKind) -> Result<u64, ValueError> {
        match self {
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| ValueError::out_of_range(s.clone(), target)),
            v => match v.as_i64() {
                Some(i) => u64::try_from(i)
                    .map_err(|_| ValueError::out_of_range(v.to_string(), target)),
                None => v
                    .as_u64()
                    .ok_or_else(|| ValueError::unsupported_conversion(self.kind(), target)),
            },
        }
    }

    fn coerce_f64(&self, target: ValueKind) -> Result<f64, ValueError> {
        match self {
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValueError::out_of_range(s.clone(), target)),
            v => v
                .as_f64()
                .ok_or_else(|| ValueError::unsupported_conversion(self.kind(), target)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Array(v) => write!(f, "[{} elements]", v.len()),
            Value::Struct(v) => write!(f, "{{{} fields}}", v.len()),
            Value::Null => write!(f, "null"),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// Implement From for common types
macro_rules! impl_from_for_value {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_for_value!(Bool, bool);
impl_from_for_value!(Int8, i8);
impl_from_for_value!(Int16, i16);
impl_from_for_value!(Int32, i32);
impl_from_for_value!(Int64, i64);
impl_from_for_value!(UInt8, u8);
impl_from_for_value!(UInt16, u16);
impl_from_for_value!(UInt32, u32);
impl_from_for_value!(UInt64, u64);
impl_from_for_value!(Float32, f32);
impl_from_for_value!(Float64, f64);
impl_from_for_value!(String, String);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

// =============================================================================
// Value Kind
// =============================================================================

/// The type discriminant of a [`Value`], used as a conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Boolean
    Bool,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// UTF-8 string
    String,
    /// Raw bytes
    Bytes,
    /// Array of values
    Array,
    /// Named-field structure
    Struct,
    /// Null/undefined
    Null,
}

impl ValueKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int8 => "int8",
            ValueKind::Int16 => "int16",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::UInt8 => "uint8",
            ValueKind::UInt16 => "uint16",
            ValueKind::UInt32 => "uint32",
            ValueKind::UInt64 => "uint64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Array => "array",
            ValueKind::Struct => "struct",
            ValueKind::Null => "null",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Data Quality
// =============================================================================

/// The quality status of a data value.
///
/// This follows OPC UA quality concepts but is protocol-agnostic. It is
/// captured onto every update record as the protocol-level read status and
/// interpreted by the record consumer, never by the tree or queue layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "reason")]
pub enum DataQuality {
    /// The value is good and reliable.
    #[default]
    Good,

    /// The value is uncertain but may be usable.
    Uncertain(UncertainReason),

    /// The value is bad and should not be used.
    Bad(BadReason),
}

impl DataQuality {
    /// Returns `true` if the quality is good.
    #[inline]
    pub fn is_good(&self) -> bool {
        matches!(self, DataQuality::Good)
    }

    /// Returns `true` if the quality is usable (good or uncertain).
    #[inline]
    pub fn is_usable(&self) -> bool {
        matches!(self, DataQuality::Good | DataQuality::Uncertain(_))
    }

    /// Returns `true` if the quality is bad.
    #[inline]
    pub fn is_bad(&self) -> bool {
        matches!(self, DataQuality::Bad(_))
    }

    /// Creates a bad quality with an unknown reason.
    #[inline]
    pub fn bad() -> Self {
        DataQuality::Bad(BadReason::Unknown)
    }

    /// Creates an uncertain quality with an unknown reason.
    #[inline]
    pub fn uncertain() -> Self {
        DataQuality::Uncertain(UncertainReason::Unknown)
    }
}

impl fmt::Display for DataQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQuality::Good => write!(f, "Good"),
            DataQuality::Uncertain(reason) => write!(f, "Uncertain: {}", reason),
            DataQuality::Bad(reason) => write!(f, "Bad: {}", reason),
        }
    }
}

/// Reasons for uncertain data quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UncertainReason {
    /// Using last known value due to communication issues.
    LastKnownValue,

    /// Sensor operating below normal range.
    SubNormal,

    /// Initial value before first read.
    InitialValue,

    /// Unknown reason.
    #[default]
    Unknown,
}

impl fmt::Display for UncertainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UncertainReason::LastKnownValue => write!(f, "LastKnownValue"),
            UncertainReason::SubNormal => write!(f, "SubNormal"),
            UncertainReason::InitialValue => write!(f, "InitialValue"),
            UncertainReason::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Reasons for bad data quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BadReason {
    /// Item is not connected.
    NotConnected,

    /// Communication failure.
    CommunicationFailure,

    /// Access denied to the value.
    AccessDenied,

    /// Value out of range.
    OutOfRange,

    /// Unknown reason.
    #[default]
    Unknown,
}

impl fmt::Display for BadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadReason::NotConnected => write!(f, "NotConnected"),
            BadReason::CommunicationFailure => write!(f, "CommunicationFailure"),
            BadReason::AccessDenied => write!(f, "AccessDenied"),
            BadReason::OutOfRange => write!(f, "OutOfRange"),
            BadReason::Unknown => write!(f, "Unknown"),
        }
    }
}

// =============================================================================
// Process Reason
// =============================================================================

/// The reason an update record was created, carried from the protocol
/// layer to the record consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessReason {
    /// A monitored value changed on the server.
    ValueChanged,

    /// A read request completed with data.
    ReadComplete,

    /// A read request failed.
    ReadFailure,

    /// A write request completed.
    WriteComplete,

    /// The connection to the server was lost.
    ConnectionLoss,
}

impl ProcessReason {
    /// Returns the reason name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessReason::ValueChanged => "value-changed",
            ProcessReason::ReadComplete => "read-complete",
            ProcessReason::ReadFailure => "read-failure",
            ProcessReason::WriteComplete => "write-complete",
            ProcessReason::ConnectionLoss => "connection-loss",
        }
    }

    /// Returns `true` if records with this reason carry data.
    #[inline]
    pub fn carries_data(&self) -> bool {
        matches!(self, ProcessReason::ValueChanged | ProcessReason::ReadComplete)
    }
}

impl fmt::Display for ProcessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Connection State
// =============================================================================

/// The connection state of a protocol item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Item is not connected.
    #[default]
    Down,

    /// Item is connected, waiting for the initial read to complete.
    InitialRead,

    /// Item is connected and operational.
    Up,
}

impl ConnectionState {
    /// Returns `true` if the item is fully operational.
    #[inline]
    pub fn is_up(&self) -> bool {
        matches!(self, ConnectionState::Up)
    }

    /// Returns `true` if the item has a live connection (up or waiting
    /// for the initial read).
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Up | ConnectionState::InitialRead)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Down => write!(f, "Down"),
            ConnectionState::InitialRead => write!(f, "InitialRead"),
            ConnectionState::Up => write!(f, "Up"),
        }
    }
}

// =============================================================================
// Timestamp Source
// =============================================================================

/// Which item timestamp is captured onto data-carrying update records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// The server's publishing timestamp.
    #[default]
    Server,

    /// The data source's (device's) timestamp.
    Source,
}

/// Convenience alias for the timestamp representation used throughout.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// Tests
// =============================================================================
