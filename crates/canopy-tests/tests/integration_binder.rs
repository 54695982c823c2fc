// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Structured Value Integration Tests
//!
//! Integration tests for structured fan-out/fan-in through the element
//! tree:
//!
//! - Decomposition onto mapped children with consumer wake-up
//! - Reassembly from dirty children with baseline preservation
//! - Partial bindings (unmapped fields and children)
//! - Connection-loss event propagation

use canopy_core::types::{ProcessReason, Value};

use canopy_tests::common::init_test_logging;
use canopy_tests::prelude::*;

fn motor_struct(speed: f64, state: bool, reserve: i32) -> Value {
    StructValueBuilder::new()
        .field("speed", speed)
        .field("state", state)
        .field("reserve", reserve)
        .build()
}

// =============================================================================
// Fan-Out Tests
// =============================================================================

#[test]
fn test_fan_out_wakes_each_bound_consumer_once() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let speed = builder.bind("motor.speed");
    let state = builder.bind("motor.state");
    let tree = builder.tree();

    tree.root()
        .unwrap()
        .set_incoming_value(ProcessReason::ValueChanged, StructValueBuilder::new()
            .field("motor", motor_struct(2.5, true, 0))
            .build());

    assert_eq!(speed.consumer.processing_requests(), 1);
    assert_eq!(state.consumer.processing_requests(), 1);

    let popped = speed.leaf.read_update().unwrap();
    assert_eq!(popped.record.value(), Some(&Value::Float64(2.5)));
    let popped = state.leaf.read_update().unwrap();
    assert_eq!(popped.record.value(), Some(&Value::Bool(true)));
}

#[test]
fn test_fan_out_ignores_unbound_fields() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let speed = builder.bind("motor.speed");
    let tree = builder.tree();

    let motor = tree.root().unwrap().find_child("motor").unwrap();
    motor.set_incoming_value(ProcessReason::ValueChanged, motor_struct(1.5, false, 7));

    // Only the bound field is delivered; "state" and "reserve" have no
    // matching child and are silently skipped.
    assert_eq!(speed.leaf.incoming_data(), Some(Value::Float64(1.5)));
    assert_eq!(speed.consumer.processing_requests(), 1);
}

#[test]
fn test_connection_loss_reaches_every_leaf() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let speed = builder.bind("motor.speed");
    let temp = builder.bind("sensors.temp");
    let tree = builder.tree();

    item.set_state(canopy_core::types::ConnectionState::Down);
    tree.root()
        .unwrap()
        .set_incoming_event(ProcessReason::ConnectionLoss);

    for bound in [&speed, &temp] {
        assert_eq!(bound.consumer.processing_requests(), 1);
        let popped = bound.leaf.read_update().unwrap();
        assert_eq!(popped.record.reason(), ProcessReason::ConnectionLoss);
        assert!(popped.record.value().is_none());
    }
}

// =============================================================================
// Fan-In Tests
// =============================================================================

#[test]
fn test_fan_in_without_writes_is_identity() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let _speed = builder.bind("motor.speed");
    let _state = builder.bind("motor.state");
    let tree = builder.tree();

    let motor = tree.root().unwrap().find_child("motor").unwrap();
    let input = motor_struct(2.5, true, 3);
    motor.set_incoming_value(ProcessReason::ValueChanged, input.clone());

    assert_eq!(motor.outgoing_data(), Some(input.clone()));
    assert!(!motor.is_dirty());
    // Idempotent: repeated fan-in keeps returning the baseline.
    assert_eq!(motor.outgoing_data(), Some(input));
}

#[test]
fn test_fan_in_changes_only_written_field() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let _speed = builder.bind("motor.speed");
    let state = builder.bind("motor.state");
    let tree = builder.tree();

    let motor = tree.root().unwrap().find_child("motor").unwrap();
    motor.set_incoming_value(ProcessReason::ValueChanged, motor_struct(2.5, true, 3));

    state.leaf.write_value(Value::Bool(false)).unwrap();

    let assembled = motor.outgoing_data().unwrap();
    // The written field changed; unbound and untouched fields come from
    // the baseline verbatim.
    assert_eq!(assembled, motor_struct(2.5, false, 3));
    assert!(motor.is_dirty());
    assert!(!state.leaf.is_dirty());
}

#[test]
fn test_fan_in_clears_dirty_once() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let speed = builder.bind("motor.speed");
    let _state = builder.bind("motor.state");
    let tree = builder.tree();

    let motor = tree.root().unwrap().find_child("motor").unwrap();
    motor.set_incoming_value(ProcessReason::ValueChanged, motor_struct(1.0, true, 0));

    speed.leaf.write_value(Value::Float64(9.0)).unwrap();
    assert_eq!(
        motor.outgoing_data(),
        Some(motor_struct(9.0, true, 0))
    );

    // The dirty flag was consumed; the next fan-in is a no-op again.
    assert_eq!(motor.outgoing_data(), Some(motor_struct(1.0, true, 0)));
    assert!(!motor.is_dirty());
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_full_round_trip_through_consumer() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let speed = builder.bind("motor.speed");
    let state = builder.bind("motor.state");
    let tree = builder.tree();

    // Protocol delivers a structure; both consumers are woken.
    let motor = tree.root().unwrap().find_child("motor").unwrap();
    motor.set_incoming_value(ProcessReason::ValueChanged, motor_struct(2.5, true, 1));

    // Each consumer drains its record.
    let speed_update = speed.leaf.read_update().unwrap();
    assert_eq!(speed_update.record.value(), Some(&Value::Float64(2.5)));
    assert_eq!(speed_update.next_reason, None);
    state.leaf.read_update().unwrap();

    // One consumer produces an outgoing value (a write), the protocol
    // layer fans in and ships the reassembled structure.
    speed.leaf.write_value(Value::Float64(3.0)).unwrap();
    let outbound = motor.outgoing_data().unwrap();
    assert_eq!(outbound, motor_struct(3.0, true, 1));

    // After the send, the protocol layer clears the outgoing caches.
    motor.clear_outgoing();
    speed.leaf.clear_outgoing();
    assert!(!motor.is_dirty());

    // A later notification reflects the written value coming back.
    motor.set_incoming_value(ProcessReason::ValueChanged, motor_struct(3.0, true, 1));
    assert_eq!(
        speed.leaf.read_update().unwrap().record.value(),
        Some(&Value::Float64(3.0))
    );
}

#[test]
fn test_write_complete_propagates_to_mapped_records() {
    init_test_logging();
    let item = MockProtocolItem::up();
    let mut builder = TreeBuilder::new(item);
    let speed = builder.bind("motor.speed");
    let state = builder.bind("motor.state");
    let tree = builder.tree();

    let motor = tree.root().unwrap().find_child("motor").unwrap();
    motor.set_incoming_value(ProcessReason::ValueChanged, motor_struct(1.0, true, 0));
    speed.consumer.reset();
    state.consumer.reset();

    // The protocol layer reports completion of an outgoing write for the
    // whole structure; every mapped record is asked to process it.
    motor.request_processing(ProcessReason::WriteComplete);

    assert_eq!(
        speed.consumer.request_history(),
        vec![ProcessReason::WriteComplete]
    );
    assert_eq!(
        state.consumer.request_history(),
        vec![ProcessReason::WriteComplete]
    );
}
