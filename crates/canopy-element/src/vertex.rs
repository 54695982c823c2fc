// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Vertex-side element operations.
//!
//! A vertex represents one level of a structured value. Incoming
//! structures are decomposed onto mapped children by positional field
//! index; outgoing structures are reassembled from children whose
//! outgoing data is dirty, starting from the last incoming structure as
//! the baseline so untouched fields pass through verbatim.
//!
//! The field-index map is built lazily on first use and then frozen.
//! Children whose names match no field (and fields matching no child)
//! are tolerated; partial bindings are a supported use case.

use std::sync::Weak;

use tracing::{debug, warn};

use canopy_core::types::{ProcessReason, Value};

use crate::element::{Element, VertexState};

// =============================================================================
// Field Map
// =============================================================================

/// The lazily built mapping from structure field index to child element.
///
/// Built at most once per structure definition; the two-state shape makes
/// the build-once invariant explicit. The map records the field-name list
/// it was built against so that a changed structure definition is
/// detected and the map rebuilt instead of silently mismapping.
pub(crate) enum FieldMap {
    /// No structure seen yet.
    Unmapped,

    /// Map built against the recorded field-name list.
    Mapped {
        /// Field names of the structure definition the map was built
        /// against, in wire order.
        field_names: Vec<String>,
        /// `(field index, child)` pairs for children that matched a
        /// field name.
        entries: Vec<(usize, Weak<Element>)>,
    },
}

impl FieldMap {
    pub(crate) fn is_mapped(&self) -> bool {
        matches!(self, FieldMap::Mapped { .. })
    }
}

impl Element {
    /// Builds or reuses the index-to-element map for the given structure
    /// fields, returning a snapshot of the entries.
    fn mapped_children(
        &self,
        vertex: &VertexState,
        fields: &[(String, Value)],
    ) -> Vec<(usize, Weak<Element>)> {
        let mut map = vertex.field_map.lock();

        if let FieldMap::Mapped { field_names, entries } = &*map {
            if field_names.len() == fields.len()
                && field_names.iter().zip(fields).all(|(n, (f, _))| n == f)
            {
                return entries.clone();
            }
            debug!(
                element = %self.display_name(),
                "structure definition changed, rebuilding index-to-element map"
            );
        }

        let field_names: Vec<String> = fields.iter().map(|(name, _)| name.clone()).collect();
        let mut entries = Vec::new();
        let children = vertex.children.read();
        for weak_child in children.iter() {
            if let Some(child) = weak_child.upgrade() {
                if let Some(index) = field_names.iter().position(|name| *name == child.name) {
                    entries.push((index, Weak::clone(weak_child)));
                }
            }
        }
        debug!(
            element = %self.display_name(),
            mapped = entries.len(),
            children = children.len(),
            fields = field_names.len(),
            "built index-to-element map for child elements"
        );

        *map = FieldMap::Mapped {
            field_names,
            entries: entries.clone(),
        };
        entries
    }

    /// Decomposes an incoming structured value onto mapped children.
    pub(crate) fn vertex_incoming_value(
        &self,
        vertex: &VertexState,
        reason: ProcessReason,
        value: Value,
    ) {
        // Cache a copy of this element's value
        *self.incoming.write() = Some(value.clone());

        let fields = match value.as_struct() {
            Some(fields) => fields,
            None => {
                warn!(
                    element = %self.display_name(),
                    kind = value.type_name(),
                    "cannot decompose non-structured value onto child elements"
                );
                return;
            }
        };

        debug!(
            element = %self.display_name(),
            reason = %reason,
            fields = fields.len(),
            "splitting structured data to child elements"
        );

        for (index, weak_child) in self.mapped_children(vertex, fields) {
            if let Some(child) = weak_child.upgrade() {
                if let Some(field_value) = value.field(index) {
                    child.set_incoming_value(reason, field_value.clone());
                }
            }
        }
    }

    /// Forwards a data-less event to all children.
    pub(crate) fn vertex_incoming_event(&self, vertex: &VertexState, reason: ProcessReason) {
        for child in vertex.children.read().iter().filter_map(Weak::upgrade) {
            child.set_incoming_event(reason);
        }
    }

    /// Reassembles the outgoing structure from dirty children.
    ///
    /// Returns the assembled value and whether any child contributed. The
    /// baseline is the last incoming structure, so unmapped and untouched
    /// fields are preserved verbatim; when no child is dirty the baseline
    /// is returned as-is, skipping the re-encode.
    pub(crate) fn vertex_outgoing_data(&self, vertex: &VertexState) -> (Option<Value>, bool) {
        let baseline = self.incoming.read().clone();

        let mut result = match baseline {
            Some(value) => value,
            None => {
                let mut outgoing = self.outgoing.lock();
                outgoing.value = None;
                outgoing.dirty = false;
                return (None, false);
            }
        };

        let mut updated = false;
        if let Some(fields) = result.as_struct().map(|fields| fields.to_vec()) {
            debug!(
                element = %self.display_name(),
                fields = fields.len(),
                "updating structured data from child elements"
            );
            for (index, weak_child) in self.mapped_children(vertex, &fields) {
                if let Some(child) = weak_child.upgrade() {
                    if let Some(child_value) = child.take_outgoing_if_dirty() {
                        result.set_field(index, child_value);
                        updated = true;
                    } else {
                        debug!(
                            element = %child.display_name(),
                            "child data ignored (not dirty)"
                        );
                    }
                }
            }
        }

        let mut outgoing = self.outgoing.lock();
        outgoing.value = Some(result.clone());
        outgoing.dirty = updated;
        (Some(result), updated)
    }

    /// Takes this element's outgoing contribution for a parent fan-in.
    ///
    /// For a leaf, checks and clears the dirty flag under the outgoing
    /// lock, returning the cached value when it was dirty. For a nested
    /// vertex, recursively reassembles its own structure and contributes
    /// it when any of its descendants was dirty.
    pub(crate) fn take_outgoing_if_dirty(&self) -> Option<Value> {
        match &self.kind {
            crate::element::ElementKind::Leaf(_) => {
                let mut outgoing = self.outgoing.lock();
                if outgoing.dirty {
                    outgoing.dirty = false;
                    outgoing.value.clone()
                } else {
                    None
                }
            }
            crate::element::ElementKind::Vertex(vertex) => {
                let (value, updated) = self.vertex_outgoing_data(vertex);
                if updated {
                    value
                } else {
                    None
                }
            }
        }
    }

    /// Propagates a processing request to the records below this vertex.
    pub(crate) fn vertex_request_processing(&self, vertex: &VertexState, reason: ProcessReason) {
        let entries = match &*vertex.field_map.lock() {
            FieldMap::Mapped { entries, .. } => entries.clone(),
            FieldMap::Unmapped => return,
        };
        for child in entries.iter().filter_map(|(_, weak)| weak.upgrade()) {
            child.request_processing(reason);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::types::ConnectionState;
    use crate::testing::{item, leaf_with_consumer};

    fn two_field_struct(speed: f64, state: bool) -> Value {
        Value::Struct(vec![
            ("speed".into(), Value::Float64(speed)),
            ("state".into(), Value::Bool(state)),
        ])
    }

    #[test]
    fn test_fan_out_delivers_mapped_fields() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, speed_consumer) = leaf_with_consumer("speed", item.clone());
        let (state, state_consumer) = leaf_with_consumer("state", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&state).unwrap();

        vertex.set_incoming_value(ProcessReason::ValueChanged, two_field_struct(2.5, true));

        assert_eq!(speed.incoming_data(), Some(Value::Float64(2.5)));
        assert_eq!(state.incoming_data(), Some(Value::Bool(true)));
        assert_eq!(speed_consumer.processing_requests(), 1);
        assert_eq!(state_consumer.processing_requests(), 1);
    }

    #[test]
    fn test_fan_out_tolerates_unmatched_children() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, speed_consumer) = leaf_with_consumer("speed", item.clone());
        let (stray, stray_consumer) = leaf_with_consumer("unrelated", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&stray).unwrap();

        vertex.set_incoming_value(ProcessReason::ValueChanged, two_field_struct(1.0, false));

        assert_eq!(speed_consumer.processing_requests(), 1);
        assert_eq!(stray_consumer.processing_requests(), 0);
        assert_eq!(stray.incoming_data(), None);
    }

    #[test]
    fn test_fan_out_non_struct_is_ignored() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, speed_consumer) = leaf_with_consumer("speed", item.clone());
        let vertex = Element::vertex("motor", item, &speed);

        vertex.set_incoming_value(ProcessReason::ValueChanged, Value::Int32(1));

        assert_eq!(vertex.incoming_data(), Some(Value::Int32(1)));
        assert_eq!(speed_consumer.processing_requests(), 0);
    }

    #[test]
    fn test_event_forwards_to_all_children() {
        let item = item();
        let (speed, speed_consumer) = leaf_with_consumer("speed", item.clone());
        let (stray, stray_consumer) = leaf_with_consumer("unrelated", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&stray).unwrap();

        vertex.set_incoming_event(ProcessReason::ConnectionLoss);

        // Events reach every child, mapped or not.
        assert_eq!(speed_consumer.processing_requests(), 1);
        assert_eq!(stray_consumer.processing_requests(), 1);
    }

    #[test]
    fn test_fan_in_without_dirty_children_returns_baseline() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, _sc) = leaf_with_consumer("speed", item.clone());
        let (state, _tc) = leaf_with_consumer("state", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&state).unwrap();

        let input = two_field_struct(2.5, true);
        vertex.set_incoming_value(ProcessReason::ValueChanged, input.clone());

        assert_eq!(vertex.outgoing_data(), Some(input));
        assert!(!vertex.is_dirty());
    }

    #[test]
    fn test_fan_in_splices_dirty_child_only() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, _sc) = leaf_with_consumer("speed", item.clone());
        let (state, _tc) = leaf_with_consumer("state", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&state).unwrap();

        vertex.set_incoming_value(ProcessReason::ValueChanged, two_field_struct(2.5, true));
        state.write_value(Value::Bool(false)).unwrap();

        let assembled = vertex.outgoing_data().unwrap();
        assert_eq!(assembled, two_field_struct(2.5, false));
        assert!(vertex.is_dirty());
        assert!(!state.is_dirty());

        // A second fan-in finds no dirty child and returns the baseline.
        assert_eq!(vertex.outgoing_data(), Some(two_field_struct(2.5, true)));
        assert!(!vertex.is_dirty());
    }

    #[test]
    fn test_field_map_rebuilds_on_definition_change() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, _sc) = leaf_with_consumer("speed", item.clone());
        let (torque, torque_consumer) = leaf_with_consumer("torque", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&torque).unwrap();

        vertex.set_incoming_value(ProcessReason::ValueChanged, two_field_struct(1.0, true));
        assert_eq!(torque_consumer.processing_requests(), 0);

        // Same vertex, new structure definition including "torque".
        vertex.set_incoming_value(
            ProcessReason::ValueChanged,
            Value::Struct(vec![
                ("speed".into(), Value::Float64(2.0)),
                ("torque".into(), Value::Float64(0.5)),
            ]),
        );

        assert_eq!(torque.incoming_data(), Some(Value::Float64(0.5)));
        assert_eq!(torque_consumer.processing_requests(), 1);
    }

    #[test]
    fn test_nested_vertex_fan_in() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (depth, _dc) = leaf_with_consumer("depth", item.clone());
        let inner = Element::vertex("inner", item.clone(), &depth);
        depth.set_parent(&inner);
        let (flat, _fc) = leaf_with_consumer("flat", item.clone());
        let outer = Element::vertex("outer", item, &inner);
        outer.add_child(&flat).unwrap();

        outer.set_incoming_value(
            ProcessReason::ValueChanged,
            Value::Struct(vec![
                (
                    "inner".into(),
                    Value::Struct(vec![("depth".into(), Value::Int32(1))]),
                ),
                ("flat".into(), Value::Bool(true)),
            ]),
        );
        assert_eq!(depth.incoming_data(), Some(Value::Int32(1)));

        depth.write_value(Value::Int32(9)).unwrap();
        let assembled = outer.outgoing_data().unwrap();
        assert_eq!(
            assembled,
            Value::Struct(vec![
                (
                    "inner".into(),
                    Value::Struct(vec![("depth".into(), Value::Int32(9))]),
                ),
                ("flat".into(), Value::Bool(true)),
            ])
        );
    }

    #[test]
    fn test_request_processing_walks_mapped_children() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let (speed, speed_consumer) = leaf_with_consumer("speed", item.clone());
        let (stray, stray_consumer) = leaf_with_consumer("unrelated", item.clone());
        let vertex = Element::vertex("motor", item, &speed);
        vertex.add_child(&stray).unwrap();

        // Before mapping, there is nothing to propagate to.
        vertex.request_processing(ProcessReason::WriteComplete);
        assert_eq!(speed_consumer.processing_requests(), 0);

        vertex.set_incoming_value(ProcessReason::ValueChanged, two_field_struct(1.0, true));
        speed_consumer.reset();

        vertex.request_processing(ProcessReason::WriteComplete);
        assert_eq!(speed_consumer.processing_requests(), 1);
        assert_eq!(stray_consumer.processing_requests(), 0);
    }
}
