// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Data elements: the nodes of the element tree.
//!
//! An [`Element`] is either a *leaf*, bound to exactly one record
//! consumer and owning the incoming update queue, or a *vertex*, a
//! structural node with child elements representing one level of a
//! nested value.
//!
//! # Ownership
//!
//! The tree is inverted-ownership: every element holds a strong
//! ([`Arc`]) reference to its parent, while a vertex holds only weak
//! references to its children. Leaves are owned by their consumer-side
//! holders; a vertex stays alive exactly as long as at least one
//! descendant leaf references it upward. Vertices therefore tolerate
//! children vanishing at any time.
//!
//! # Concurrency
//!
//! Tree shape (parent/child links) is mutated only during
//! single-threaded construction and is read-only during live operation.
//! The incoming cache is written by the single protocol worker; the
//! outgoing cache and dirty flag are guarded by a per-element lock that
//! is never held across sibling elements.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use canopy_core::consumer::RecordConsumer;
use canopy_core::error::{TreeError, ValueError};
use canopy_core::item::ProtocolItem;
use canopy_core::types::{ProcessReason, Value};

use crate::path::ROOT_NAME;
use crate::queue::UpdateQueue;
use crate::vertex::FieldMap;

// =============================================================================
// Element
// =============================================================================

/// One node of the data-element tree.
pub struct Element {
    /// Element name, immutable after construction.
    pub(crate) name: String,

    /// The protocol item this tree belongs to.
    pub(crate) item: Arc<dyn ProtocolItem>,

    /// Strong upward link; `None` only for the root.
    pub(crate) parent: RwLock<Option<Arc<Element>>>,

    /// Cache of the latest incoming value.
    pub(crate) incoming: RwLock<Option<Value>>,

    /// Outgoing value cache and dirty flag, under the outgoing lock.
    pub(crate) outgoing: Mutex<OutgoingSlot>,

    /// Leaf- or vertex-specific state.
    pub(crate) kind: ElementKind,
}

/// Outgoing value cache with its dirty flag.
#[derive(Debug, Default)]
pub(crate) struct OutgoingSlot {
    /// Outgoing value has been (or needs to be) sent upstream.
    pub(crate) dirty: bool,
    /// Cache of the latest outgoing value.
    pub(crate) value: Option<Value>,
}

/// The two element variants.
pub(crate) enum ElementKind {
    /// Bound to one record consumer; owns the incoming queue.
    Leaf(LeafState),
    /// Structural node with child elements.
    Vertex(VertexState),
}

/// Leaf-specific state.
pub(crate) struct LeafState {
    /// The bound record consumer.
    pub(crate) consumer: Arc<dyn RecordConsumer>,
    /// Queue of incoming updates, accessed under the record lock.
    pub(crate) queue: Mutex<UpdateQueue>,
}

/// Vertex-specific state.
pub(crate) struct VertexState {
    /// Non-owning links to children, in insertion order.
    pub(crate) children: RwLock<Vec<Weak<Element>>>,
    /// Lazily built field-index-to-child map.
    pub(crate) field_map: Mutex<FieldMap>,
}

impl Element {
    /// Creates a leaf element bound to a record consumer.
    ///
    /// The queue is sized from the consumer's link configuration. The
    /// returned element is owned by the caller (the consumer side); the
    /// tree will only ever hold weak references to it.
    pub fn leaf(
        name: impl Into<String>,
        item: Arc<dyn ProtocolItem>,
        consumer: Arc<dyn RecordConsumer>,
    ) -> Arc<Element> {
        let queue = UpdateQueue::new(consumer.link_config().queue_config());
        Arc::new(Element {
            name: name.into(),
            item,
            parent: RwLock::new(None),
            incoming: RwLock::new(None),
            outgoing: Mutex::new(OutgoingSlot::default()),
            kind: ElementKind::Leaf(LeafState {
                consumer,
                queue: Mutex::new(queue),
            }),
        })
    }

    /// Creates a vertex element holding one initial child.
    ///
    /// The child keeps the strong upward link; the vertex records only a
    /// weak downward link. The caller is responsible for setting the
    /// child's parent.
    pub fn vertex(
        name: impl Into<String>,
        item: Arc<dyn ProtocolItem>,
        child: &Arc<Element>,
    ) -> Arc<Element> {
        Arc::new(Element {
            name: name.into(),
            item,
            parent: RwLock::new(None),
            incoming: RwLock::new(None),
            outgoing: Mutex::new(OutgoingSlot::default()),
            kind: ElementKind::Vertex(VertexState {
                children: RwLock::new(vec![Arc::downgrade(child)]),
                field_map: Mutex::new(FieldMap::Unmapped),
            }),
        })
    }

    /// Returns the element name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element name, with an empty root name normalized to
    /// the root marker for display.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            ROOT_NAME
        } else {
            &self.name
        }
    }

    /// Returns `true` if this element is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ElementKind::Leaf(_))
    }

    /// Returns `true` if this element is a vertex.
    #[inline]
    pub fn is_vertex(&self) -> bool {
        matches!(self.kind, ElementKind::Vertex(_))
    }

    /// Returns the parent element, if any.
    pub fn parent(&self) -> Option<Arc<Element>> {
        self.parent.read().clone()
    }

    /// Sets the parent element (the strong upward link).
    pub fn set_parent(&self, parent: &Arc<Element>) {
        *self.parent.write() = Some(Arc::clone(parent));
    }

    /// Adds a child link to this element.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::LeafConflict`] when called on a leaf.
    pub fn add_child(&self, child: &Arc<Element>) -> Result<(), TreeError> {
        match &self.kind {
            ElementKind::Leaf(_) => Err(TreeError::leaf_conflict(&self.name)),
            ElementKind::Vertex(vertex) => {
                vertex.children.write().push(Arc::downgrade(child));
                Ok(())
            }
        }
    }

    /// Finds the direct child with the given name.
    ///
    /// Returns `None` on a leaf, on a missing name, and for children
    /// that have been dropped by their owners.
    pub fn find_child(&self, name: &str) -> Option<Arc<Element>> {
        match &self.kind {
            ElementKind::Leaf(_) => None,
            ElementKind::Vertex(vertex) => vertex
                .children
                .read()
                .iter()
                .filter_map(Weak::upgrade)
                .find(|child| child.name == name),
        }
    }

    /// Returns the number of live children.
    pub fn child_count(&self) -> usize {
        match &self.kind {
            ElementKind::Leaf(_) => 0,
            ElementKind::Vertex(vertex) => vertex
                .children
                .read()
                .iter()
                .filter(|child| child.strong_count() > 0)
                .count(),
        }
    }

    /// Returns a clone of the latest incoming value, if any.
    pub fn incoming_data(&self) -> Option<Value> {
        self.incoming.read().clone()
    }

    /// Returns `true` if the outgoing value is flagged dirty.
    pub fn is_dirty(&self) -> bool {
        self.outgoing.lock().dirty
    }

    /// Pushes an incoming event with data down the tree.
    ///
    /// Called from the protocol worker thread when new data arrives for
    /// this element. A leaf queues an update record and wakes its
    /// consumer on the empty-to-non-empty transition; a vertex
    /// decomposes a structured value onto its mapped children.
    pub fn set_incoming_value(&self, reason: ProcessReason, value: Value) {
        match &self.kind {
            ElementKind::Leaf(leaf) => self.leaf_incoming_value(leaf, reason, value),
            ElementKind::Vertex(vertex) => self.vertex_incoming_value(vertex, reason, value),
        }
    }

    /// Pushes an incoming event without data down the tree.
    ///
    /// Called from the protocol worker thread for events that carry no
    /// value (failed read/write, connection loss). A vertex forwards the
    /// event to all children.
    pub fn set_incoming_event(&self, reason: ProcessReason) {
        match &self.kind {
            ElementKind::Leaf(leaf) => self.leaf_incoming_event(leaf, reason),
            ElementKind::Vertex(vertex) => self.vertex_incoming_event(vertex, reason),
        }
    }

    /// Returns the outgoing data value of this element.
    ///
    /// Called from the protocol worker when data is being assembled for
    /// sending. A leaf returns its outgoing cache; a vertex reassembles
    /// its structure from dirty children first.
    pub fn outgoing_data(&self) -> Option<Value> {
        match &self.kind {
            ElementKind::Leaf(_) => self.outgoing.lock().value.clone(),
            ElementKind::Vertex(vertex) => self.vertex_outgoing_data(vertex).0,
        }
    }

    /// Clears (discards) the current outgoing data.
    ///
    /// Called by the protocol layer after it is done accessing the value
    /// in the context of sending.
    pub fn clear_outgoing(&self) {
        let mut outgoing = self.outgoing.lock();
        outgoing.value = None;
        outgoing.dirty = false;
    }

    /// Writes a consumer-produced value into the outgoing cache.
    ///
    /// The value is coerced to the wire type of the latest incoming
    /// value (range-checked) before being cached and flagged dirty.
    ///
    /// # Errors
    ///
    /// [`ValueError::NoIncomingType`] when no incoming value has been
    /// seen yet; coercion errors when the value does not fit the wire
    /// type. On error the dirty flag is left untouched.
    pub fn write_value(&self, value: Value) -> Result<(), ValueError> {
        let target = self
            .incoming
            .read()
            .as_ref()
            .map(Value::kind)
            .ok_or(ValueError::NoIncomingType)?;
        let coerced = value.coerce_to(target)?;

        let mut outgoing = self.outgoing.lock();
        outgoing.value = Some(coerced);
        outgoing.dirty = true;
        Ok(())
    }

    /// Creates processing requests for the record(s) attached to this
    /// element.
    pub fn request_processing(&self, reason: ProcessReason) {
        match &self.kind {
            ElementKind::Leaf(leaf) => leaf.consumer.request_processing(reason),
            ElementKind::Vertex(vertex) => self.vertex_request_processing(vertex, reason),
        }
    }

    /// Renders this element and its descendants as an indented listing.
    pub fn show(&self, indent: usize) -> String {
        let mut out = String::new();
        self.show_into(indent, &mut out);
        out
    }

    pub(crate) fn show_into(&self, indent: usize, out: &mut String) {
        let ind = "  ".repeat(indent);
        match &self.kind {
            ElementKind::Leaf(leaf) => {
                let queue = leaf.queue.lock();
                out.push_str(&format!(
                    "{}leaf={} record={} queue={}/{}\n",
                    ind,
                    self.display_name(),
                    leaf.consumer.name(),
                    queue.len(),
                    queue.capacity(),
                ));
            }
            ElementKind::Vertex(vertex) => {
                out.push_str(&format!(
                    "{}node={} children={} mapped={}\n",
                    ind,
                    self.display_name(),
                    self.child_count(),
                    if vertex.field_map.lock().is_mapped() { "y" } else { "n" },
                ));
                for child in vertex.children.read().iter().filter_map(Weak::upgrade) {
                    child.show_into(indent + 1, out);
                }
            }
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name)
            .field("kind", match &self.kind {
                ElementKind::Leaf(_) => &"leaf",
                ElementKind::Vertex(_) => &"vertex",
            })
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
