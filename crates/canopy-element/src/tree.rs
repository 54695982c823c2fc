// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tree of data elements representing structured protocol data.
//!
//! # Principle of operation
//!
//! An element can be a structural vertex, having child elements, or a
//! leaf, bound to a record consumer. Each element has a single parent
//! (the root element has none).
//!
//! In the simple case (scalar data) the root element *is* the unnamed
//! leaf. In the structure case there is always a root vertex named
//! `[ROOT]`, so that all leaves with simple names are children of that
//! root.
//!
//! Ownership is inverted: each element holds a strong reference to its
//! parent, each vertex holds only weak references to its children. Any
//! leaf can freely be added or dropped and all intermediate vertices are
//! properly created, kept alive by their descendants, and released.
//!
//! The tree monotonically grows; there is no removal operation.
//! Consumer-side teardown happens by dropping leaf handles, which lets
//! the now-unreferenced vertex chain above them go with them.

use std::sync::{Arc, Weak};

use tracing::debug;

use canopy_core::error::TreeError;
use canopy_core::item::ProtocolItem;
use parking_lot::RwLock;

use crate::element::Element;
use crate::path::{split_first_name, split_last_name};

/// Name of the synthesized root vertex in the structure case.
pub const TREE_ROOT_NAME: &str = "[ROOT]";

// =============================================================================
// Element Tree
// =============================================================================

/// A tree of data elements for one protocol item.
pub struct ElementTree {
    /// The protocol item this tree belongs to.
    item: Arc<dyn ProtocolItem>,

    /// Weak reference to the root element; liveness comes from the
    /// leaves' strong parent chains.
    root: RwLock<Weak<Element>>,
}

impl ElementTree {
    /// Creates an empty tree for the given protocol item.
    pub fn new(item: Arc<dyn ProtocolItem>) -> Self {
        Self {
            item,
            root: RwLock::new(Weak::new()),
        }
    }

    /// Returns the root element, if the tree has one.
    pub fn root(&self) -> Option<Arc<Element>> {
        self.root.read().upgrade()
    }

    /// Returns `true` if the tree has a live root element.
    pub fn has_root(&self) -> bool {
        self.root.read().strong_count() > 0
    }

    /// Finds the existing part of an element path.
    ///
    /// Starting at the root, consumes leading path components in place as
    /// long as a same-named child exists; stops at the first miss or when
    /// the path is exhausted.
    ///
    /// Returns the deepest existing element, or `None` when the tree has
    /// no root or the path is empty.
    pub fn nearest_node(&self, path: &mut String) -> Option<Arc<Element>> {
        if path.is_empty() {
            return None;
        }

        // Starting from the unnamed root element
        let mut elem = self.root();

        // Walk down the chain of children as long as names match
        loop {
            let current = match &elem {
                Some(current) => current,
                None => break,
            };
            let mut probe = path.clone();
            let name = split_first_name(&mut probe);
            match current.find_child(&name) {
                Some(next) => {
                    elem = Some(next);
                    *path = probe;
                }
                None => break,
            }
            if path.is_empty() {
                break;
            }
        }

        elem
    }

    /// Adds a new leaf element to the tree.
    ///
    /// Finds the nearest existing node for `full_path`, then creates the
    /// missing chain of vertices bottom-up and links it in. With an
    /// empty path the leaf becomes the root outright (scalar case); with
    /// no existing tree a root vertex named `[ROOT]` is synthesized to
    /// host the chain.
    ///
    /// The caller keeps ownership of the leaf; the tree records only the
    /// weak downward links, while the leaf's strong parent chain keeps
    /// the created vertices alive.
    ///
    /// # Errors
    ///
    /// - [`TreeError::LeafConflict`] when the nearest existing node is a
    ///   leaf (cannot attach below a leaf).
    /// - [`TreeError::RootConflict`] when the path denotes the root but a
    ///   root element already exists.
    pub fn add_leaf(&self, leaf: Arc<Element>, full_path: &str) -> Result<(), TreeError> {
        let mut path = full_path.to_string();

        let branch = self.nearest_node(&mut path);
        if let Some(branch) = &branch {
            if branch.is_leaf() {
                return Err(TreeError::leaf_conflict(branch.name()));
            }
        }

        if path.is_empty() {
            if self.has_root() {
                return Err(TreeError::RootConflict);
            }
            debug!(record = leaf.display_name(), "installed leaf as tree root");
            *self.root.write() = Arc::downgrade(&leaf);
            return Ok(());
        }

        // Remove the leaf's own name, then create the remaining chain of
        // vertices bottom-up.
        let _leaf_name = split_last_name(&mut path);
        let mut elem = leaf;
        while !path.is_empty() {
            let name = split_last_name(&mut path);
            let node = Element::vertex(name, Arc::clone(&self.item), &elem);
            elem.set_parent(&node);
            elem = node;
        }

        match branch {
            Some(branch) => {
                branch.add_child(&elem)?;
                elem.set_parent(&branch);
                debug!(
                    parent = branch.display_name(),
                    child = elem.display_name(),
                    "attached element chain to existing node"
                );
            }
            None => {
                let node = Element::vertex(TREE_ROOT_NAME, Arc::clone(&self.item), &elem);
                elem.set_parent(&node);
                *self.root.write() = Arc::downgrade(&node);
                debug!(child = elem.display_name(), "synthesized tree root vertex");
            }
        }
        Ok(())
    }

    /// Renders the tree as an indented listing of its elements.
    pub fn dump(&self) -> String {
        match self.root() {
            Some(root) => root.show(0),
            None => String::from("<empty tree>\n"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::types::{ConnectionState, ProcessReason, Value};
    use crate::testing::{item, leaf_with_consumer};

    #[test]
    fn test_scalar_case_leaf_becomes_root() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (leaf, _consumer) = leaf_with_consumer("", item);

        tree.add_leaf(Arc::clone(&leaf), "").unwrap();

        assert!(tree.has_root());
        let root = tree.root().unwrap();
        assert!(root.is_leaf());
        assert!(Arc::ptr_eq(&root, &leaf));
    }

    #[test]
    fn test_second_root_fails() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (first, _c1) = leaf_with_consumer("", item.clone());
        let (second, _c2) = leaf_with_consumer("", item);

        tree.add_leaf(Arc::clone(&first), "").unwrap();
        assert_eq!(tree.add_leaf(second, ""), Err(TreeError::RootConflict));
    }

    #[test]
    fn test_sibling_paths_share_vertex() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (b, _cb) = leaf_with_consumer("b", item.clone());
        let (c, _cc) = leaf_with_consumer("c", item.clone());

        tree.add_leaf(Arc::clone(&b), "a.b").unwrap();
        tree.add_leaf(Arc::clone(&c), "a.c").unwrap();

        let root = tree.root().unwrap();
        assert_eq!(root.name(), TREE_ROOT_NAME);
        assert_eq!(root.child_count(), 1);

        let a = root.find_child("a").unwrap();
        assert!(a.is_vertex());
        assert_eq!(a.child_count(), 2);
        assert!(Arc::ptr_eq(&a.find_child("b").unwrap(), &b));
        assert!(Arc::ptr_eq(&a.find_child("c").unwrap(), &c));

        // The shared vertex is the parent of both leaves.
        assert!(Arc::ptr_eq(&b.parent().unwrap(), &a));
        assert!(Arc::ptr_eq(&c.parent().unwrap(), &a));
    }

    #[test]
    fn test_empty_path_after_leaves_is_root_conflict() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (b, _cb) = leaf_with_consumer("b", item.clone());
        let (late, _cl) = leaf_with_consumer("", item);

        tree.add_leaf(Arc::clone(&b), "a.b").unwrap();
        assert_eq!(tree.add_leaf(late, ""), Err(TreeError::RootConflict));
    }

    #[test]
    fn test_adding_below_leaf_fails() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (b, _cb) = leaf_with_consumer("b", item.clone());
        let (deeper, _cd) = leaf_with_consumer("x", item);

        tree.add_leaf(Arc::clone(&b), "a.b").unwrap();
        let err = tree.add_leaf(deeper, "a.b.x").unwrap_err();
        assert_eq!(err, TreeError::leaf_conflict("b"));
    }

    #[test]
    fn test_nearest_node_consumes_matched_prefix() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (c, _cc) = leaf_with_consumer("c", item);
        tree.add_leaf(Arc::clone(&c), "a.b.c").unwrap();

        let mut path = String::from("a.b.zzz");
        let node = tree.nearest_node(&mut path).unwrap();
        assert_eq!(node.name(), "b");
        assert_eq!(path, "zzz");

        let mut path = String::from("nomatch.x");
        let node = tree.nearest_node(&mut path).unwrap();
        assert_eq!(node.name(), TREE_ROOT_NAME);
        assert_eq!(path, "nomatch.x");
    }

    #[test]
    fn test_nearest_node_on_empty_tree() {
        let item = item();
        let tree = ElementTree::new(item);
        let mut path = String::from("a.b");
        assert!(tree.nearest_node(&mut path).is_none());
        assert_eq!(path, "a.b");
    }

    #[test]
    fn test_escaped_separator_in_leaf_name() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        let (leaf, _c) = leaf_with_consumer("b.c", item);

        tree.add_leaf(Arc::clone(&leaf), "a.b\\.c").unwrap();

        let a = tree.root().unwrap().find_child("a").unwrap();
        assert!(Arc::ptr_eq(&a.find_child("b.c").unwrap(), &leaf));
    }

    #[test]
    fn test_vertices_dropped_with_their_leaf() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        {
            let (leaf, _c) = leaf_with_consumer("b", item.clone());
            tree.add_leaf(Arc::clone(&leaf), "a.b").unwrap();
            assert!(tree.has_root());
        }
        // The only leaf is gone; the vertex chain above it has no owner
        // left and the tree is empty again.
        assert!(!tree.has_root());
    }

    #[test]
    fn test_end_to_end_fan_out_through_tree() {
        let item = item();
        item.set_state(ConnectionState::Up);
        let tree = ElementTree::new(item.clone());
        let (speed, speed_consumer) = leaf_with_consumer("speed", item.clone());
        let (state, state_consumer) = leaf_with_consumer("state", item.clone());
        tree.add_leaf(Arc::clone(&speed), "motor.speed").unwrap();
        tree.add_leaf(Arc::clone(&state), "motor.state").unwrap();

        let motor = tree.root().unwrap().find_child("motor").unwrap();
        motor.set_incoming_value(
            ProcessReason::ValueChanged,
            Value::Struct(vec![
                ("speed".into(), Value::Float64(2.5)),
                ("state".into(), Value::Bool(true)),
            ]),
        );

        assert_eq!(speed.incoming_data(), Some(Value::Float64(2.5)));
        assert_eq!(state.incoming_data(), Some(Value::Bool(true)));
        assert_eq!(speed_consumer.processing_requests(), 1);
        assert_eq!(state_consumer.processing_requests(), 1);
    }

    #[test]
    fn test_dump_lists_all_elements() {
        let item = item();
        let tree = ElementTree::new(item.clone());
        assert_eq!(tree.dump(), "<empty tree>\n");

        let (b, _cb) = leaf_with_consumer("b", item.clone());
        let (c, _cc) = leaf_with_consumer("c", item);
        tree.add_leaf(Arc::clone(&b), "a.b").unwrap();
        tree.add_leaf(Arc::clone(&c), "a.c").unwrap();

        let dump = tree.dump();
        assert!(dump.contains("node=[ROOT]"));
        assert!(dump.contains("node=a children=2"));
        assert!(dump.contains("leaf=b"));
        assert!(dump.contains("leaf=c"));
    }
}
