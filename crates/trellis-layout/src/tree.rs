//! The result of a layout pass.

use glam::DVec2;
use std::collections::HashMap;
use trellis_core::{Node, NodeId, Rect};

/// A snapshot of a component tree with a computed rect on every node.
///
/// The tree is an owned copy of the input; later edits to the input do not
/// reach it.
#[derive(Debug, Clone)]
pub struct LaidOutTree {
    root: Node,
    index: HashMap<NodeId, Rect>,
}

impl LaidOutTree {
    pub(crate) fn new(root: Node) -> Self {
        let index = root
            .iter()
            .filter_map(|n| n.computed_rect().map(|r| (n.id(), r)))
            .collect();
        Self { root, index }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Take ownership of the laid-out component tree.
    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.index.get(&id).copied()
    }

    /// Top-left corner of a node.
    pub fn position(&self, id: NodeId) -> Option<DVec2> {
        self.rect(id).map(|r| DVec2::new(r.x, r.y))
    }

    pub fn size(&self, id: NodeId) -> Option<DVec2> {
        self.rect(id).map(|r| DVec2::new(r.width, r.height))
    }

    /// Pre-order traversal of `(id, rect)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Rect)> + '_ {
        self.root.iter().filter_map(|n| n.computed_rect().map(|r| (n.id(), r)))
    }

    /// Find the topmost node at a point. Later siblings paint over earlier
    /// ones, so they are tested first.
    pub fn hit_test(&self, point: DVec2) -> Option<NodeId> {
        let contains = |node: &Node| node.computed_rect().is_some_and(|r| r.contains(point.x, point.y));
        if !contains(&self.root) {
            return None;
        }
        let mut node = &self.root;
        while let Some(child) = node.children().iter().rev().find(|child| contains(*child)) {
            node = child;
        }
        Some(node.id())
    }

    /// Bounds of all content, which may exceed the root on overflow.
    pub fn content_bounds(&self) -> Rect {
        self.iter()
            .map(|(_, r)| r)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default()
    }
}
