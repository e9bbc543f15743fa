// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.
//!
//! Children are kept sorted by z-order, ascending and stable. A parent's own
//! visit sits between its negative-z children ("background") and its
//! non-negative ones ("foreground"), for both update and draw.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::tree::SceneTree;
use crate::dirty::DirtyFlags;

/// An iterator over the direct children of a node.
///
/// Created by [`SceneTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a SceneTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a SceneTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.handle(idx))
    }
}

impl SceneTree {
    /// Returns whether the node's child list is waiting to be re-sorted.
    #[must_use]
    pub fn needs_sort(&self, id: NodeId) -> bool {
        self.dirty_flags(id).contains(DirtyFlags::SORT)
    }

    /// Re-sorts the node's child list by z-order if it is marked.
    ///
    /// The sort is stable: siblings with equal z-order keep their current
    /// relative order. Returns whether a sort happened.
    pub fn sort_children(&mut self, id: NodeId) -> bool {
        self.validate(id);
        self.sort_children_at(id.idx)
    }

    pub(crate) fn sort_children_at(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if !self.dirty[i].contains(DirtyFlags::SORT) {
            return false;
        }
        self.dirty[i].remove(DirtyFlags::SORT);

        let mut kids = self.child_indices(idx);
        kids.sort_by_key(|&c| self.z_order[c as usize]);

        // Relink in sorted order.
        let mut prev = INVALID;
        for &c in &kids {
            self.prev_sibling[c as usize] = prev;
            if prev == INVALID {
                self.first_child[i] = c;
            } else {
                self.next_sibling[prev as usize] = c;
            }
            prev = c;
        }
        if prev != INVALID {
            self.next_sibling[prev as usize] = INVALID;
        }
        true
    }

    /// Returns the update/draw visiting order of `root`'s subtree.
    ///
    /// Sorts any marked child lists on the way. Every node is included,
    /// visible or not.
    pub fn visit_order(&mut self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.visit_order_into(root, &mut order);
        order
    }

    /// Like [`visit_order`](Self::visit_order), but reuses a caller-provided
    /// buffer.
    pub fn visit_order_into(&mut self, root: NodeId, order: &mut Vec<NodeId>) {
        self.validate(root);
        order.clear();
        let mut indices = Vec::new();
        self.walk(root.idx, &mut |_, idx| indices.push(idx));
        order.extend(indices.into_iter().map(|idx| self.handle(idx)));
    }

    /// Depth-first walk in visiting order, sorting lazily.
    ///
    /// `visit` is called once per node, after its negative-z children and
    /// before its non-negative-z children.
    pub(crate) fn walk(&mut self, idx: u32, visit: &mut impl FnMut(&mut Self, u32)) {
        self.sort_children_at(idx);

        let mut child = self.first_child[idx as usize];
        while child != INVALID && self.z_order[child as usize] < 0 {
            self.walk(child, visit);
            child = self.next_sibling[child as usize];
        }
        visit(self, idx);
        while child != INVALID {
            self.walk(child, visit);
            child = self.next_sibling[child as usize];
        }
    }
}
