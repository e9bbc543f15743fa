// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame transform pass and draw-list construction.
//!
//! [`SceneTree::evaluate`] walks one subtree in visiting order and:
//!
//! 1. Re-sorts every child list marked [`SORT`](crate::dirty::DirtyFlags::SORT).
//! 2. Recomputes the matrices of every node whose
//!    [`TRANSFORM`](crate::dirty::DirtyFlags::TRANSFORM) flag is set, parents
//!    before children, so that dirtiness pushed down by a recomputed parent
//!    is consumed in the same pass.
//! 3. Collects the draw list: effectively visible nodes in draw order. A
//!    hidden node hides its whole subtree, but the subtree's transforms are
//!    still brought up to date.
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles so that renderers can index directly into the tree via the
//! `*_at()` accessors (e.g. [`matrix_final_at`](SceneTree::matrix_final_at))
//! without paying for generation checks on every access.
//!
//! [`NodeId`]: super::NodeId

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::{FrameId, INVALID, NodeId};
use super::tree::SceneTree;

/// The result of a single [`SceneTree::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose matrices were recomputed, parents first.
    pub transforms: Vec<u32>,
    /// Nodes whose child list was re-sorted.
    pub resorted: Vec<u32>,
    /// Effectively visible nodes in draw order.
    pub draw_order: Vec<u32>,
}

impl FrameChanges {
    /// Clears all lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.resorted.clear();
        self.draw_order.clear();
    }
}

impl SceneTree {
    /// Brings the subtree under `root` up to date and returns what changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn evaluate(&mut self, root: NodeId) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(root, &mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, root: NodeId, changes: &mut FrameChanges) {
        self.validate(root);
        changes.clear();
        self.evaluate_at(root.idx, true, changes);
    }

    fn evaluate_at(&mut self, idx: u32, parent_visible: bool, changes: &mut FrameChanges) {
        if self.sort_children_at(idx) {
            changes.resorted.push(idx);
        }
        if self.update_transform_at(idx) {
            changes.transforms.push(idx);
        }
        let visible = parent_visible && self.visible[idx as usize];

        let mut child = self.first_child[idx as usize];
        while child != INVALID && self.z_order[child as usize] < 0 {
            self.evaluate_at(child, visible, changes);
            child = self.next_sibling[child as usize];
        }
        if visible {
            changes.draw_order.push(idx);
        }
        while child != INVALID {
            self.evaluate_at(child, visible, changes);
            child = self.next_sibling[child as usize];
        }
    }

    // -- Unchecked accessors for renderers --

    /// Returns the cached post-pivot matrix by raw slot index.
    #[must_use]
    pub fn matrix_final_at(&self, idx: u32) -> Affine {
        self.matrix_final[idx as usize]
    }

    /// Returns the display opacity by raw slot index.
    #[must_use]
    pub fn display_opacity_at(&self, idx: u32) -> f64 {
        self.display_opacity[idx as usize]
    }

    /// Returns the image frame by raw slot index.
    #[must_use]
    pub fn frame_at(&self, idx: u32) -> Option<FrameId> {
        self.frame[idx as usize]
    }
}
