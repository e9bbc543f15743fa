// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node dirty flags.
//!
//! Each node carries a small [`DirtyFlags`] set describing which cached,
//! derived state no longer matches its inputs.
//!
//! # Propagation semantics
//!
//! - [`TRANSFORM`](DirtyFlags::TRANSFORM) is set on the node whose geometry
//!   changed and is pushed *down* lazily: when
//!   [`SceneTree::update_transform`](crate::node::SceneTree::update_transform)
//!   cleans a node it marks every direct child dirty, whether or not the
//!   matrices numerically changed. Nothing is ever pulled up from children.
//!
//! - [`SORT`](DirtyFlags::SORT) is set on a *parent* when a child is attached
//!   or a child's z-order changes. The child list is re-sorted (stably) the
//!   next time it is traversed.
//!
//! Opacity has no flag: display opacity is recomputed eagerly for the whole
//! subtree when it changes, since alpha is needed before the lazy transform
//! pass runs.
//!
//! Setters compare against the current value first; writing a value that is
//! already stored never sets a flag.

use bitflags::bitflags;

bitflags! {
    /// Set of dirty channels for a single node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// Local geometry or ancestry changed; matrices must be recomputed.
        const TRANSFORM = 1 << 0;
        /// The child list must be re-sorted by z-order.
        const SORT = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean() {
        assert!(DirtyFlags::default().is_empty());
    }

    #[test]
    fn channels_are_independent() {
        let mut flags = DirtyFlags::TRANSFORM | DirtyFlags::SORT;
        flags.remove(DirtyFlags::SORT);
        assert!(flags.contains(DirtyFlags::TRANSFORM));
        assert!(!flags.contains(DirtyFlags::SORT));
    }
}
