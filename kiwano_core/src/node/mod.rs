// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene tree data model.
//!
//! A *node* is an element of the scene graph. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed, so use-after-destroy is caught at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree, plus a back-reference to the scene root it lives under.
//! - **Local properties** set by the caller or by running actions:
//!   [`transform`](SceneTree::set_transform), [`z_order`](SceneTree::set_z_order),
//!   [`opacity`](SceneTree::set_opacity), [`visible`](SceneTree::set_visible),
//!   [`name`](SceneTree::set_name), and [`frame`](SceneTree::set_frame).
//! - **Computed properties**: `matrix_initial` / `matrix_final`, refreshed
//!   lazily by [`update_transform`](SceneTree::update_transform) or
//!   [`evaluate`](SceneTree::evaluate), and `display_opacity`, refreshed
//!   eagerly whenever opacity or ancestry changes.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//! Ownership is the tree's alone: parents never free children implicitly,
//! and [`SceneTree::destroy`] releases a whole subtree at once.
//!
//! See [`dirty`](crate::dirty) for how invalidation flows.

mod evaluate;
mod hit;
mod id;
mod traverse;
mod tree;

pub use evaluate::FrameChanges;
pub use id::{FrameId, INVALID, NodeId};
pub use traverse::Children;
pub use tree::{SceneTree, UpdateHook};
