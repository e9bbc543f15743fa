// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Size, Vec2};

use super::id::{FrameId, INVALID, NodeId};
use super::traverse::Children;
use crate::dirty::DirtyFlags;
use crate::error::TreeError;
use crate::transform::{Transform, clamp_pivot};

/// Per-node callback run once per tick, in traversal order.
///
/// Receives the tree, the node the hook is installed on, and the scaled
/// frame delta in seconds.
pub type UpdateHook = Rc<dyn Fn(&mut SceneTree, NodeId, f64)>;

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Edges point downward (first child, siblings) and upward (parent, scene
/// root) as plain indices; only the tree itself decides when a slot dies.
pub struct SceneTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) scene: Vec<u32>,
    pub(crate) scene_root: Vec<bool>,

    // -- Local properties (set by callers) --
    pub(crate) transform: Vec<Transform>,
    pub(crate) z_order: Vec<i32>,
    pub(crate) visible: Vec<bool>,
    pub(crate) opacity: Vec<f64>,
    pub(crate) name: Vec<Option<String>>,
    pub(crate) frame: Vec<Option<FrameId>>,
    pub(crate) hook: Vec<Option<UpdateHook>>,

    // -- Computed properties --
    pub(crate) display_opacity: Vec<f64>,
    pub(crate) matrix_initial: Vec<Affine>,
    pub(crate) matrix_final: Vec<Affine>,
    pub(crate) dirty: Vec<DirtyFlags>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl core::fmt::Debug for SceneTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneTree")
            .field("len", &self.len)
            .field("live", &self.node_count())
            .field("parent", &self.parent)
            .field("z_order", &self.z_order)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            scene: Vec::new(),
            scene_root: Vec::new(),
            transform: Vec::new(),
            z_order: Vec::new(),
            visible: Vec::new(),
            opacity: Vec::new(),
            name: Vec::new(),
            frame: Vec::new(),
            hook: Vec::new(),
            display_opacity: Vec::new(),
            matrix_initial: Vec::new(),
            matrix_final: Vec::new(),
            dirty: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts with an identity transform, full opacity, z-order 0,
    /// visible, no name, no frame, and a dirty transform.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. The generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.scene[i] = INVALID;
            self.scene_root[i] = false;
            self.transform[i] = Transform::IDENTITY;
            self.z_order[i] = 0;
            self.visible[i] = true;
            self.opacity[i] = 1.0;
            self.name[i] = None;
            self.frame[i] = None;
            self.hook[i] = None;
            self.display_opacity[i] = 1.0;
            self.matrix_initial[i] = Affine::IDENTITY;
            self.matrix_final[i] = Affine::IDENTITY;
            self.dirty[i] = DirtyFlags::TRANSFORM;
            self.alive[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.scene.push(INVALID);
            self.scene_root.push(false);
            self.transform.push(Transform::IDENTITY);
            self.z_order.push(0);
            self.visible.push(true);
            self.opacity.push(1.0);
            self.name.push(None);
            self.frame.push(None);
            self.hook.push(None);
            self.display_opacity.push(1.0);
            self.matrix_initial.push(Affine::IDENTITY);
            self.matrix_final.push(Affine::IDENTITY);
            self.dirty.push(DirtyFlags::TRANSFORM);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a node that acts as the scene root for everything attached
    /// below it.
    pub fn create_scene_root(&mut self) -> NodeId {
        let id = self.create_node();
        self.scene_root[id.idx as usize] = true;
        self.scene[id.idx as usize] = id.idx;
        id
    }

    /// Destroys a node and its entire subtree, freeing their slots for reuse.
    ///
    /// The node is detached from its parent first. Returns the number of
    /// nodes destroyed. Callers that schedule work against nodes must purge
    /// it before calling this (see [`Scene::destroy_node`]).
    ///
    /// [`Scene::destroy_node`]: crate::scene::Scene::destroy_node
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: NodeId) -> usize {
        self.validate(id);
        if self.parent[id.idx as usize] != INVALID {
            self.unlink_from_parent(id.idx);
        }

        let doomed = self.subtree_indices(id.idx);
        for &idx in &doomed {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.name[i] = None;
            self.hook[i] = None;
            self.alive[i] = false;
            // Bump generation so old handles immediately fail validation.
            self.generation[i] = self.generation[i].wrapping_add(1);
            self.free_list.push(idx);
        }
        doomed.len()
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`, keeping the child's
    /// current z-order.
    ///
    /// See [`add_child_with_z`](Self::add_child_with_z).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AlreadyParented`] if `child` has a parent, or
    /// [`TreeError::Cycle`] if `child` is `parent` or one of its ancestors.
    /// Neither node is modified on error.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.attach(parent, child, None)
    }

    /// Adds `child` as the last child of `parent` with the given z-order.
    ///
    /// On success the child's scene back-reference and display opacity are
    /// recomputed for its whole subtree, its transform is marked dirty, and
    /// the parent's child list is marked for re-sorting.
    ///
    /// # Errors
    ///
    /// Same as [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child_with_z(
        &mut self,
        parent: NodeId,
        child: NodeId,
        z_order: i32,
    ) -> Result<(), TreeError> {
        self.attach(parent, child, Some(z_order))
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, z_order: Option<i32>) -> Result<(), TreeError> {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;

        let current = self.parent[c as usize];
        if current != INVALID {
            return Err(TreeError::AlreadyParented {
                child,
                parent: self.handle(current),
            });
        }
        let mut cursor = p;
        while cursor != INVALID {
            if cursor == c {
                return Err(TreeError::Cycle { parent, child });
            }
            cursor = self.parent[cursor as usize];
        }

        if let Some(z) = z_order {
            self.z_order[c as usize] = z;
        }
        self.link_last(p, c);
        self.set_scene_subtree(c, self.scene[p as usize]);
        self.refresh_display_opacity(c);
        self.dirty[c as usize].insert(DirtyFlags::TRANSFORM);
        self.dirty[p as usize].insert(DirtyFlags::SORT);
        Ok(())
    }

    /// Detaches `child` from `parent`.
    ///
    /// Returns `false` (and does nothing) if `child` is not a direct child
    /// of `parent`. The detached node stays alive as a root.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return false;
        }
        self.detach(child.idx);
        true
    }

    /// Detaches a node from whatever parent it has.
    ///
    /// Returns `false` if the node had no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) -> bool {
        self.validate(child);
        if self.parent[child.idx as usize] == INVALID {
            return false;
        }
        self.detach(child.idx);
        true
    }

    /// Detaches every direct child of `parent` whose name equals `name`.
    ///
    /// Returns whether at least one child matched.
    pub fn remove_children_named(&mut self, parent: NodeId, name: &str) -> bool {
        self.validate(parent);
        let matching: Vec<u32> = self
            .child_indices(parent.idx)
            .into_iter()
            .filter(|&c| self.name[c as usize].as_deref() == Some(name))
            .collect();
        for &c in &matching {
            self.detach(c);
        }
        !matching.is_empty()
    }

    /// Detaches every direct child of `parent`.
    ///
    /// Returns whether there were any children.
    pub fn remove_all_children(&mut self, parent: NodeId) -> bool {
        self.validate(parent);
        let children = self.child_indices(parent.idx);
        for &c in &children {
            self.detach(c);
        }
        !children.is_empty()
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns the scene root this node is attached under, if any.
    #[must_use]
    pub fn scene_of(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let s = self.scene[id.idx as usize];
        (s != INVALID).then(|| self.handle(s))
    }

    /// Returns an iterator over the direct children of a node, in their
    /// current list order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the first direct child with the given name.
    #[must_use]
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|c| self.name[c.idx as usize].as_deref() == Some(name))
    }

    /// Returns every live node without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| self.handle(idx))
            .collect()
    }

    /// Returns `id` and all of its descendants in depth-first pre-order.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        self.subtree_indices(id.idx)
            .into_iter()
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local transform of a node.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> &Transform {
        self.validate(id);
        &self.transform[id.idx as usize]
    }

    /// Returns the position of a node's pivot in its parent's space.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.transform(id).position
    }

    /// Returns the scale of a node.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> Vec2 {
        self.transform(id).scale
    }

    /// Returns the rotation of a node in degrees.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> f64 {
        self.transform(id).rotation
    }

    /// Returns the skew of a node in degrees.
    #[must_use]
    pub fn skew(&self, id: NodeId) -> Vec2 {
        self.transform(id).skew
    }

    /// Returns the normalized pivot of a node.
    #[must_use]
    pub fn pivot(&self, id: NodeId) -> Point {
        self.transform(id).pivot()
    }

    /// Returns the content size of a node.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Size {
        self.transform(id).size
    }

    /// Returns the z-order of a node.
    #[must_use]
    pub fn z_order(&self, id: NodeId) -> i32 {
        self.validate(id);
        self.z_order[id.idx as usize]
    }

    /// Returns whether the node itself is visible (ancestors not considered).
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns the node's own opacity.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns the node's own opacity multiplied by its parent's display
    /// opacity. Always current; opacity propagates eagerly.
    #[must_use]
    pub fn display_opacity(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.display_opacity[id.idx as usize]
    }

    /// Returns the node's name, if set.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.name[id.idx as usize].as_deref()
    }

    /// Returns the image frame currently shown by the node.
    #[must_use]
    pub fn frame(&self, id: NodeId) -> Option<FrameId> {
        self.validate(id);
        self.frame[id.idx as usize]
    }

    /// Returns the node's update hook, if any.
    #[must_use]
    pub fn update_hook(&self, id: NodeId) -> Option<UpdateHook> {
        self.validate(id);
        self.hook[id.idx as usize].clone()
    }

    /// Returns the cached pre-pivot matrix (what children compose with).
    ///
    /// Only current after [`update_transform`](Self::update_transform) (or
    /// [`evaluate`](Self::evaluate)) has cleaned the node.
    #[must_use]
    pub fn matrix_initial(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.matrix_initial[id.idx as usize]
    }

    /// Returns the cached post-pivot matrix (what content is drawn with).
    ///
    /// Only current after [`update_transform`](Self::update_transform) (or
    /// [`evaluate`](Self::evaluate)) has cleaned the node.
    #[must_use]
    pub fn matrix_final(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.matrix_final[id.idx as usize]
    }

    /// Returns the node's dirty flags.
    #[must_use]
    pub fn dirty_flags(&self, id: NodeId) -> DirtyFlags {
        self.validate(id);
        self.dirty[id.idx as usize]
    }

    /// Returns whether the node's matrices need recomputing.
    #[must_use]
    pub fn is_transform_dirty(&self, id: NodeId) -> bool {
        self.dirty_flags(id).contains(DirtyFlags::TRANSFORM)
    }

    // -- Mutation API (auto-marks dirty when the value changes) --

    /// Sets the position of the node's pivot.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.modify_transform(id, |t| t.position = position);
    }

    /// Sets the scale of a node.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        self.modify_transform(id, |t| t.scale = scale);
    }

    /// Sets the rotation of a node in degrees.
    pub fn set_rotation(&mut self, id: NodeId, degrees: f64) {
        self.modify_transform(id, |t| t.rotation = degrees);
    }

    /// Sets the skew of a node in degrees.
    pub fn set_skew(&mut self, id: NodeId, skew: Vec2) {
        self.modify_transform(id, |t| t.skew = skew);
    }

    /// Sets the normalized pivot of a node, clamped to `[0, 1]`.
    pub fn set_pivot(&mut self, id: NodeId, pivot: Point) {
        let pivot = clamp_pivot(pivot);
        self.modify_transform(id, |t| t.set_pivot(pivot));
    }

    /// Sets the content size of a node.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        self.modify_transform(id, |t| t.size = size);
    }

    /// Replaces the whole local transform of a node.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        self.modify_transform(id, |t| *t = transform);
    }

    /// Sets the z-order of a node and marks its parent's child list for
    /// re-sorting.
    pub fn set_z_order(&mut self, id: NodeId, z_order: i32) {
        self.validate(id);
        let i = id.idx as usize;
        if self.z_order[i] == z_order {
            return;
        }
        self.z_order[i] = z_order;
        let p = self.parent[i];
        if p != INVALID {
            self.dirty[p as usize].insert(DirtyFlags::SORT);
        }
    }

    /// Shows or hides a node and its subtree in the draw list.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.visible[id.idx as usize] = visible;
    }

    /// Sets the node's own opacity, clamped to `[0, 1]`, and recomputes the
    /// display opacity of the whole subtree immediately.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        self.validate(id);
        let opacity = opacity.clamp(0.0, 1.0);
        let i = id.idx as usize;
        if self.opacity[i] == opacity {
            return;
        }
        self.opacity[i] = opacity;
        self.refresh_display_opacity(id.idx);
    }

    /// Sets or clears the node's name.
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) {
        self.validate(id);
        self.name[id.idx as usize] = name;
    }

    /// Sets or clears the image frame shown by the node.
    pub fn set_frame(&mut self, id: NodeId, frame: Option<FrameId>) {
        self.validate(id);
        self.frame[id.idx as usize] = frame;
    }

    /// Installs or removes the node's update hook.
    pub fn set_update_hook(&mut self, id: NodeId, hook: Option<UpdateHook>) {
        self.validate(id);
        self.hook[id.idx as usize] = hook;
    }

    // -- Transform pass --

    /// Recomputes the node's matrices if its transform is dirty.
    ///
    /// `matrix_initial` is the parent's `matrix_initial` composed with the
    /// local [`Transform::to_affine`]; `matrix_final` additionally applies the
    /// pivot offset. After recomputing, every direct child is marked dirty
    /// whether or not the numbers changed. Returns whether anything was
    /// recomputed; a clean node is left untouched.
    ///
    /// The parent's matrices are read as cached, so callers walking a tree
    /// must visit parents first (as [`evaluate`](Self::evaluate) does).
    pub fn update_transform(&mut self, id: NodeId) -> bool {
        self.validate(id);
        self.update_transform_at(id.idx)
    }

    pub(crate) fn update_transform_at(&mut self, idx: u32) -> bool {
        let i = idx as usize;
        if !self.dirty[i].contains(DirtyFlags::TRANSFORM) {
            return false;
        }

        let local = self.transform[i];
        let p = self.parent[i];
        let initial = if p != INVALID {
            self.matrix_initial[p as usize] * local.to_affine()
        } else {
            local.to_affine()
        };
        self.matrix_initial[i] = initial;
        self.matrix_final[i] = initial * Affine::translate(-local.pivot_offset());
        self.dirty[i].remove(DirtyFlags::TRANSFORM);

        let mut child = self.first_child[i];
        while child != INVALID {
            self.dirty[child as usize].insert(DirtyFlags::TRANSFORM);
            child = self.next_sibling[child as usize];
        }
        true
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Applies `edit` to a copy of the transform and stores it only if it
    /// differs, marking the node dirty.
    fn modify_transform(&mut self, id: NodeId, edit: impl FnOnce(&mut Transform)) {
        self.validate(id);
        let i = id.idx as usize;
        let mut next = self.transform[i];
        edit(&mut next);
        if next == self.transform[i] {
            return;
        }
        self.transform[i] = next;
        self.dirty[i].insert(DirtyFlags::TRANSFORM);
    }

    fn detach(&mut self, c: u32) {
        self.unlink_from_parent(c);
        let scene = if self.scene_root[c as usize] { c } else { INVALID };
        self.set_scene_subtree(c, scene);
        self.refresh_display_opacity(c);
        self.dirty[c as usize].insert(DirtyFlags::TRANSFORM);
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    pub(crate) fn child_indices(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            out.push(child);
            child = self.next_sibling[child as usize];
        }
        out
    }

    fn subtree_indices(&self, root: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![root];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            // Push in reverse so the first child is visited first.
            let start = stack.len();
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            stack[start..].reverse();
        }
        out
    }

    fn set_scene_subtree(&mut self, root: u32, scene: u32) {
        for idx in self.subtree_indices(root) {
            // A nested scene root keeps pointing at itself only while detached.
            self.scene[idx as usize] = scene;
        }
    }

    /// Recomputes display opacity for `root` and all of its descendants.
    fn refresh_display_opacity(&mut self, root: u32) {
        for idx in self.subtree_indices(root) {
            let i = idx as usize;
            let p = self.parent[i];
            let inherited = if p != INVALID {
                self.display_opacity[p as usize]
            } else {
                1.0
            };
            self.display_opacity[i] = self.opacity[i] * inherited;
        }
    }
}
