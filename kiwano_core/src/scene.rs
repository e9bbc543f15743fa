// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene context: one tree, its root, and both schedulers.
//!
//! A [`Scene`] is the value the host drives once per frame:
//!
//! ```text
//!   host dt ──► Scene::tick ──► tasks ──► actions ──► update hooks
//!                                                          │
//!   renderer ◄── FrameChanges ◄── Scene::evaluate ◄────────┘
//! ```
//!
//! `tick` must run before any transform is read for the frame, and
//! `evaluate` after all programmatic setters for the frame are done.

use alloc::vec::Vec;

use crate::action::Action;
use crate::error::ActionError;
use crate::node::{FrameChanges, NodeId, SceneTree};
use crate::scheduler::{ActionId, ActionScheduler, TaskId, TaskScheduler};
use crate::task::Task;
use crate::trace::{
    NodesDestroyedEvent, TickBeginEvent, TickEndEvent, Tracer, TransformPassEvent, count,
};

/// Frame-delta handling for a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    /// Multiplier applied to every delta (slow motion below 1).
    pub time_scale: f64,
    /// Upper bound on a single (unscaled) delta, in seconds.
    pub max_delta: Option<f64>,
}

impl SceneConfig {
    /// Clamps a single frame to 100 ms so that a long hitch does not make
    /// every animation jump to its end.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            time_scale: 1.0,
            max_delta: Some(0.1),
        }
    }

    /// Turns a raw host delta into the delta fed to the schedulers.
    ///
    /// Negative and non-finite deltas become zero.
    #[must_use]
    pub fn effective_delta(&self, dt: f64) -> f64 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        let dt = self.max_delta.map_or(dt, |max| dt.min(max.max(0.0)));
        (dt * self.time_scale).max(0.0)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta: None,
        }
    }
}

/// A scene tree plus the schedulers that animate it.
#[derive(Debug)]
pub struct Scene {
    /// The node storage.
    pub tree: SceneTree,
    /// Scheduled actions.
    pub actions: ActionScheduler,
    /// Scheduled tasks.
    pub tasks: TaskScheduler,
    /// Delta handling.
    pub config: SceneConfig,
    root: NodeId,
    frame_index: u64,
    time: f64,
    order: Vec<NodeId>,
    changes: FrameChanges,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Scene {
    /// Creates a scene with a fresh scene-root node.
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        let mut tree = SceneTree::new();
        let root = tree.create_scene_root();
        Self {
            tree,
            actions: ActionScheduler::new(),
            tasks: TaskScheduler::new(),
            config,
            root,
            frame_index: 0,
            time: 0.0,
            order: Vec::new(),
            changes: FrameChanges::default(),
        }
    }

    /// Returns the scene root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns the accumulated scene time in seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the result of the most recent [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn changes(&self) -> &FrameChanges {
        &self.changes
    }

    /// Binds `action` to `node`, starts it, and schedules it.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::AlreadyBound`] if the action is already bound;
    /// it is dropped unscheduled in that case.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub fn run_action(&mut self, node: NodeId, mut action: Action) -> Result<ActionId, ActionError> {
        self.tree.validate(node);
        action.start_with_target(node)?;
        Ok(self.actions.add(action))
    }

    /// Schedules a task.
    pub fn add_task(&mut self, task: Task) -> TaskId {
        self.tasks.add(task)
    }

    /// Pauses every action and task bound to `node`.
    pub fn pause_node(&mut self, node: NodeId) {
        self.actions.pause_all_bound_to(node);
        self.tasks.pause_all_bound_to(node);
    }

    /// Resumes every action and task bound to `node`.
    pub fn resume_node(&mut self, node: NodeId) {
        self.actions.resume_all_bound_to(node);
        self.tasks.resume_all_bound_to(node);
    }

    /// Stops every action and task bound to `node`.
    pub fn stop_node(&mut self, node: NodeId) {
        self.actions.stop_all_bound_to(node);
        self.tasks.stop_all_bound_to(node);
    }

    /// Detaches `child` from `parent` and unschedules every action and task
    /// bound to any node in its subtree.
    ///
    /// Returns `false` (and does nothing) if `child` is not a direct child
    /// of `parent`. The detached subtree stays alive as a root in the tree
    /// until it is re-attached or destroyed.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.tree.parent(child) != Some(parent) {
            self.tree.validate(parent);
            return false;
        }
        self.remove_node(child)
    }

    /// Detaches `node` from its parent and unschedules every action and task
    /// bound to any node in its subtree.
    ///
    /// Returns `false` (and does nothing) if the node has no parent.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if self.tree.parent(node).is_none() {
            return false;
        }
        self.purge_subtree(node);
        self.tree.remove_from_parent(node)
    }

    /// Destroys `node` and its subtree after unscheduling every action and
    /// task bound to any node in it. Returns the number of nodes destroyed.
    ///
    /// Destroying the scene root is allowed; the scene is unusable after
    /// that.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub fn destroy_node(&mut self, node: NodeId) -> usize {
        self.destroy_node_traced(node, &mut Tracer::none())
    }

    /// Like [`destroy_node`](Self::destroy_node), emitting a
    /// [`NodesDestroyedEvent`].
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale.
    pub fn destroy_node_traced(&mut self, node: NodeId, tracer: &mut Tracer<'_>) -> usize {
        let (actions_removed, tasks_removed) = self.purge_subtree(node);
        let nodes = self.tree.destroy(node);
        tracer.nodes_destroyed(&NodesDestroyedEvent {
            frame_index: self.frame_index,
            root_index: node.index(),
            nodes: count(nodes),
            actions_removed: count(actions_removed),
            tasks_removed: count(tasks_removed),
        });
        nodes
    }

    /// Advances the scene by a host delta in seconds.
    pub fn tick(&mut self, dt: f64) {
        self.tick_traced(dt, &mut Tracer::none());
    }

    /// Like [`tick`](Self::tick), emitting trace events.
    ///
    /// Runs tasks, then actions, then node update hooks in visiting order.
    pub fn tick_traced(&mut self, dt: f64, tracer: &mut Tracer<'_>) {
        let dt = self.config.effective_delta(dt);
        let frame_index = self.frame_index;
        tracer.tick_begin(&TickBeginEvent {
            frame_index,
            time: self.time,
            dt,
        });

        let tasks = self.tasks.tick(dt, &mut self.tree, tracer, frame_index);
        let actions = self.actions.tick(dt, &mut self.tree, tracer, frame_index);
        self.run_update_hooks(dt);

        self.time += dt;
        self.frame_index += 1;
        tracer.tick_end(&TickEndEvent {
            frame_index,
            time: self.time,
            actions_active: count(self.actions.len()),
            tasks_active: count(self.tasks.len()),
            actions_finished: count(actions.finished),
            tasks_fired: count(tasks.fired),
        });
    }

    /// Runs the transform pass over the scene and returns what changed.
    pub fn evaluate(&mut self) -> &FrameChanges {
        self.evaluate_traced(&mut Tracer::none())
    }

    /// Like [`evaluate`](Self::evaluate), emitting a [`TransformPassEvent`].
    pub fn evaluate_traced(&mut self, tracer: &mut Tracer<'_>) -> &FrameChanges {
        self.tree.evaluate_into(self.root, &mut self.changes);
        tracer.transform_pass(&TransformPassEvent {
            frame_index: self.frame_index,
            recomputed: count(self.changes.transforms.len()),
            resorted: count(self.changes.resorted.len()),
            drawn: count(self.changes.draw_order.len()),
        });
        &self.changes
    }

    /// Unschedules the work bound to `node`'s subtree. Returns the number of
    /// actions and tasks removed.
    fn purge_subtree(&mut self, node: NodeId) -> (usize, usize) {
        let nodes = self.tree.subtree(node);
        (
            self.actions.remove_all_bound_within(&nodes),
            self.tasks.remove_all_bound_within(&nodes),
        )
    }

    fn run_update_hooks(&mut self, dt: f64) {
        let mut order = core::mem::take(&mut self.order);
        self.tree.visit_order_into(self.root, &mut order);
        for &id in &order {
            // A hook may destroy nodes later in the order.
            if !self.tree.is_alive(id) {
                continue;
            }
            if let Some(hook) = self.tree.update_hook(id) {
                hook(&mut self.tree, id, dt);
            }
        }
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use kurbo::{Point, Vec2};

    use super::*;
    use crate::action::Repeat;

    #[test]
    fn run_action_moves_node() {
        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        scene.tree.add_child(scene.root(), node).unwrap();
        scene
            .run_action(node, Action::move_by(1.0, Vec2::new(100.0, 0.0)))
            .unwrap();

        scene.tick(0.5);
        assert!((scene.tree.position(node).x - 50.0).abs() < 1e-9);
        scene.tick(0.5);
        assert!((scene.tree.position(node).x - 100.0).abs() < 1e-9);
        assert!(scene.actions.is_empty());
        assert_eq!(scene.frame_index(), 2);
        assert!((scene.time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn run_action_rejects_bound_action() {
        let mut scene = Scene::default();
        let a = scene.tree.create_node();
        let b = scene.tree.create_node();
        let mut action = Action::delay(1.0);
        action.start_with_target(a).unwrap();
        assert_eq!(
            scene.run_action(b, action),
            Err(ActionError::AlreadyBound { target: a })
        );
        assert!(scene.actions.is_empty());
    }

    #[test]
    fn destroying_node_purges_exactly_its_actions() {
        let mut scene = Scene::default();
        let doomed = scene.tree.create_node();
        let child = scene.tree.create_node();
        let survivor = scene.tree.create_node();
        scene.tree.add_child(scene.root(), doomed).unwrap();
        scene.tree.add_child(doomed, child).unwrap();
        scene.tree.add_child(scene.root(), survivor).unwrap();

        scene.run_action(doomed, Action::delay(5.0)).unwrap();
        scene
            .run_action(doomed, Action::rotate_by(5.0, 90.0))
            .unwrap();
        scene.run_action(survivor, Action::delay(5.0)).unwrap();
        scene.add_task(Task::new(1.0, |_, _| {}).with_owner(child));
        scene.tick(0.1);
        assert_eq!(scene.actions.len(), 3);

        assert_eq!(scene.destroy_node(doomed), 2);
        assert_eq!(scene.actions.len(), 1);
        assert!(scene.tasks.is_empty());
        assert!(!scene.tree.is_alive(child));

        // Ticking afterwards never touches the freed slots.
        scene.tick(0.1);
        assert_eq!(scene.actions.len(), 1);
    }

    #[test]
    fn removing_node_purges_exactly_its_actions() {
        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        let child = scene.tree.create_node();
        let survivor = scene.tree.create_node();
        scene.tree.add_child(scene.root(), node).unwrap();
        scene.tree.add_child(node, child).unwrap();
        scene.tree.add_child(scene.root(), survivor).unwrap();

        scene
            .run_action(node, Action::move_by(1.0, Vec2::new(10.0, 0.0)))
            .unwrap();
        scene.run_action(node, Action::delay(5.0)).unwrap();
        scene.run_action(survivor, Action::delay(5.0)).unwrap();
        scene.add_task(Task::new(0.1, |_, _| {}).with_owner(child));
        assert_eq!(scene.actions.len(), 3);

        assert!(!scene.remove_child(survivor, node));
        assert_eq!(scene.actions.len(), 3);

        assert!(scene.remove_child(scene.root(), node));
        assert_eq!(scene.actions.len(), 1);
        assert!(scene.tasks.is_empty());
        assert_eq!(scene.tree.parent(node), None);
        assert_eq!(scene.tree.parent(child), Some(node));

        // The detached subtree is alive but no longer animated.
        scene.tick(0.5);
        assert!(scene.tree.is_alive(node));
        assert_eq!(scene.tree.position(node), Point::ORIGIN);
        assert!(!scene.remove_node(node));
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroying_stale_node_panics() {
        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        scene.destroy_node(node);
        scene.destroy_node(node);
    }

    #[test]
    fn config_scales_and_clamps_delta() {
        let config = SceneConfig {
            time_scale: 0.5,
            max_delta: Some(0.1),
        };
        assert!((config.effective_delta(0.05) - 0.025).abs() < 1e-12);
        assert!((config.effective_delta(1.0) - 0.05).abs() < 1e-12);
        assert_eq!(config.effective_delta(-1.0), 0.0);
        assert_eq!(config.effective_delta(f64::NAN), 0.0);
        assert_eq!(SceneConfig::default().effective_delta(3.0), 3.0);
        assert_eq!(SceneConfig::interactive().effective_delta(3.0), 0.1);
    }

    #[test]
    fn update_hooks_run_in_visiting_order() {
        let mut scene = Scene::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let bg = scene.tree.create_node();
        let fg = scene.tree.create_node();
        scene.tree.add_child_with_z(scene.root(), fg, 1).unwrap();
        scene.tree.add_child_with_z(scene.root(), bg, -1).unwrap();
        for (id, tag) in [(scene.root(), "root"), (bg, "bg"), (fg, "fg")] {
            let log = log.clone();
            scene.tree.set_update_hook(
                id,
                Some(Rc::new(move |_: &mut SceneTree, _: NodeId, _: f64| {
                    log.borrow_mut().push(tag);
                })),
            );
        }
        scene.tick(0.016);
        assert_eq!(*log.borrow(), vec!["bg", "root", "fg"]);
    }

    #[test]
    fn tasks_run_before_actions_each_tick() {
        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        scene.tree.add_child(scene.root(), node).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        scene.add_task(
            Task::new(0.0, move |tree, run| {
                if let Some(owner) = run.owner {
                    sink.borrow_mut().push(tree.position(owner).x);
                }
            })
            .with_owner(node)
            .with_times(Repeat::Times(2)),
        );
        scene
            .run_action(node, Action::move_by(1.0, Vec2::new(10.0, 0.0)))
            .unwrap();
        scene.tick(0.5);
        scene.tick(0.5);
        // Each task run observes the position before that tick's action update.
        assert_eq!(*seen.borrow(), vec![0.0, 5.0]);
    }

    #[test]
    fn evaluate_produces_draw_list() {
        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        scene.tree.add_child(scene.root(), node).unwrap();
        scene.tree.set_position(node, Point::new(3.0, 4.0));
        let root = scene.root();

        let changes = scene.evaluate();
        assert_eq!(changes.draw_order, vec![root.index(), node.index()]);
        assert_eq!(scene.tree.scene_of(node), Some(root));
        assert_eq!(
            scene.tree.matrix_final(node) * Point::ORIGIN,
            Point::new(3.0, 4.0)
        );
    }

    #[test]
    fn pause_node_holds_its_work() {
        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        scene
            .run_action(node, Action::move_by(1.0, Vec2::new(10.0, 0.0)))
            .unwrap();
        scene.pause_node(node);
        scene.tick(0.5);
        assert_eq!(scene.tree.position(node), Point::ORIGIN);
        scene.resume_node(node);
        scene.tick(0.5);
        assert!((scene.tree.position(node).x - 5.0).abs() < 1e-9);
        scene.stop_node(node);
        scene.tick(0.5);
        assert!(scene.actions.is_empty());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traced_tick_reports_counts() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Collect {
            ends: Vec<TickEndEvent>,
            destroyed: Vec<NodesDestroyedEvent>,
        }
        impl TraceSink for Collect {
            fn on_tick_end(&mut self, e: &TickEndEvent) {
                self.ends.push(*e);
            }
            fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
                self.destroyed.push(*e);
            }
        }

        let mut scene = Scene::default();
        let node = scene.tree.create_node();
        scene.tree.add_child(scene.root(), node).unwrap();
        scene.run_action(node, Action::delay(0.25)).unwrap();
        scene.run_action(node, Action::delay(5.0)).unwrap();

        let mut sink = Collect::default();
        scene.tick_traced(0.5, &mut Tracer::new(&mut sink));
        scene.destroy_node_traced(node, &mut Tracer::new(&mut sink));

        assert_eq!(sink.ends.len(), 1);
        assert_eq!(sink.ends[0].actions_finished, 1);
        assert_eq!(sink.ends[0].actions_active, 1);
        assert!((sink.ends[0].time - 0.5).abs() < 1e-12);
        assert_eq!(sink.destroyed[0].actions_removed, 1);
        assert_eq!(sink.destroyed[0].frame_index, 1);
    }
}
