// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame drivers for actions and tasks.
//!
//! [`ActionScheduler`] and [`TaskScheduler`] each own a [`ScheduleList`] of
//! active entries. `tick` walks the list once, capturing the next key before
//! updating each entry so that an entry can be unlinked mid-walk, and
//! removes entries that report completion. Entries are addressed by
//! [`ActionId`] / [`TaskId`] handles that go stale once the entry is
//! removed.
//!
//! Schedulers are plain values owned by the caller (normally a
//! [`Scene`](crate::scene::Scene)); there is no global state.

use alloc::vec;
use alloc::vec::Vec;

use crate::action::{Action, ActionState};
use crate::list::{EntryKey, ScheduleList};
use crate::node::{NodeId, SceneTree};
use crate::task::{Task, TaskState};
use crate::trace::{ActionFinishedEvent, TaskFiredEvent, Tracer};

/// Handle to an action in an [`ActionScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActionId(EntryKey);

impl ActionId {
    /// Returns the raw schedule slot (for diagnostics only).
    #[must_use]
    pub fn index(self) -> u32 {
        self.0.index()
    }
}

/// Handle to a task in a [`TaskScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(EntryKey);

impl TaskId {
    /// Returns the raw schedule slot (for diagnostics only).
    #[must_use]
    pub fn index(self) -> u32 {
        self.0.index()
    }
}

/// Outcome of one scheduler tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Entries updated this tick.
    pub updated: usize,
    /// Entries that finished and were unscheduled.
    pub finished: usize,
    /// Task callbacks invoked (always 0 for actions).
    pub fired: usize,
}

/// Node membership indexed by slot and checked by generation.
struct NodeSet {
    generations: Vec<Option<u32>>,
}

impl NodeSet {
    fn new(nodes: &[NodeId]) -> Self {
        let len = nodes.iter().map(|n| n.index() as usize + 1).max().unwrap_or(0);
        let mut generations = vec![None; len];
        for n in nodes {
            generations[n.index() as usize] = Some(n.generation());
        }
        Self { generations }
    }

    fn contains(&self, node: NodeId) -> bool {
        self.generations.get(node.index() as usize) == Some(&Some(node.generation()))
    }
}

// ---------------------------------------------------------------------------
// ActionScheduler
// ---------------------------------------------------------------------------

/// Drives every scheduled [`Action`] once per tick.
#[derive(Debug, Default)]
pub struct ActionScheduler {
    list: ScheduleList<Action>,
}

impl ActionScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` at the tail of the list.
    ///
    /// The action's progress is rewound first, and an idle action is
    /// started. An action without a target finishes on its next tick.
    pub fn add(&mut self, mut action: Action) -> ActionId {
        action.reset();
        action.start();
        ActionId(self.list.push_back(action))
    }

    /// Returns the number of scheduled actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns whether `id` is still scheduled.
    #[must_use]
    pub fn contains(&self, id: ActionId) -> bool {
        self.list.contains(id.0)
    }

    /// Returns the scheduled action.
    #[must_use]
    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.list.get(id.0)
    }

    /// Returns the scheduled action mutably.
    pub fn get_mut(&mut self, id: ActionId) -> Option<&mut Action> {
        self.list.get_mut(id.0)
    }

    /// Returns the state of a scheduled action.
    #[must_use]
    pub fn state(&self, id: ActionId) -> Option<ActionState> {
        self.get(id).map(Action::state)
    }

    /// Unschedules an action and hands it back.
    pub fn remove(&mut self, id: ActionId) -> Option<Action> {
        self.list.remove(id.0)
    }

    /// Pauses one action.
    pub fn pause(&mut self, id: ActionId) {
        if let Some(a) = self.get_mut(id) {
            a.pause();
        }
    }

    /// Resumes one action.
    pub fn resume(&mut self, id: ActionId) {
        if let Some(a) = self.get_mut(id) {
            a.resume();
        }
    }

    /// Stops one action; it is unscheduled on the next tick.
    pub fn stop(&mut self, id: ActionId) {
        if let Some(a) = self.get_mut(id) {
            a.stop();
        }
    }

    /// Returns the first scheduled action with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<ActionId> {
        self.list
            .iter()
            .find(|(_, a)| a.name() == Some(name))
            .map(|(k, _)| ActionId(k))
    }

    /// Returns every scheduled action bound to `node`.
    #[must_use]
    pub fn bound_to(&self, node: NodeId) -> Vec<ActionId> {
        self.list
            .iter()
            .filter(|(_, a)| a.target() == Some(node))
            .map(|(k, _)| ActionId(k))
            .collect()
    }

    /// Unschedules every action bound to `node` and returns how many there
    /// were.
    pub fn remove_all_bound_to(&mut self, node: NodeId) -> usize {
        self.remove_all_bound_within(&[node])
    }

    /// Unschedules every action bound to any of `nodes` in a single pass
    /// over the list and returns how many there were.
    pub fn remove_all_bound_within(&mut self, nodes: &[NodeId]) -> usize {
        let set = NodeSet::new(nodes);
        let keys: Vec<EntryKey> = self
            .list
            .iter()
            .filter(|(_, a)| a.target().is_some_and(|t| set.contains(t)))
            .map(|(k, _)| k)
            .collect();
        for &k in &keys {
            self.list.remove(k);
        }
        keys.len()
    }

    /// Stops every action bound to `node`.
    pub fn stop_all_bound_to(&mut self, node: NodeId) {
        self.for_each_bound_to(node, Action::stop);
    }

    /// Pauses every action bound to `node`.
    pub fn pause_all_bound_to(&mut self, node: NodeId) {
        self.for_each_bound_to(node, Action::pause);
    }

    /// Resumes every action bound to `node`.
    pub fn resume_all_bound_to(&mut self, node: NodeId) {
        self.for_each_bound_to(node, Action::resume);
    }

    /// Starts idle actions and resumes paused ones.
    pub fn start_all(&mut self) {
        self.for_each(|a| {
            a.start();
            a.resume();
        });
    }

    /// Pauses every running action.
    pub fn pause_all(&mut self) {
        self.for_each(Action::pause);
    }

    /// Stops every action; all are unscheduled on the next tick.
    pub fn stop_all(&mut self) {
        self.for_each(Action::stop);
    }

    /// Updates every scheduled action by `dt` and unschedules the ones that
    /// are done afterwards (including stopped ones).
    pub fn tick(
        &mut self,
        dt: f64,
        tree: &mut SceneTree,
        tracer: &mut Tracer<'_>,
        frame_index: u64,
    ) -> TickStats {
        let mut stats = TickStats::default();
        let mut cursor = self.list.front();
        while let Some(key) = cursor {
            // Captured before the update so removal cannot break the walk.
            cursor = self.list.next(key);
            let Some(action) = self.list.get_mut(key) else {
                continue;
            };
            stats.updated += 1;
            if action.update(dt, tree) {
                let node_index = action.target().map(NodeId::index);
                self.list.remove(key);
                stats.finished += 1;
                tracer.action_finished(&ActionFinishedEvent {
                    frame_index,
                    action_index: key.index(),
                    node_index,
                });
            }
        }
        stats
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut Action)) {
        for key in self.list.keys() {
            if let Some(a) = self.list.get_mut(key) {
                f(a);
            }
        }
    }

    fn for_each_bound_to(&mut self, node: NodeId, f: impl Fn(&mut Action)) {
        self.for_each(|a| {
            if a.target() == Some(node) {
                f(a);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// TaskScheduler
// ---------------------------------------------------------------------------

/// Drives every scheduled [`Task`] once per tick.
#[derive(Debug, Default)]
pub struct TaskScheduler {
    list: ScheduleList<Task>,
}

impl TaskScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` at the tail of the list, clearing its accumulated
    /// time and run count.
    pub fn add(&mut self, mut task: Task) -> TaskId {
        task.reset();
        TaskId(self.list.push_back(task))
    }

    /// Returns the number of scheduled tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns whether `id` is still scheduled.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.list.contains(id.0)
    }

    /// Returns the scheduled task.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.list.get(id.0)
    }

    /// Returns the scheduled task mutably.
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.list.get_mut(id.0)
    }

    /// Returns the state of a scheduled task.
    #[must_use]
    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.get(id).map(Task::state)
    }

    /// Unschedules a task and hands it back.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.list.remove(id.0)
    }

    /// Pauses one task.
    pub fn pause(&mut self, id: TaskId) {
        if let Some(t) = self.get_mut(id) {
            t.pause();
        }
    }

    /// Resumes one task.
    pub fn resume(&mut self, id: TaskId) {
        if let Some(t) = self.get_mut(id) {
            t.resume();
        }
    }

    /// Stops one task; it is unscheduled on the next tick.
    pub fn stop(&mut self, id: TaskId) {
        if let Some(t) = self.get_mut(id) {
            t.stop();
        }
    }

    /// Returns the first scheduled task with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<TaskId> {
        self.list
            .iter()
            .find(|(_, t)| t.name() == Some(name))
            .map(|(k, _)| TaskId(k))
    }

    /// Unschedules every task owned by `node` and returns how many there
    /// were.
    pub fn remove_all_bound_to(&mut self, node: NodeId) -> usize {
        self.remove_all_bound_within(&[node])
    }

    /// Unschedules every task owned by any of `nodes` in a single pass over
    /// the list and returns how many there were.
    pub fn remove_all_bound_within(&mut self, nodes: &[NodeId]) -> usize {
        let set = NodeSet::new(nodes);
        let keys: Vec<EntryKey> = self
            .list
            .iter()
            .filter(|(_, t)| t.owner().is_some_and(|o| set.contains(o)))
            .map(|(k, _)| k)
            .collect();
        for &k in &keys {
            self.list.remove(k);
        }
        keys.len()
    }

    /// Stops every task owned by `node`.
    pub fn stop_all_bound_to(&mut self, node: NodeId) {
        self.for_each(|t| {
            if t.owner() == Some(node) {
                t.stop();
            }
        });
    }

    /// Pauses every task owned by `node`.
    pub fn pause_all_bound_to(&mut self, node: NodeId) {
        self.for_each(|t| {
            if t.owner() == Some(node) {
                t.pause();
            }
        });
    }

    /// Resumes every task owned by `node`.
    pub fn resume_all_bound_to(&mut self, node: NodeId) {
        self.for_each(|t| {
            if t.owner() == Some(node) {
                t.resume();
            }
        });
    }

    /// Resumes every paused task.
    pub fn start_all(&mut self) {
        self.for_each(Task::resume);
    }

    /// Pauses every running task.
    pub fn pause_all(&mut self) {
        self.for_each(Task::pause);
    }

    /// Stops every task; all are unscheduled on the next tick.
    pub fn stop_all(&mut self) {
        self.for_each(Task::stop);
    }

    /// Updates every scheduled task by `dt` and unschedules finished ones.
    pub fn tick(
        &mut self,
        dt: f64,
        tree: &mut SceneTree,
        tracer: &mut Tracer<'_>,
        frame_index: u64,
    ) -> TickStats {
        let mut stats = TickStats::default();
        let mut cursor = self.list.front();
        while let Some(key) = cursor {
            cursor = self.list.next(key);
            let Some(task) = self.list.get_mut(key) else {
                continue;
            };
            stats.updated += 1;
            if let Some(run) = task.update(dt, tree) {
                stats.fired += 1;
                tracer.task_fired(&TaskFiredEvent {
                    frame_index,
                    task_index: key.index(),
                    run: run.run,
                });
            }
            if task.is_done() {
                self.list.remove(key);
                stats.finished += 1;
            }
        }
        stats
    }

    fn for_each(&mut self, mut f: impl FnMut(&mut Task)) {
        for key in self.list.keys() {
            if let Some(t) = self.list.get_mut(key) {
                f(t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use kurbo::Vec2;

    use super::*;
    use crate::action::Repeat;

    #[test]
    fn finished_actions_are_unscheduled() {
        let mut tree = SceneTree::new();
        let node = tree.create_node();
        let mut sched = ActionScheduler::new();
        let mut short = Action::move_by(0.5, Vec2::new(1.0, 0.0));
        short.start_with_target(node).unwrap();
        let mut long = Action::move_by(1.0, Vec2::new(0.0, 1.0));
        long.start_with_target(node).unwrap();
        let short = sched.add(short);
        let long = sched.add(long);

        let stats = sched.tick(0.5, &mut tree, &mut Tracer::none(), 0);
        assert_eq!(stats.updated, 2);
        assert_eq!(stats.finished, 1);
        assert!(!sched.contains(short));
        assert!(sched.contains(long));
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn remove_all_bound_to_counts_exactly() {
        let mut tree = SceneTree::new();
        let a = tree.create_node();
        let b = tree.create_node();
        let mut sched = ActionScheduler::new();
        for node in [a, a, b] {
            let mut action = Action::delay(1.0);
            action.start_with_target(node).unwrap();
            sched.add(action);
        }
        assert_eq!(sched.remove_all_bound_to(a), 2);
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.remove_all_bound_to(a), 0);
    }

    #[test]
    fn remove_within_matches_slot_and_generation() {
        let mut tree = SceneTree::new();
        let old = tree.create_node();
        let other = tree.create_node();
        tree.destroy(old);
        let reused = tree.create_node();
        assert_eq!(reused.index(), old.index());

        let mut actions = ActionScheduler::new();
        let mut tasks = TaskScheduler::new();
        for node in [old, reused, reused, other] {
            let mut action = Action::delay(1.0);
            action.start_with_target(node).unwrap();
            actions.add(action);
            tasks.add(Task::new(1.0, |_, _| {}).with_owner(node));
        }
        assert_eq!(actions.remove_all_bound_within(&[reused, other]), 3);
        assert_eq!(tasks.remove_all_bound_within(&[reused, other]), 3);
        assert_eq!(actions.len(), 1);
        assert_eq!(tasks.len(), 1);
        assert_eq!(actions.remove_all_bound_within(&[]), 0);
    }

    #[test]
    fn paused_actions_hold_and_stopped_ones_leave() {
        let mut tree = SceneTree::new();
        let node = tree.create_node();
        let mut sched = ActionScheduler::new();
        let mut action = Action::move_by(1.0, Vec2::new(10.0, 0.0)).with_name("slide");
        action.start_with_target(node).unwrap();
        let id = sched.add(action);
        assert_eq!(sched.find_by_name("slide"), Some(id));

        sched.pause_all_bound_to(node);
        sched.tick(0.5, &mut tree, &mut Tracer::none(), 0);
        assert_eq!(tree.position(node).x, 0.0);
        assert_eq!(sched.state(id), Some(ActionState::Paused));

        sched.start_all();
        sched.tick(0.5, &mut tree, &mut Tracer::none(), 1);
        assert!((tree.position(node).x - 5.0).abs() < 1e-9);

        sched.stop_all();
        let stats = sched.tick(0.5, &mut tree, &mut Tracer::none(), 2);
        assert_eq!(stats.finished, 1);
        assert!(sched.is_empty());
        assert!((tree.position(node).x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn add_rewinds_progress() {
        let mut tree = SceneTree::new();
        let node = tree.create_node();
        let mut action = Action::move_by(1.0, Vec2::new(10.0, 0.0));
        action.start_with_target(node).unwrap();
        action.start();
        action.update(0.5, &mut tree);

        let mut sched = ActionScheduler::new();
        sched.add(action);
        sched.tick(0.5, &mut tree, &mut Tracer::none(), 0);
        // Restarted from the current position, so only half of the delta again.
        assert!((tree.position(node).x - 10.0).abs() < 1e-9);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn tasks_fire_and_finish() {
        let mut tree = SceneTree::new();
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let mut sched = TaskScheduler::new();
        let id = sched.add(
            Task::new(0.25, move |_, _| seen.set(seen.get() + 1))
                .with_times(Repeat::Times(2))
                .with_name("blink"),
        );
        assert_eq!(sched.find_by_name("blink"), Some(id));

        let stats = sched.tick(0.25, &mut tree, &mut Tracer::none(), 0);
        assert_eq!(stats.fired, 1);
        assert_eq!(stats.finished, 0);
        let stats = sched.tick(0.25, &mut tree, &mut Tracer::none(), 1);
        assert_eq!(stats.fired, 1);
        assert_eq!(stats.finished, 1);
        assert!(sched.is_empty());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn task_removal_by_owner() {
        let mut tree = SceneTree::new();
        let node = tree.create_node();
        let mut sched = TaskScheduler::new();
        sched.add(Task::new(1.0, |_, _| {}).with_owner(node));
        sched.add(Task::new(1.0, |_, _| {}));
        assert_eq!(sched.remove_all_bound_to(node), 1);
        assert_eq!(sched.len(), 1);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn finished_actions_are_traced() {
        use alloc::vec::Vec;

        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Finished(Vec<ActionFinishedEvent>);
        impl TraceSink for Finished {
            fn on_action_finished(&mut self, e: &ActionFinishedEvent) {
                self.0.push(*e);
            }
        }

        let mut tree = SceneTree::new();
        let node = tree.create_node();
        let mut sched = ActionScheduler::new();
        let mut action = Action::delay(0.1);
        action.start_with_target(node).unwrap();
        let id = sched.add(action);

        let mut sink = Finished::default();
        sched.tick(0.1, &mut tree, &mut Tracer::new(&mut sink), 9);
        assert_eq!(
            sink.0,
            [ActionFinishedEvent {
                frame_index: 9,
                action_index: id.index(),
                node_index: Some(node.index()),
            }]
        );
    }
}
