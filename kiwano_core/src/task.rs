// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Repeating timed callbacks.
//!
//! A [`Task`] calls its callback every `interval` seconds of accumulated
//! `dt`, at most once per update, until it has run `times` times. An
//! interval of zero fires on every update. Time beyond the interval carries
//! into the next period, so a task on a 0.5 s interval fed 0.3 s frames
//! fires on frames 2, 4, 5, 7, ...

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use crate::action::Repeat;
use crate::action::tween::TIME_EPSILON;
use crate::node::{NodeId, SceneTree};

/// Control state of a [`Task`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Accumulating time and firing.
    #[default]
    Running,
    /// Holding its accumulated time.
    Paused,
    /// Finished or stopped. Terminal.
    Done,
}

/// Details passed to a task callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaskRun {
    /// The node the task is bound to, if any.
    pub owner: Option<NodeId>,
    /// 1-based count of this run.
    pub run: u32,
    /// The frame delta that triggered this run, in seconds.
    pub dt: f64,
}

/// Callback invoked each time a [`Task`] fires.
pub type TaskCallback = Rc<dyn Fn(&mut SceneTree, TaskRun)>;

/// A callback on a fixed interval. See the [module docs](self).
pub struct Task {
    name: Option<String>,
    interval: f64,
    times: Repeat,
    elapsed: f64,
    runs: u32,
    state: TaskState,
    owner: Option<NodeId>,
    callback: TaskCallback,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("times", &self.times)
            .field("elapsed", &self.elapsed)
            .field("runs", &self.runs)
            .field("state", &self.state)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl Task {
    /// Creates a task that fires every `interval` seconds, forever.
    #[must_use]
    pub fn new(interval: f64, callback: impl Fn(&mut SceneTree, TaskRun) + 'static) -> Self {
        Self {
            name: None,
            interval: interval.max(0.0),
            times: Repeat::Forever,
            elapsed: 0.0,
            runs: 0,
            state: TaskState::Running,
            owner: None,
            callback: Rc::new(callback),
        }
    }

    /// Limits the number of runs.
    #[must_use]
    pub fn with_times(mut self, times: Repeat) -> Self {
        self.times = times;
        self
    }

    /// Sets the task's name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binds the task to a node. The task finishes once the node is
    /// destroyed and is purged together with it by the scene.
    #[must_use]
    pub fn with_owner(mut self, owner: NodeId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Returns the task's name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the interval in seconds.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Returns the node the task is bound to.
    #[must_use]
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Returns how many times the task has fired since it was last reset.
    #[must_use]
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Returns the current control state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Returns whether the task has finished or been stopped.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == TaskState::Done
    }

    /// `Running → Paused`.
    pub fn pause(&mut self) {
        if self.state == TaskState::Running {
            self.state = TaskState::Paused;
        }
    }

    /// `Paused → Running`.
    pub fn resume(&mut self) {
        if self.state == TaskState::Paused {
            self.state = TaskState::Running;
        }
    }

    /// Moves to `Done` immediately.
    pub fn stop(&mut self) {
        self.state = TaskState::Done;
    }

    /// Clears accumulated time and the run count. A finished task runs
    /// again.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.runs = 0;
        if self.state == TaskState::Done {
            self.state = TaskState::Running;
        }
    }

    /// Advances the task by `dt` seconds and fires it if due.
    ///
    /// Returns the run details if the callback was called.
    pub fn update(&mut self, dt: f64, tree: &mut SceneTree) -> Option<TaskRun> {
        if self.state != TaskState::Running {
            return None;
        }
        if self.owner.is_some_and(|o| !tree.is_alive(o)) || self.exhausted() {
            self.state = TaskState::Done;
            return None;
        }

        self.elapsed += dt;
        if self.elapsed + TIME_EPSILON < self.interval {
            return None;
        }
        self.elapsed = if self.interval > 0.0 {
            (self.elapsed - self.interval).max(0.0)
        } else {
            0.0
        };
        self.runs = self.runs.saturating_add(1);
        let run = TaskRun {
            owner: self.owner,
            run: self.runs,
            dt,
        };
        (self.callback)(tree, run);
        if self.exhausted() {
            self.state = TaskState::Done;
        }
        Some(run)
    }

    fn exhausted(&self) -> bool {
        matches!(self.times, Repeat::Times(n) if self.runs >= n)
    }
}
