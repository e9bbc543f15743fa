// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-driven behaviors applied to nodes.
//!
//! An [`Action`] mutates one target node over time. Leaves tween a single
//! property (position, scale, rotation, opacity), wait, flip through image
//! frames, or invoke a callback. Combinators nest other actions:
//! [`sequence`](Action::sequence), [`parallel`](Action::parallel) and
//! [`repeat`](Action::repeat).
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──start──► Running ◄──resume── Paused
//!                      │  └───pause────►  │
//!                      ▼                  │
//!                    Done ◄────stop───────┘   (stop works from any state)
//! ```
//!
//! An action is bound to its target exactly once, by
//! [`start_with_target`](Action::start_with_target). Composites bind their
//! children to the same target. Running the same behavior on a second node
//! takes a [`clone_unbound`](Action::clone_unbound) copy.
//!
//! # Time accounting
//!
//! Every step reports how much of its `dt` was left over when the action
//! finished. Sequences and loops hand that remainder to the next child, so
//! a sequence whose children sum to `T` seconds is done after exactly `T`
//! seconds of accumulated `dt`, however the frames are split.

mod ease;
pub(crate) mod tween;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};

pub use ease::Ease;
use tween::{Goal, Tween, advance_clock};

use crate::error::ActionError;
use crate::node::{FrameId, NodeId, SceneTree};

/// Control state of an [`Action`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActionState {
    /// Created or rewound, not yet started.
    #[default]
    Idle,
    /// Advancing on every update.
    Running,
    /// Holding its progress; updates are ignored.
    Paused,
    /// Finished or stopped. Terminal.
    Done,
}

/// How many times a [`repeat`](Action::repeat) loop runs its child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repeat {
    /// A fixed number of runs.
    Times(u32),
    /// Never finishes on its own.
    Forever,
}

impl Repeat {
    /// Maps a signed count to a repeat mode; any negative count repeats
    /// forever.
    #[must_use]
    pub fn from_count(times: i32) -> Self {
        u32::try_from(times).map_or(Self::Forever, Self::Times)
    }
}

/// Callback invoked by [`Action::callback`] with the tree and the target.
pub type ActionCallback = Rc<dyn Fn(&mut SceneTree, NodeId)>;

#[derive(Clone)]
struct CallbackFn(ActionCallback);

impl fmt::Debug for CallbackFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackFn")
    }
}

#[derive(Debug)]
enum ActionKind {
    Move(Tween<Vec2>),
    Jump {
        tween: Tween<Vec2>,
        height: f64,
        jumps: u32,
    },
    Scale(Tween<Vec2>),
    Rotate(Tween<f64>),
    Opacity(Tween<f64>),
    Delay {
        duration: f64,
        elapsed: f64,
    },
    Animate {
        frames: Vec<FrameId>,
        interval: f64,
        elapsed: f64,
    },
    Callback(CallbackFn),
    Sequence {
        actions: Vec<Action>,
        current: usize,
    },
    Parallel {
        actions: Vec<Action>,
    },
    Loop {
        action: Box<Action>,
        times: Repeat,
        completed: u32,
    },
}

/// A time-driven behavior bound to one node. See the [module docs](self).
#[derive(Debug)]
pub struct Action {
    state: ActionState,
    target: Option<NodeId>,
    name: Option<String>,
    kind: ActionKind,
}

impl Action {
    fn new(kind: ActionKind) -> Self {
        Self {
            state: ActionState::Idle,
            target: None,
            name: None,
            kind,
        }
    }

    // -- Constructors --

    /// Moves the target by `delta` over `duration` seconds.
    #[must_use]
    pub fn move_by(duration: f64, delta: Vec2) -> Self {
        Self::new(ActionKind::Move(Tween::new(duration, Goal::By(delta))))
    }

    /// Moves the target to `position` over `duration` seconds.
    #[must_use]
    pub fn move_to(duration: f64, position: Point) -> Self {
        Self::new(ActionKind::Move(Tween::new(
            duration,
            Goal::To(position.to_vec2()),
        )))
    }

    /// Moves the target by `delta` in `jumps` parabolic hops reaching
    /// `height` above the straight path (toward negative y).
    #[must_use]
    pub fn jump_by(duration: f64, delta: Vec2, height: f64, jumps: u32) -> Self {
        Self::new(ActionKind::Jump {
            tween: Tween::new(duration, Goal::By(delta)),
            height,
            jumps,
        })
    }

    /// Like [`jump_by`](Self::jump_by), ending at `position`.
    #[must_use]
    pub fn jump_to(duration: f64, position: Point, height: f64, jumps: u32) -> Self {
        Self::new(ActionKind::Jump {
            tween: Tween::new(duration, Goal::To(position.to_vec2())),
            height,
            jumps,
        })
    }

    /// Adds `delta` to the target's scale over `duration` seconds.
    #[must_use]
    pub fn scale_by(duration: f64, delta: Vec2) -> Self {
        Self::new(ActionKind::Scale(Tween::new(duration, Goal::By(delta))))
    }

    /// Scales the target to `scale` over `duration` seconds.
    #[must_use]
    pub fn scale_to(duration: f64, scale: Vec2) -> Self {
        Self::new(ActionKind::Scale(Tween::new(duration, Goal::To(scale))))
    }

    /// Rotates the target by `degrees` over `duration` seconds.
    #[must_use]
    pub fn rotate_by(duration: f64, degrees: f64) -> Self {
        Self::new(ActionKind::Rotate(Tween::new(duration, Goal::By(degrees))))
    }

    /// Rotates the target to `degrees` over `duration` seconds.
    #[must_use]
    pub fn rotate_to(duration: f64, degrees: f64) -> Self {
        Self::new(ActionKind::Rotate(Tween::new(duration, Goal::To(degrees))))
    }

    /// Adds `delta` to the target's own opacity over `duration` seconds.
    #[must_use]
    pub fn opacity_by(duration: f64, delta: f64) -> Self {
        Self::new(ActionKind::Opacity(Tween::new(duration, Goal::By(delta))))
    }

    /// Fades the target's own opacity to `opacity` over `duration` seconds.
    #[must_use]
    pub fn opacity_to(duration: f64, opacity: f64) -> Self {
        Self::new(ActionKind::Opacity(Tween::new(duration, Goal::To(opacity))))
    }

    /// Fades the target to fully opaque.
    #[must_use]
    pub fn fade_in(duration: f64) -> Self {
        Self::opacity_to(duration, 1.0)
    }

    /// Fades the target to fully transparent.
    #[must_use]
    pub fn fade_out(duration: f64) -> Self {
        Self::opacity_to(duration, 0.0)
    }

    /// Does nothing for `duration` seconds.
    #[must_use]
    pub fn delay(duration: f64) -> Self {
        Self::new(ActionKind::Delay {
            duration: duration.max(0.0),
            elapsed: 0.0,
        })
    }

    /// Shows each frame for `interval` seconds, in order.
    ///
    /// The first frame is written on the first update; the last frame stays
    /// on the target when the action finishes.
    #[must_use]
    pub fn animate(frames: Vec<FrameId>, interval: f64) -> Self {
        Self::new(ActionKind::Animate {
            frames,
            interval: interval.max(0.0),
            elapsed: 0.0,
        })
    }

    /// Calls `f` once and finishes without consuming time.
    #[must_use]
    pub fn callback(f: impl Fn(&mut SceneTree, NodeId) + 'static) -> Self {
        Self::new(ActionKind::Callback(CallbackFn(Rc::new(f))))
    }

    /// Runs `actions` one after another.
    #[must_use]
    pub fn sequence(actions: Vec<Self>) -> Self {
        Self::new(ActionKind::Sequence {
            actions,
            current: 0,
        })
    }

    /// Runs `actions` together; done when all of them are.
    #[must_use]
    pub fn parallel(actions: Vec<Self>) -> Self {
        Self::new(ActionKind::Parallel { actions })
    }

    /// Runs `action` `times` times back to back.
    #[must_use]
    pub fn repeat(action: Self, times: u32) -> Self {
        Self::looped(action, Repeat::Times(times))
    }

    /// Runs `action` over and over; never finishes on its own.
    #[must_use]
    pub fn repeat_forever(action: Self) -> Self {
        Self::looped(action, Repeat::Forever)
    }

    /// Runs `action` according to `times`.
    #[must_use]
    pub fn looped(action: Self, times: Repeat) -> Self {
        Self::new(ActionKind::Loop {
            action: Box::new(action),
            times,
            completed: 0,
        })
    }

    /// Sets the action's name, used by scheduler lookups.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the easing curve of a tween. Other actions ignore it.
    #[must_use]
    pub fn with_ease(mut self, ease: Ease) -> Self {
        match &mut self.kind {
            ActionKind::Move(t) | ActionKind::Scale(t) | ActionKind::Jump { tween: t, .. } => {
                t.ease = ease;
            }
            ActionKind::Rotate(t) | ActionKind::Opacity(t) => t.ease = ease,
            _ => {}
        }
        self
    }

    // -- Queries --

    /// Returns the current control state.
    #[must_use]
    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Returns whether the action has finished or been stopped.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == ActionState::Done
    }

    /// Returns the bound target, if any.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Returns the action's name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the total run time in seconds; infinite for endless loops.
    #[must_use]
    pub fn duration(&self) -> f64 {
        match &self.kind {
            ActionKind::Move(t) | ActionKind::Scale(t) | ActionKind::Jump { tween: t, .. } => {
                t.duration
            }
            ActionKind::Rotate(t) | ActionKind::Opacity(t) => t.duration,
            ActionKind::Delay { duration, .. } => *duration,
            ActionKind::Animate {
                frames, interval, ..
            } => *interval * frames.len() as f64,
            ActionKind::Callback(_) => 0.0,
            ActionKind::Sequence { actions, .. } => actions.iter().map(Self::duration).sum(),
            ActionKind::Parallel { actions } => {
                actions.iter().map(Self::duration).fold(0.0, f64::max)
            }
            ActionKind::Loop { action, times, .. } => match times {
                Repeat::Times(n) => action.duration() * f64::from(*n),
                Repeat::Forever => f64::INFINITY,
            },
        }
    }

    // -- Binding and control --

    /// Binds the action (and every nested action) to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::AlreadyBound`] if this action or any nested
    /// action already has a target. Nothing is rebound in that case.
    pub fn start_with_target(&mut self, target: NodeId) -> Result<(), ActionError> {
        if let Some(bound) = self.bound_target() {
            return Err(ActionError::AlreadyBound { target: bound });
        }
        self.bind(target);
        Ok(())
    }

    /// `Idle → Running`. Other states are left alone.
    pub fn start(&mut self) {
        if self.state == ActionState::Idle {
            self.state = ActionState::Running;
        }
    }

    /// `Running → Paused`, keeping progress.
    pub fn pause(&mut self) {
        if self.state == ActionState::Running {
            self.state = ActionState::Paused;
        }
    }

    /// `Paused → Running`.
    pub fn resume(&mut self) {
        if self.state == ActionState::Paused {
            self.state = ActionState::Running;
        }
    }

    /// Moves to `Done` immediately. Mutations already applied stay applied.
    pub fn stop(&mut self) {
        self.state = ActionState::Done;
    }

    /// Rewinds progress to zero, keeping the binding.
    ///
    /// A finished action becomes `Idle`; otherwise the control state is kept.
    pub fn reset(&mut self) {
        self.rewind();
        if self.state == ActionState::Done {
            self.state = ActionState::Idle;
        }
    }

    /// Advances the action by `dt` seconds.
    ///
    /// Does nothing unless the action is `Running`. An action whose target
    /// is unbound or no longer alive finishes without touching the tree.
    /// Returns whether the action is done after this update.
    pub fn update(&mut self, dt: f64, tree: &mut SceneTree) -> bool {
        if self.state == ActionState::Running {
            self.advance(dt, tree);
        }
        self.is_done()
    }

    /// Returns an `Idle`, unbound copy with the same parameters and no
    /// progress.
    #[must_use]
    pub fn clone_unbound(&self) -> Self {
        let kind = match &self.kind {
            ActionKind::Move(t) => ActionKind::Move(t.fresh()),
            ActionKind::Jump {
                tween,
                height,
                jumps,
            } => ActionKind::Jump {
                tween: tween.fresh(),
                height: *height,
                jumps: *jumps,
            },
            ActionKind::Scale(t) => ActionKind::Scale(t.fresh()),
            ActionKind::Rotate(t) => ActionKind::Rotate(t.fresh()),
            ActionKind::Opacity(t) => ActionKind::Opacity(t.fresh()),
            ActionKind::Delay { duration, .. } => ActionKind::Delay {
                duration: *duration,
                elapsed: 0.0,
            },
            ActionKind::Animate {
                frames, interval, ..
            } => ActionKind::Animate {
                frames: frames.clone(),
                interval: *interval,
                elapsed: 0.0,
            },
            ActionKind::Callback(f) => ActionKind::Callback(f.clone()),
            ActionKind::Sequence { actions, .. } => ActionKind::Sequence {
                actions: actions.iter().map(Self::clone_unbound).collect(),
                current: 0,
            },
            ActionKind::Parallel { actions } => ActionKind::Parallel {
                actions: actions.iter().map(Self::clone_unbound).collect(),
            },
            ActionKind::Loop { action, times, .. } => ActionKind::Loop {
                action: Box::new(action.clone_unbound()),
                times: *times,
                completed: 0,
            },
        };
        Self {
            name: self.name.clone(),
            ..Self::new(kind)
        }
    }

    /// Returns an unbound action that undoes this one.
    ///
    /// Relative tweens negate their delta, sequences run their reversed
    /// children in reverse order, frame animations play their frames
    /// backwards. Delays and callbacks reverse to copies of themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Irreversible`] if this action or a nested one
    /// is an absolute (`*_to`, `fade_*`) tween.
    pub fn reverse(&self) -> Result<Self, ActionError> {
        let kind = match &self.kind {
            ActionKind::Move(t) => ActionKind::Move(t.reversed()?),
            ActionKind::Jump {
                tween,
                height,
                jumps,
            } => ActionKind::Jump {
                tween: tween.reversed()?,
                height: *height,
                jumps: *jumps,
            },
            ActionKind::Scale(t) => ActionKind::Scale(t.reversed()?),
            ActionKind::Rotate(t) => ActionKind::Rotate(t.reversed()?),
            ActionKind::Opacity(t) => ActionKind::Opacity(t.reversed()?),
            ActionKind::Delay { .. } | ActionKind::Callback(_) => {
                return Ok(self.clone_unbound());
            }
            ActionKind::Animate {
                frames, interval, ..
            } => ActionKind::Animate {
                frames: frames.iter().rev().copied().collect(),
                interval: *interval,
                elapsed: 0.0,
            },
            ActionKind::Sequence { actions, .. } => ActionKind::Sequence {
                actions: actions
                    .iter()
                    .rev()
                    .map(Self::reverse)
                    .collect::<Result<_, _>>()?,
                current: 0,
            },
            ActionKind::Parallel { actions } => ActionKind::Parallel {
                actions: actions
                    .iter()
                    .map(Self::reverse)
                    .collect::<Result<_, _>>()?,
            },
            ActionKind::Loop { action, times, .. } => ActionKind::Loop {
                action: Box::new(action.reverse()?),
                times: *times,
                completed: 0,
            },
        };
        Ok(Self {
            name: self.name.clone(),
            ..Self::new(kind)
        })
    }

    // -- Internals --

    fn bound_target(&self) -> Option<NodeId> {
        if self.target.is_some() {
            return self.target;
        }
        match &self.kind {
            ActionKind::Sequence { actions, .. } | ActionKind::Parallel { actions } => {
                actions.iter().find_map(Self::bound_target)
            }
            ActionKind::Loop { action, .. } => action.bound_target(),
            _ => None,
        }
    }

    fn bind(&mut self, target: NodeId) {
        self.target = Some(target);
        match &mut self.kind {
            ActionKind::Sequence { actions, .. } | ActionKind::Parallel { actions } => {
                for a in actions {
                    a.bind(target);
                }
            }
            ActionKind::Loop { action, .. } => action.bind(target),
            _ => {}
        }
    }

    /// Clears progress here and below. Nested actions go back to `Idle`.
    fn rewind(&mut self) {
        match &mut self.kind {
            ActionKind::Move(t) | ActionKind::Scale(t) | ActionKind::Jump { tween: t, .. } => {
                t.rewind();
            }
            ActionKind::Rotate(t) | ActionKind::Opacity(t) => t.rewind(),
            ActionKind::Delay { elapsed, .. } | ActionKind::Animate { elapsed, .. } => {
                *elapsed = 0.0;
            }
            ActionKind::Callback(_) => {}
            ActionKind::Sequence { actions, current } => {
                *current = 0;
                for a in actions {
                    a.rewind();
                    a.state = ActionState::Idle;
                }
            }
            ActionKind::Parallel { actions } => {
                for a in actions {
                    a.rewind();
                    a.state = ActionState::Idle;
                }
            }
            ActionKind::Loop {
                action, completed, ..
            } => {
                *completed = 0;
                action.rewind();
                action.state = ActionState::Idle;
            }
        }
    }

    /// Steps the action regardless of `Running`/`Paused`/`Idle`.
    ///
    /// Returns the unused part of `dt` once the action is done, `None` while
    /// it still has work left.
    fn advance(&mut self, dt: f64, tree: &mut SceneTree) -> Option<f64> {
        if self.is_done() {
            return Some(dt);
        }
        let Some(target) = self.target.filter(|&t| tree.is_alive(t)) else {
            self.state = ActionState::Done;
            return Some(dt);
        };

        let leftover = match &mut self.kind {
            ActionKind::Move(tween) => {
                let (p, leftover) = tween.step(dt);
                let current = tree.position(target).to_vec2();
                let track = tween.track(current);
                // Fold in whatever else moved the node since our last write.
                track.start += current - track.prev;
                let next = track.start + track.delta * p;
                tree.set_position(target, next.to_point());
                track.prev = next;
                leftover
            }
            ActionKind::Jump {
                tween,
                height,
                jumps,
            } => {
                let (p, leftover) = tween.step(dt);
                let current = tree.position(target).to_vec2();
                let track = tween.track(current);
                track.start += current - track.prev;
                let frac = libm::fmod(p * f64::from(*jumps), 1.0);
                let hop = *height * 4.0 * frac * (1.0 - frac);
                let next = track.start + track.delta * p - Vec2::new(0.0, hop);
                tree.set_position(target, next.to_point());
                track.prev = next;
                leftover
            }
            ActionKind::Scale(tween) => {
                let (p, leftover) = tween.step(dt);
                let track = tween.track(tree.scale(target));
                tree.set_scale(target, track.start + track.delta * p);
                leftover
            }
            ActionKind::Rotate(tween) => {
                let (p, leftover) = tween.step(dt);
                let track = tween.track(tree.rotation(target));
                tree.set_rotation(target, track.start + track.delta * p);
                leftover
            }
            ActionKind::Opacity(tween) => {
                let (p, leftover) = tween.step(dt);
                let track = tween.track(tree.opacity(target));
                tree.set_opacity(target, track.start + track.delta * p);
                leftover
            }
            ActionKind::Delay { duration, elapsed } => advance_clock(elapsed, *duration, dt).1,
            ActionKind::Animate {
                frames,
                interval,
                elapsed,
            } => {
                if frames.is_empty() {
                    Some(dt)
                } else {
                    let last = frames.len() - 1;
                    let total = *interval * frames.len() as f64;
                    let leftover = advance_clock(elapsed, total, dt).1;
                    let index = if leftover.is_some() || *interval <= 0.0 {
                        last
                    } else {
                        #[expect(
                            clippy::cast_possible_truncation,
                            reason = "elapsed < total, so the quotient is below frames.len()"
                        )]
                        let i = (*elapsed / *interval) as usize;
                        i.min(last)
                    };
                    tree.set_frame(target, Some(frames[index]));
                    leftover
                }
            }
            ActionKind::Callback(f) => {
                (f.0)(tree, target);
                Some(dt)
            }
            ActionKind::Sequence { actions, current } => {
                let mut dt = dt;
                loop {
                    let Some(child) = actions.get_mut(*current) else {
                        break Some(dt);
                    };
                    match child.advance(dt, tree) {
                        Some(rest) => {
                            *current += 1;
                            dt = rest;
                        }
                        None => break None,
                    }
                }
            }
            ActionKind::Parallel { actions } => {
                let mut pending = false;
                let mut leftover = dt;
                for child in actions.iter_mut().filter(|a| !a.is_done()) {
                    match child.advance(dt, tree) {
                        Some(rest) => leftover = leftover.min(rest),
                        None => pending = true,
                    }
                }
                (!pending).then_some(leftover)
            }
            ActionKind::Loop {
                action,
                times,
                completed,
            } => {
                let mut dt = dt;
                loop {
                    if let Repeat::Times(n) = *times {
                        if *completed >= n {
                            break Some(dt);
                        }
                    }
                    let Some(rest) = action.advance(dt, tree) else {
                        break None;
                    };
                    *completed = completed.saturating_add(1);
                    action.rewind();
                    action.state = ActionState::Idle;
                    let stalled = rest >= dt;
                    dt = rest;
                    // A child that takes no time runs once per update.
                    if stalled {
                        let exhausted = matches!(*times, Repeat::Times(n) if *completed >= n);
                        break exhausted.then_some(dt);
                    }
                }
            }
        };

        if leftover.is_some() {
            self.state = ActionState::Done;
        }
        leftover
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::Cell;

    use super::*;

    const EPS: f64 = 1e-9;

    fn setup() -> (SceneTree, NodeId) {
        let mut tree = SceneTree::new();
        let node = tree.create_node();
        (tree, node)
    }

    fn run(action: &mut Action, node: NodeId) {
        action.start_with_target(node).unwrap();
        action.start();
    }

    fn assert_near(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn move_by_half_steps() {
        let (mut tree, node) = setup();
        let mut action = Action::move_by(1.0, Vec2::new(100.0, 0.0));
        run(&mut action, node);

        assert!(!action.update(0.5, &mut tree));
        assert_near(tree.position(node), Point::new(50.0, 0.0));
        assert!(action.update(0.5, &mut tree));
        assert_near(tree.position(node), Point::new(100.0, 0.0));
        assert_eq!(action.state(), ActionState::Done);
    }

    #[test]
    fn move_to_captures_start_on_first_update() {
        let (mut tree, node) = setup();
        let mut action = Action::move_to(2.0, Point::new(10.0, 10.0));
        run(&mut action, node);
        tree.set_position(node, Point::new(0.0, 10.0));

        action.update(1.0, &mut tree);
        assert_near(tree.position(node), Point::new(5.0, 10.0));
        action.update(1.0, &mut tree);
        assert_near(tree.position(node), Point::new(10.0, 10.0));
    }

    #[test]
    fn concurrent_moves_compose() {
        let (mut tree, node) = setup();
        let mut a = Action::move_by(1.0, Vec2::new(10.0, 0.0));
        let mut b = Action::move_by(1.0, Vec2::new(0.0, 20.0));
        run(&mut a, node);
        run(&mut b, node);
        for _ in 0..4 {
            a.update(0.25, &mut tree);
            b.update(0.25, &mut tree);
        }
        assert_near(tree.position(node), Point::new(10.0, 20.0));
    }

    #[test]
    fn update_is_noop_unless_running() {
        let (mut tree, node) = setup();
        let mut action = Action::move_by(1.0, Vec2::new(10.0, 0.0));
        action.start_with_target(node).unwrap();
        action.update(0.5, &mut tree);
        assert_eq!(tree.position(node), Point::ORIGIN);

        action.start();
        action.update(0.25, &mut tree);
        action.pause();
        action.update(0.5, &mut tree);
        assert_near(tree.position(node), Point::new(2.5, 0.0));
        action.resume();
        action.update(0.25, &mut tree);
        assert_near(tree.position(node), Point::new(5.0, 0.0));

        action.stop();
        assert!(action.is_done());
        action.update(1.0, &mut tree);
        assert_near(tree.position(node), Point::new(5.0, 0.0));
    }

    #[test]
    fn binding_twice_is_rejected() {
        let (mut tree, node) = setup();
        let other = tree.create_node();
        let mut action = Action::sequence(vec![Action::delay(1.0)]);
        action.start_with_target(node).unwrap();
        assert_eq!(
            action.start_with_target(other),
            Err(ActionError::AlreadyBound { target: node })
        );
        assert_eq!(action.target(), Some(node));

        let mut copy = action.clone_unbound();
        assert_eq!(copy.target(), None);
        assert_eq!(copy.state(), ActionState::Idle);
        copy.start_with_target(other).unwrap();
    }

    #[test]
    fn nested_binding_is_detected() {
        let (_, node) = setup();
        let mut inner = Action::delay(1.0);
        inner.start_with_target(node).unwrap();
        let mut outer = Action::parallel(vec![Action::delay(1.0), inner]);
        assert_eq!(
            outer.start_with_target(node),
            Err(ActionError::AlreadyBound { target: node })
        );
        assert_eq!(outer.target(), None);
    }

    #[test]
    fn sequence_finishes_exactly_at_total_duration() {
        let (mut tree, node) = setup();
        let mut seq = Action::sequence(vec![
            Action::delay(0.3),
            Action::move_by(0.5, Vec2::new(10.0, 0.0)),
            Action::delay(0.2),
        ]);
        run(&mut seq, node);
        assert!((seq.duration() - 1.0).abs() < EPS);

        for _ in 0..9 {
            assert!(!seq.update(0.1, &mut tree));
        }
        assert!(seq.update(0.1, &mut tree));
        assert_near(tree.position(node), Point::new(10.0, 0.0));
    }

    #[test]
    fn sequence_carries_time_across_children() {
        let (mut tree, node) = setup();
        let mut seq = Action::sequence(vec![
            Action::move_by(0.25, Vec2::new(4.0, 0.0)),
            Action::move_by(1.0, Vec2::new(0.0, 8.0)),
        ]);
        run(&mut seq, node);
        // One large step finishes the first child and spends 0.25 s in the second.
        seq.update(0.5, &mut tree);
        assert_near(tree.position(node), Point::new(4.0, 2.0));
        assert!(!seq.update(0.74, &mut tree));
        assert!(seq.update(0.01, &mut tree));
        assert_near(tree.position(node), Point::new(4.0, 8.0));
    }

    #[test]
    fn parallel_waits_for_slowest_child() {
        let (mut tree, node) = setup();
        let mut par = Action::parallel(vec![
            Action::move_by(0.5, Vec2::new(10.0, 0.0)),
            Action::rotate_by(1.0, 90.0),
        ]);
        run(&mut par, node);
        assert!(!par.update(0.5, &mut tree));
        assert_near(tree.position(node), Point::new(10.0, 0.0));
        assert!((tree.rotation(node) - 45.0).abs() < EPS);
        assert!(par.update(0.5, &mut tree));
        assert!((tree.rotation(node) - 90.0).abs() < EPS);
    }

    #[test]
    fn parallel_children_finishing_together_all_apply() {
        let (mut tree, node) = setup();
        let mut par = Action::parallel(vec![
            Action::move_by(1.0, Vec2::new(10.0, 0.0)),
            Action::rotate_by(1.0, 90.0),
            Action::opacity_by(1.0, -0.5),
        ]);
        run(&mut par, node);
        assert!(!par.update(0.5, &mut tree));
        assert!(par.update(0.5, &mut tree));
        assert_near(tree.position(node), Point::new(10.0, 0.0));
        assert!((tree.rotation(node) - 90.0).abs() < EPS);
        assert!((tree.opacity(node) - 0.5).abs() < EPS);

        // Same when a single update overshoots every child.
        let (mut tree, node) = setup();
        let mut par = Action::parallel(vec![
            Action::scale_by(0.5, Vec2::new(1.0, 1.0)),
            Action::move_by(0.5, Vec2::new(0.0, 4.0)),
        ]);
        run(&mut par, node);
        assert!(par.update(2.0, &mut tree));
        assert!((tree.scale(node).x - 2.0).abs() < EPS);
        assert_near(tree.position(node), Point::new(0.0, 4.0));
    }

    #[test]
    fn loop_sees_child_finish_exactly_n_times() {
        let (mut tree, node) = setup();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let mut looped = Action::repeat(
            Action::sequence(vec![
                Action::delay(0.5),
                Action::callback(move |_, _| seen.set(seen.get() + 1)),
            ]),
            3,
        );
        run(&mut looped, node);

        let mut ticks = 0;
        while !looped.update(0.1, &mut tree) {
            ticks += 1;
            assert!(ticks < 100, "loop never finished");
        }
        assert_eq!(count.get(), 3);
        assert_eq!(ticks, 14);

        // No further runs once done.
        looped.update(1.0, &mut tree);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn forever_loop_never_finishes() {
        let (mut tree, node) = setup();
        let mut looped = Action::looped(Action::rotate_by(0.1, 10.0), Repeat::from_count(-1));
        run(&mut looped, node);
        for _ in 0..1000 {
            assert!(!looped.update(0.07, &mut tree));
        }
        assert_eq!(looped.duration(), f64::INFINITY);
    }

    #[test]
    fn zero_time_child_runs_once_per_update_in_forever_loop() {
        let (mut tree, node) = setup();
        let count = Rc::new(Cell::new(0_u32));
        let seen = count.clone();
        let mut looped =
            Action::repeat_forever(Action::callback(move |_, _| seen.set(seen.get() + 1)));
        run(&mut looped, node);
        for _ in 0..5 {
            looped.update(0.016, &mut tree);
        }
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn reverse_nets_zero_displacement() {
        let (mut tree, node) = setup();
        let forward = Action::sequence(vec![
            Action::move_by(1.0, Vec2::new(10.0, 0.0)),
            Action::jump_by(0.5, Vec2::new(0.0, 5.0), 3.0, 2),
        ]);
        let backward = forward.reverse().unwrap();
        let mut both = Action::sequence(vec![forward, backward]);
        run(&mut both, node);
        while !both.update(0.05, &mut tree) {}
        assert_near(tree.position(node), Point::ORIGIN);
    }

    #[test]
    fn absolute_tweens_do_not_reverse() {
        let seq = Action::sequence(vec![Action::delay(1.0), Action::fade_out(1.0)]);
        assert_eq!(seq.reverse().unwrap_err(), ActionError::Irreversible);
        assert!(Action::scale_by(1.0, Vec2::new(1.0, 1.0)).reverse().is_ok());
    }

    #[test]
    fn animate_steps_through_frames() {
        let (mut tree, node) = setup();
        let frames = vec![FrameId(1), FrameId(2), FrameId(3)];
        let mut anim = Action::animate(frames, 0.1);
        run(&mut anim, node);

        anim.update(0.0, &mut tree);
        assert_eq!(tree.frame(node), Some(FrameId(1)));
        anim.update(0.15, &mut tree);
        assert_eq!(tree.frame(node), Some(FrameId(2)));
        anim.update(0.1, &mut tree);
        assert_eq!(tree.frame(node), Some(FrameId(3)));
        assert!(anim.update(0.05, &mut tree));
        assert_eq!(tree.frame(node), Some(FrameId(3)));

        let mut back = Action::animate(vec![FrameId(1), FrameId(2)], 0.1)
            .reverse()
            .unwrap();
        run(&mut back, node);
        back.update(0.0, &mut tree);
        assert_eq!(tree.frame(node), Some(FrameId(2)));
    }

    #[test]
    fn eased_tween_hits_endpoints() {
        let (mut tree, node) = setup();
        let mut action = Action::opacity_by(1.0, -0.5).with_ease(Ease::QuadIn);
        run(&mut action, node);
        action.update(0.5, &mut tree);
        assert!((tree.opacity(node) - 0.875).abs() < EPS);
        action.update(0.5, &mut tree);
        assert!((tree.opacity(node) - 0.5).abs() < EPS);
    }

    #[test]
    fn dead_target_finishes_action() {
        let (mut tree, node) = setup();
        let mut action = Action::move_by(1.0, Vec2::new(1.0, 0.0));
        run(&mut action, node);
        tree.destroy(node);
        assert!(action.update(0.1, &mut tree));
    }

    #[test]
    fn reset_rewinds_but_keeps_binding() {
        let (mut tree, node) = setup();
        let mut action = Action::scale_to(1.0, Vec2::new(2.0, 2.0)).with_name("grow");
        run(&mut action, node);
        action.update(1.0, &mut tree);
        assert!(action.is_done());

        action.reset();
        assert_eq!(action.state(), ActionState::Idle);
        assert_eq!(action.target(), Some(node));
        assert_eq!(action.name(), Some("grow"));
        tree.set_scale(node, Vec2::new(1.0, 1.0));
        action.start();
        action.update(0.5, &mut tree);
        assert!((tree.scale(node).x - 1.5).abs() < EPS);
    }
}
