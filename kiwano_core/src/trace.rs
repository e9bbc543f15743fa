// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the scene tick.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`Scene`](crate::scene::Scene) calls while ticking and evaluating. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Times are scene time in seconds, i.e. the sum of scaled deltas fed to
//! [`Scene::tick`](crate::scene::Scene::tick). The core never reads a clock.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of a scene tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickBeginEvent {
    /// Monotonic tick counter.
    pub frame_index: u64,
    /// Scene time before this tick.
    pub time: f64,
    /// Scaled and clamped delta for this tick.
    pub dt: f64,
}

/// Emitted at the end of a scene tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickEndEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Scene time after this tick.
    pub time: f64,
    /// Actions still scheduled.
    pub actions_active: u32,
    /// Tasks still scheduled.
    pub tasks_active: u32,
    /// Actions that finished and were unscheduled this tick.
    pub actions_finished: u32,
    /// Task callbacks invoked this tick.
    pub tasks_fired: u32,
}

/// Emitted when a scheduled action finishes and is unscheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionFinishedEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Schedule slot of the action.
    pub action_index: u32,
    /// Slot index of the target node, if the action was bound.
    pub node_index: Option<u32>,
}

/// Emitted each time a task callback runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskFiredEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Schedule slot of the task.
    pub task_index: u32,
    /// 1-based run count.
    pub run: u32,
}

/// Emitted when a subtree is destroyed through the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodesDestroyedEvent {
    /// Tick counter at the time of destruction.
    pub frame_index: u64,
    /// Slot index of the subtree root.
    pub root_index: u32,
    /// Number of nodes freed.
    pub nodes: u32,
    /// Actions purged with the subtree.
    pub actions_removed: u32,
    /// Tasks purged with the subtree.
    pub tasks_removed: u32,
}

/// Emitted after a transform pass over the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformPassEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Nodes whose matrices were recomputed.
    pub recomputed: u32,
    /// Child lists re-sorted.
    pub resorted: u32,
    /// Nodes in the draw list.
    pub drawn: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the scene.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of a tick.
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        _ = e;
    }

    /// Called at the end of a tick.
    fn on_tick_end(&mut self, e: &TickEndEvent) {
        _ = e;
    }

    /// Called when an action finishes.
    fn on_action_finished(&mut self, e: &ActionFinishedEvent) {
        _ = e;
    }

    /// Called when a task fires.
    fn on_task_fired(&mut self, e: &TaskFiredEvent) {
        _ = e;
    }

    /// Called when a subtree is destroyed.
    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        _ = e;
    }

    /// Called after a transform pass.
    fn on_transform_pass(&mut self, e: &TransformPassEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident, $event:ty, $method:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    dispatch!(
        /// Emits a [`TickBeginEvent`].
        tick_begin, TickBeginEvent, on_tick_begin
    );
    dispatch!(
        /// Emits a [`TickEndEvent`].
        tick_end, TickEndEvent, on_tick_end
    );
    dispatch!(
        /// Emits an [`ActionFinishedEvent`].
        action_finished, ActionFinishedEvent, on_action_finished
    );
    dispatch!(
        /// Emits a [`TaskFiredEvent`].
        task_fired, TaskFiredEvent, on_task_fired
    );
    dispatch!(
        /// Emits a [`NodesDestroyedEvent`].
        nodes_destroyed, NodesDestroyedEvent, on_nodes_destroyed
    );
    dispatch!(
        /// Emits a [`TransformPassEvent`].
        transform_pass, TransformPassEvent, on_transform_pass
    );
}

/// Saturating `usize` to `u32` conversion for event counters.
pub(crate) fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> TickBeginEvent {
        TickBeginEvent {
            frame_index: 42,
            time: 0.7,
            dt: 1.0 / 60.0,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_tick_begin(&sample_begin());
        sink.on_tick_end(&TickEndEvent {
            frame_index: 42,
            time: 0.7,
            actions_active: 0,
            tasks_active: 0,
            actions_finished: 0,
            tasks_fired: 0,
        });
        sink.on_transform_pass(&TransformPassEvent {
            frame_index: 42,
            recomputed: 3,
            resorted: 1,
            drawn: 3,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.tick_begin(&sample_begin());
        tracer.task_fired(&TaskFiredEvent {
            frame_index: 0,
            task_index: 0,
            run: 1,
        });
    }

    #[test]
    fn count_saturates() {
        assert_eq!(count(7), 7);
        assert_eq!(count(usize::MAX), u32::MAX);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            ticks: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_tick_begin(&mut self, e: &TickBeginEvent) {
                self.ticks.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { ticks: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.tick_begin(&sample_begin());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.ticks, &[42]);
    }
}
