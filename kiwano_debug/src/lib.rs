// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for kiwano scene
//! diagnostics.
//!
//! This crate provides [`TraceSink`](kiwano_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//! - [`FanOut`] — forwards every event to two sinks.

use kiwano_core::trace::{
    ActionFinishedEvent, NodesDestroyedEvent, TaskFiredEvent, TickBeginEvent, TickEndEvent,
    TraceSink, TransformPassEvent,
};

pub mod chrome;
pub mod pretty;
pub mod recorder;

/// Forwards every event to both inner sinks, first `a`, then `b`.
#[derive(Debug)]
pub struct FanOut<A, B> {
    /// First sink.
    pub a: A,
    /// Second sink.
    pub b: B,
}

impl<A: TraceSink, B: TraceSink> TraceSink for FanOut<A, B> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.a.on_tick_begin(e);
        self.b.on_tick_begin(e);
    }

    fn on_tick_end(&mut self, e: &TickEndEvent) {
        self.a.on_tick_end(e);
        self.b.on_tick_end(e);
    }

    fn on_action_finished(&mut self, e: &ActionFinishedEvent) {
        self.a.on_action_finished(e);
        self.b.on_action_finished(e);
    }

    fn on_task_fired(&mut self, e: &TaskFiredEvent) {
        self.a.on_task_fired(e);
        self.b.on_task_fired(e);
    }

    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        self.a.on_nodes_destroyed(e);
        self.b.on_nodes_destroyed(e);
    }

    fn on_transform_pass(&mut self, e: &TransformPassEvent) {
        self.a.on_transform_pass(e);
        self.b.on_transform_pass(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecordedEvent, RecorderSink, decode};

    #[test]
    fn fan_out_reaches_both_sinks() {
        let mut sink = FanOut {
            a: RecorderSink::new(),
            b: RecorderSink::new(),
        };
        sink.on_task_fired(&TaskFiredEvent {
            frame_index: 3,
            task_index: 1,
            run: 2,
        });
        for rec in [&sink.a, &sink.b] {
            let events: Vec<_> = decode(rec.as_bytes()).collect();
            assert_eq!(events.len(), 1);
            assert!(matches!(events[0], RecordedEvent::TaskFired(e) if e.run == 2));
        }
    }
}
