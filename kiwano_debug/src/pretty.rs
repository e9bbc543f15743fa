// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Scene times
//! are printed in milliseconds.

use std::io::Write;

use kiwano_core::trace::{
    ActionFinishedEvent, NodesDestroyedEvent, TaskFiredEvent, TickBeginEvent, TickEndEvent,
    TraceSink, TransformPassEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    quiet_passes: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("quiet_passes", &self.quiet_passes)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            quiet_passes: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            quiet_passes: false,
        }
    }

    /// Skips transform passes that recomputed nothing.
    #[must_use]
    pub fn quiet_passes(mut self, quiet: bool) -> Self {
        self.quiet_passes = quiet;
        self
    }

    /// Returns the destination, consuming the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(seconds: f64) -> f64 {
    seconds * 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[tick:begin] frame={} time={:.3}ms dt={:.3}ms",
            e.frame_index,
            ms(e.time),
            ms(e.dt),
        );
    }

    fn on_tick_end(&mut self, e: &TickEndEvent) {
        let _ = writeln!(
            self.writer,
            "[tick:end] frame={} time={:.3}ms actions={} (-{}) tasks={} fired={}",
            e.frame_index,
            ms(e.time),
            e.actions_active,
            e.actions_finished,
            e.tasks_active,
            e.tasks_fired,
        );
    }

    fn on_action_finished(&mut self, e: &ActionFinishedEvent) {
        let node = match e.node_index {
            Some(idx) => format!("#{idx}"),
            None => "-".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[action:done] frame={} slot={} node={node}",
            e.frame_index, e.action_index,
        );
    }

    fn on_task_fired(&mut self, e: &TaskFiredEvent) {
        let _ = writeln!(
            self.writer,
            "[task] frame={} slot={} run={}",
            e.frame_index, e.task_index, e.run,
        );
    }

    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        let _ = writeln!(
            self.writer,
            "[destroy] frame={} root=#{} nodes={} actions={} tasks={}",
            e.frame_index, e.root_index, e.nodes, e.actions_removed, e.tasks_removed,
        );
    }

    fn on_transform_pass(&mut self, e: &TransformPassEvent) {
        if self.quiet_passes && e.recomputed == 0 && e.resorted == 0 {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[transform] frame={} recomputed={} resorted={} drawn={}",
            e.frame_index, e.recomputed, e.resorted, e.drawn,
        );
    }
}
