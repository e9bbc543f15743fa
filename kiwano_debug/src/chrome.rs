// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

const TID_TICK: u32 = 0;
const TID_ACTIONS: u32 = 1;
const TID_TASKS: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Each tick becomes a `Tick` duration slice spanning its scene time, so
/// slice widths are the scaled frame deltas. Other events are instants
/// stamped with the scene time of the tick they happened in.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut now_us = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::TickBegin(e) => {
                now_us = seconds_to_us(e.time);
                events.push(json!({
                    "ph": "B",
                    "name": "Tick",
                    "cat": "Scene",
                    "ts": now_us,
                    "pid": 0,
                    "tid": TID_TICK,
                    "args": {
                        "frame_index": e.frame_index,
                        "dt_us": seconds_to_us(e.dt),
                    }
                }));
            }
            RecordedEvent::TickEnd(e) => {
                now_us = seconds_to_us(e.time);
                events.push(json!({
                    "ph": "E",
                    "name": "Tick",
                    "cat": "Scene",
                    "ts": now_us,
                    "pid": 0,
                    "tid": TID_TICK,
                    "args": {
                        "frame_index": e.frame_index,
                        "actions_active": e.actions_active,
                        "tasks_active": e.tasks_active,
                        "actions_finished": e.actions_finished,
                        "tasks_fired": e.tasks_fired,
                    }
                }));
                events.push(json!({
                    "ph": "C",
                    "name": "Scheduled",
                    "cat": "Scene",
                    "ts": now_us,
                    "pid": 0,
                    "args": {
                        "actions": e.actions_active,
                        "tasks": e.tasks_active,
                    }
                }));
            }
            RecordedEvent::ActionFinished(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ActionFinished",
                    "cat": "Actions",
                    "ts": now_us,
                    "pid": 0,
                    "tid": TID_ACTIONS,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "action_index": e.action_index,
                        "node_index": e.node_index,
                    }
                }));
            }
            RecordedEvent::TaskFired(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TaskFired",
                    "cat": "Tasks",
                    "ts": now_us,
                    "pid": 0,
                    "tid": TID_TASKS,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "task_index": e.task_index,
                        "run": e.run,
                    }
                }));
            }
            RecordedEvent::NodesDestroyed(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "NodesDestroyed",
                    "cat": "Tree",
                    "ts": now_us,
                    "pid": 0,
                    "tid": TID_TICK,
                    "s": "p",
                    "args": {
                        "frame_index": e.frame_index,
                        "root_index": e.root_index,
                        "nodes": e.nodes,
                        "actions_removed": e.actions_removed,
                        "tasks_removed": e.tasks_removed,
                    }
                }));
            }
            RecordedEvent::TransformPass(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TransformPass",
                    "cat": "Tree",
                    "ts": now_us,
                    "pid": 0,
                    "tid": TID_TICK,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "recomputed": e.recomputed,
                        "resorted": e.resorted,
                        "drawn": e.drawn,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn seconds_to_us(seconds: f64) -> f64 {
    seconds * 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use kiwano_core::trace::{
        ActionFinishedEvent, TickBeginEvent, TickEndEvent, TraceSink, TransformPassEvent,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_tick_begin(&TickBeginEvent {
            frame_index: 0,
            time: 1.0,
            dt: 0.5,
        });
        rec.on_action_finished(&ActionFinishedEvent {
            frame_index: 0,
            action_index: 3,
            node_index: None,
        });
        rec.on_tick_end(&TickEndEvent {
            frame_index: 0,
            time: 1.5,
            actions_active: 0,
            tasks_active: 0,
            actions_finished: 1,
            tasks_fired: 0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        // The tick opens a slice at its start time.
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Tick");
        assert_eq!(parsed[0]["ts"], 1_000_000.0);

        // The action finishing inside it is an instant at the same time.
        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["ts"], 1_000_000.0);
        assert_eq!(parsed[1]["args"]["node_index"], Value::Null);

        // The tick closes at its end time, followed by a counter sample.
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 1_500_000.0);
        assert_eq!(parsed[3]["ph"], "C");
    }

    #[test]
    fn pass_after_tick_uses_end_time() {
        let mut rec = RecorderSink::new();
        rec.on_tick_end(&TickEndEvent {
            frame_index: 4,
            time: 0.25,
            actions_active: 1,
            tasks_active: 0,
            actions_finished: 0,
            tasks_fired: 0,
        });
        rec.on_transform_pass(&TransformPassEvent {
            frame_index: 5,
            recomputed: 2,
            resorted: 0,
            drawn: 2,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        let pass = parsed.last().unwrap();
        assert_eq!(pass["name"], "TransformPass");
        assert_eq!(pass["ts"], 250_000.0);
        assert_eq!(pass["args"]["recomputed"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
