// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Scene times are stored as the raw bits of the `f64`, so decoding is exact.

use kiwano_core::trace::{
    ActionFinishedEvent, NodesDestroyedEvent, TaskFiredEvent, TickBeginEvent, TickEndEvent,
    TraceSink, TransformPassEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK_BEGIN: u8 = 1;
const TAG_TICK_END: u8 = 2;
const TAG_ACTION_FINISHED: u8 = 3;
const TAG_TASK_FIRED: u8 = 4;
const TAG_NODES_DESTROYED: u8 = 5;
const TAG_TRANSFORM_PASS: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_option_u32(&mut self, v: Option<u32>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u32(val);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.write_u8(TAG_TICK_BEGIN);
        self.write_u64(e.frame_index);
        self.write_f64(e.time);
        self.write_f64(e.dt);
    }

    fn on_tick_end(&mut self, e: &TickEndEvent) {
        self.write_u8(TAG_TICK_END);
        self.write_u64(e.frame_index);
        self.write_f64(e.time);
        self.write_u32(e.actions_active);
        self.write_u32(e.tasks_active);
        self.write_u32(e.actions_finished);
        self.write_u32(e.tasks_fired);
    }

    fn on_action_finished(&mut self, e: &ActionFinishedEvent) {
        self.write_u8(TAG_ACTION_FINISHED);
        self.write_u64(e.frame_index);
        self.write_u32(e.action_index);
        self.write_option_u32(e.node_index);
    }

    fn on_task_fired(&mut self, e: &TaskFiredEvent) {
        self.write_u8(TAG_TASK_FIRED);
        self.write_u64(e.frame_index);
        self.write_u32(e.task_index);
        self.write_u32(e.run);
    }

    fn on_nodes_destroyed(&mut self, e: &NodesDestroyedEvent) {
        self.write_u8(TAG_NODES_DESTROYED);
        self.write_u64(e.frame_index);
        self.write_u32(e.root_index);
        self.write_u32(e.nodes);
        self.write_u32(e.actions_removed);
        self.write_u32(e.tasks_removed);
    }

    fn on_transform_pass(&mut self, e: &TransformPassEvent) {
        self.write_u8(TAG_TRANSFORM_PASS);
        self.write_u64(e.frame_index);
        self.write_u32(e.recomputed);
        self.write_u32(e.resorted);
        self.write_u32(e.drawn);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`TickBeginEvent`].
    TickBegin(TickBeginEvent),
    /// A [`TickEndEvent`].
    TickEnd(TickEndEvent),
    /// An [`ActionFinishedEvent`].
    ActionFinished(ActionFinishedEvent),
    /// A [`TaskFiredEvent`].
    TaskFired(TaskFiredEvent),
    /// A [`NodesDestroyedEvent`].
    NodesDestroyed(NodesDestroyedEvent),
    /// A [`TransformPassEvent`].
    TransformPass(TransformPassEvent),
}

impl RecordedEvent {
    /// Returns the tick counter the event was emitted in.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::TickBegin(e) => e.frame_index,
            Self::TickEnd(e) => e.frame_index,
            Self::ActionFinished(e) => e.frame_index,
            Self::TaskFired(e) => e.frame_index,
            Self::NodesDestroyed(e) => e.frame_index,
            Self::TransformPass(e) => e.frame_index,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take::<1>()?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_option_u32(&mut self) -> Option<Option<u32>> {
        let present = self.read_u8()?;
        let val = self.read_u32()?;
        Some((present != 0).then_some(val))
    }

    fn decode_tick_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickBegin(TickBeginEvent {
            frame_index: self.read_u64()?,
            time: self.read_f64()?,
            dt: self.read_f64()?,
        }))
    }

    fn decode_tick_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickEnd(TickEndEvent {
            frame_index: self.read_u64()?,
            time: self.read_f64()?,
            actions_active: self.read_u32()?,
            tasks_active: self.read_u32()?,
            actions_finished: self.read_u32()?,
            tasks_fired: self.read_u32()?,
        }))
    }

    fn decode_action_finished(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ActionFinished(ActionFinishedEvent {
            frame_index: self.read_u64()?,
            action_index: self.read_u32()?,
            node_index: self.read_option_u32()?,
        }))
    }

    fn decode_task_fired(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TaskFired(TaskFiredEvent {
            frame_index: self.read_u64()?,
            task_index: self.read_u32()?,
            run: self.read_u32()?,
        }))
    }

    fn decode_nodes_destroyed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodesDestroyed(NodesDestroyedEvent {
            frame_index: self.read_u64()?,
            root_index: self.read_u32()?,
            nodes: self.read_u32()?,
            actions_removed: self.read_u32()?,
            tasks_removed: self.read_u32()?,
        }))
    }

    fn decode_transform_pass(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransformPass(TransformPassEvent {
            frame_index: self.read_u64()?,
            recomputed: self.read_u32()?,
            resorted: self.read_u32()?,
            drawn: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_TICK_BEGIN => self.decode_tick_begin(),
            TAG_TICK_END => self.decode_tick_end(),
            TAG_ACTION_FINISHED => self.decode_action_finished(),
            TAG_TASK_FIRED => self.decode_task_fired(),
            TAG_NODES_DESTROYED => self.decode_nodes_destroyed(),
            TAG_TRANSFORM_PASS => self.decode_transform_pass(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> (TickBeginEvent, TickEndEvent) {
        (
            TickBeginEvent {
                frame_index: 7,
                time: 0.1,
                dt: 1.0 / 60.0,
            },
            TickEndEvent {
                frame_index: 7,
                time: 0.1 + 1.0 / 60.0,
                actions_active: 3,
                tasks_active: 1,
                actions_finished: 2,
                tasks_fired: 1,
            },
        )
    }

    #[test]
    fn tick_times_are_bit_exact() {
        let (begin, end) = sample_tick();
        let mut rec = RecorderSink::new();
        rec.on_tick_begin(&begin);
        rec.on_tick_end(&end);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [RecordedEvent::TickBegin(begin), RecordedEvent::TickEnd(end)]
        );
    }

    #[test]
    fn unbound_action_keeps_missing_node() {
        let mut rec = RecorderSink::new();
        rec.on_action_finished(&ActionFinishedEvent {
            frame_index: 2,
            action_index: 0,
            node_index: None,
        });
        rec.on_action_finished(&ActionFinishedEvent {
            frame_index: 2,
            action_index: 1,
            node_index: Some(0),
        });

        let nodes: Vec<_> = decode(rec.as_bytes())
            .map(|e| match e {
                RecordedEvent::ActionFinished(e) => e.node_index,
                other => panic!("expected ActionFinished, got {other:?}"),
            })
            .collect();
        assert_eq!(nodes, [None, Some(0)]);
    }

    #[test]
    fn mixed_stream_preserves_order() {
        let (begin, end) = sample_tick();
        let mut rec = RecorderSink::new();
        rec.on_tick_begin(&begin);
        rec.on_task_fired(&TaskFiredEvent {
            frame_index: 7,
            task_index: 4,
            run: 9,
        });
        rec.on_nodes_destroyed(&NodesDestroyedEvent {
            frame_index: 7,
            root_index: 12,
            nodes: 3,
            actions_removed: 2,
            tasks_removed: 0,
        });
        rec.on_tick_end(&end);
        rec.on_transform_pass(&TransformPassEvent {
            frame_index: 8,
            recomputed: 5,
            resorted: 1,
            drawn: 6,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], RecordedEvent::TickBegin(_)));
        assert!(matches!(events[1], RecordedEvent::TaskFired(e) if e.run == 9));
        assert!(matches!(events[2], RecordedEvent::NodesDestroyed(e) if e.nodes == 3));
        assert!(matches!(events[3], RecordedEvent::TickEnd(_)));
        assert_eq!(events[4].frame_index(), 8);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let (begin, _) = sample_tick();
        let mut rec = RecorderSink::new();
        rec.on_tick_begin(&begin);
        rec.on_tick_begin(&begin);
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events, [RecordedEvent::TickBegin(begin)]);
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let events: Vec<_> = decode(&[0xFF, 1, 2, 3]).collect();
        assert!(events.is_empty());
    }
}
