// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained 2D scene graph with lazy transforms and a tick-driven action
//! scheduler.
//!
//! `kiwano_core` stores a tree of nodes in struct-of-arrays form behind
//! generational handles, recomputes world matrices lazily, and animates node
//! properties with composable actions and periodic tasks. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! A host drives one [`Scene`](scene::Scene) per frame:
//!
//! ```text
//!   host dt
//!       │
//!       ▼
//!   Scene::tick ──► TaskScheduler ──► ActionScheduler ──► update hooks
//!                                                             │
//!                 ┌───────────────────────────────────────────┘
//!                 ▼
//!   Scene::evaluate ──► FrameChanges (draw order, matrices) ──► renderer
//! ```
//!
//! **[`node`]** — Struct-of-arrays node tree with generational handles.
//! Local properties (transform, z-order, visibility, opacity) are set by the
//! caller; world matrices are computed by evaluation, display opacity
//! eagerly.
//!
//! **[`dirty`]** — Per-node dirty flags. TRANSFORM is pushed down to children
//! as matrices are recomputed; SORT marks a child list for stable z-order
//! re-sorting.
//!
//! **[`transform`]** — Local 2D transform with a normalized pivot.
//!
//! **[`action`]** — Time-based actions (tweens, delays, frame animation,
//! callbacks) and their combinators (sequence, parallel, loop), plus the
//! [`Ease`](action::Ease) curves.
//!
//! **[`task`]** — Periodic callbacks with an optional repeat count.
//!
//! **[`scheduler`]** — [`ActionScheduler`](scheduler::ActionScheduler) and
//! [`TaskScheduler`](scheduler::TaskScheduler), built on the
//! removal-safe [`list`] of scheduled entries.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! tick instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod action;
pub mod dirty;
pub mod error;
pub mod list;
pub mod node;
pub mod scene;
pub mod scheduler;
pub mod task;
pub mod trace;
pub mod transform;
