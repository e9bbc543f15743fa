// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time bookkeeping shared by all timed actions.

use core::ops::{Add, Mul, Neg, Sub};

use super::ease::Ease;
use crate::error::ActionError;

/// Absorbs accumulated float error when comparing elapsed time to a duration.
///
/// Ten ticks of `0.1` sum to slightly less than `1.0`; without this, such a
/// tween would finish one tick late.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

/// Adds `dt` to `elapsed` and reports progress.
///
/// Returns the linear progress in `[0, 1]` and, once `duration` is reached,
/// the part of `dt` that was not needed. A zero or negative duration
/// completes immediately without consuming any time.
pub(crate) fn advance_clock(elapsed: &mut f64, duration: f64, dt: f64) -> (f64, Option<f64>) {
    if duration <= 0.0 {
        return (1.0, Some(dt));
    }
    *elapsed += dt;
    if *elapsed + TIME_EPSILON >= duration {
        let leftover = (*elapsed - duration).max(0.0);
        *elapsed = duration;
        (1.0, Some(leftover))
    } else {
        ((*elapsed / duration).clamp(0.0, 1.0), None)
    }
}

/// Values a tween can interpolate.
pub(crate) trait Lerp:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> + Neg<Output = Self>
{
}

impl<T> Lerp for T where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T> + Neg<Output = T>
{
}

/// Relative or absolute end value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Goal<T> {
    By(T),
    To(T),
}

/// Values captured on a tween's first step.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Track<T> {
    pub(crate) start: T,
    pub(crate) delta: T,
    /// Last value written, for drift correction.
    pub(crate) prev: T,
}

#[derive(Clone, Debug)]
pub(crate) struct Tween<T> {
    pub(crate) duration: f64,
    pub(crate) elapsed: f64,
    pub(crate) ease: Ease,
    pub(crate) goal: Goal<T>,
    track: Option<Track<T>>,
}

impl<T: Lerp> Tween<T> {
    pub(crate) fn new(duration: f64, goal: Goal<T>) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease: Ease::Linear,
            goal,
            track: None,
        }
    }

    /// Forgets progress and captured values.
    pub(crate) fn rewind(&mut self) {
        self.elapsed = 0.0;
        self.track = None;
    }

    /// Copies the parameters into a fresh tween.
    pub(crate) fn fresh(&self) -> Self {
        let mut t = Self::new(self.duration, self.goal);
        t.ease = self.ease;
        t
    }

    /// A relative tween with the opposite delta. Absolute goals have no
    /// reverse, since the start is unknown until the tween runs.
    pub(crate) fn reversed(&self) -> Result<Self, ActionError> {
        match self.goal {
            Goal::By(delta) => {
                let mut t = Self::new(self.duration, Goal::By(-delta));
                t.ease = self.ease;
                Ok(t)
            }
            Goal::To(_) => Err(ActionError::Irreversible),
        }
    }

    /// Advances time and returns eased progress plus leftover time.
    pub(crate) fn step(&mut self, dt: f64) -> (f64, Option<f64>) {
        let (progress, leftover) = advance_clock(&mut self.elapsed, self.duration, dt);
        (self.ease.apply(progress), leftover)
    }

    /// Returns the captured values, capturing from `current` on first use.
    pub(crate) fn track(&mut self, current: T) -> &mut Track<T> {
        let goal = self.goal;
        self.track.get_or_insert_with(|| {
            let delta = match goal {
                Goal::By(delta) => delta,
                Goal::To(end) => end - current,
            };
            Track {
                start: current,
                delta,
                prev: current,
            }
        })
    }
}
