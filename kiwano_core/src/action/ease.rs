// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for tween actions.
//!
//! Every curve maps progress in `[0, 1]` to eased progress with `f(0) = 0`
//! and `f(1) = 1`. Inputs outside the unit interval are clamped first.
//! `Back` and `Elastic` overshoot in between; all others stay in `[0, 1]`.

use core::f64::consts::PI;

/// An easing curve.
#[derive(Clone, Copy, Debug, Default)]
pub enum Ease {
    /// Constant speed.
    #[default]
    Linear,
    /// `t^rate`.
    In(f64),
    /// `1 - (1 - t)^rate`.
    Out(f64),
    /// `In(rate)` for the first half, `Out(rate)` for the second.
    InOut(f64),
    /// Quadratic acceleration.
    QuadIn,
    /// Quadratic deceleration.
    QuadOut,
    /// Quadratic in, then out.
    QuadInOut,
    /// Cubic acceleration.
    CubicIn,
    /// Cubic deceleration.
    CubicOut,
    /// Cubic in, then out.
    CubicInOut,
    /// Quartic acceleration.
    QuartIn,
    /// Quartic deceleration.
    QuartOut,
    /// Quartic in, then out.
    QuartInOut,
    /// Quintic acceleration.
    QuintIn,
    /// Quintic deceleration.
    QuintOut,
    /// Quintic in, then out.
    QuintInOut,
    /// Sine acceleration.
    SineIn,
    /// Sine deceleration.
    SineOut,
    /// Sine in, then out.
    SineInOut,
    /// Exponential acceleration.
    ExpoIn,
    /// Exponential deceleration.
    ExpoOut,
    /// Exponential in, then out.
    ExpoInOut,
    /// Circular acceleration.
    CircIn,
    /// Circular deceleration.
    CircOut,
    /// Circular in, then out.
    CircInOut,
    /// Pulls back before accelerating.
    BackIn,
    /// Overshoots, then settles.
    BackOut,
    /// Pulls back, overshoots, settles.
    BackInOut,
    /// Spring-like wind-up.
    ElasticIn,
    /// Spring-like settle.
    ElasticOut,
    /// Spring-like wind-up and settle.
    ElasticInOut,
    /// Bouncing start.
    BounceIn,
    /// Bouncing stop.
    BounceOut,
    /// Bouncing start and stop.
    BounceInOut,
    /// A user-supplied curve; should map 0 to 0 and 1 to 1.
    Custom(fn(f64) -> f64),
}

const BACK_C1: f64 = 1.701_58;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f64 = (2.0 * PI) / 4.5;

impl Ease {
    /// Applies the curve to progress `t`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::In(rate) => libm::pow(t, rate),
            Self::Out(rate) => 1.0 - libm::pow(1.0 - t, rate),
            Self::InOut(rate) => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * libm::pow(t, rate)
                } else {
                    1.0 - 0.5 * libm::pow(2.0 - t, rate)
                }
            }
            Self::QuadIn => t * t,
            Self::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::QuadInOut => in_out_power(t, 2),
            Self::CubicIn => t * t * t,
            Self::CubicOut => 1.0 - powi(1.0 - t, 3),
            Self::CubicInOut => in_out_power(t, 3),
            Self::QuartIn => powi(t, 4),
            Self::QuartOut => 1.0 - powi(1.0 - t, 4),
            Self::QuartInOut => in_out_power(t, 4),
            Self::QuintIn => powi(t, 5),
            Self::QuintOut => 1.0 - powi(1.0 - t, 5),
            Self::QuintInOut => in_out_power(t, 5),
            Self::SineIn => 1.0 - libm::cos(t * PI / 2.0),
            Self::SineOut => libm::sin(t * PI / 2.0),
            Self::SineInOut => -(libm::cos(PI * t) - 1.0) / 2.0,
            Self::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    libm::pow(2.0, 10.0 * t - 10.0)
                }
            }
            Self::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - libm::pow(2.0, -10.0 * t)
                }
            }
            Self::ExpoInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    libm::pow(2.0, 20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - libm::pow(2.0, -20.0 * t + 10.0)) / 2.0
                }
            }
            Self::CircIn => 1.0 - libm::sqrt(1.0 - t * t),
            Self::CircOut => libm::sqrt(1.0 - (t - 1.0) * (t - 1.0)),
            Self::CircInOut => {
                if t < 0.5 {
                    (1.0 - libm::sqrt(1.0 - (2.0 * t) * (2.0 * t))) / 2.0
                } else {
                    (libm::sqrt(1.0 - (-2.0 * t + 2.0) * (-2.0 * t + 2.0)) + 1.0) / 2.0
                }
            }
            Self::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::BackOut => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u * u * u + BACK_C1 * u * u
            }
            Self::BackInOut => {
                if t < 0.5 {
                    let u = 2.0 * t;
                    (u * u * ((BACK_C2 + 1.0) * u - BACK_C2)) / 2.0
                } else {
                    let u = 2.0 * t - 2.0;
                    (u * u * ((BACK_C2 + 1.0) * u + BACK_C2) + 2.0) / 2.0
                }
            }
            Self::ElasticIn => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -libm::pow(2.0, 10.0 * t - 10.0) * libm::sin((t * 10.0 - 10.75) * ELASTIC_C4)
                }
            }
            Self::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    libm::pow(2.0, -10.0 * t) * libm::sin((t * 10.0 - 0.75) * ELASTIC_C4) + 1.0
                }
            }
            Self::ElasticInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(libm::pow(2.0, 20.0 * t - 10.0) * libm::sin((20.0 * t - 11.125) * ELASTIC_C5))
                        / 2.0
                } else {
                    (libm::pow(2.0, -20.0 * t + 10.0) * libm::sin((20.0 * t - 11.125) * ELASTIC_C5))
                        / 2.0
                        + 1.0
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Self::Custom(f) => f(t),
        }
    }
}

fn powi(x: f64, n: i32) -> f64 {
    libm::pow(x, f64::from(n))
}

fn in_out_power(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        // 2^(n-1) * t^n
        f64::from(1_u32 << (n - 1)) * powi(t, n)
    } else {
        1.0 - powi(-2.0 * t + 2.0, n) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}
