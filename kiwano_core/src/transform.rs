// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local 2-D transform of a node.
//!
//! [`Transform`] is a plain value: position, scale, rotation, skew, pivot and
//! size. It derives two affine matrices:
//!
//! - [`to_affine`](Transform::to_affine) places the node's *pivot point* at
//!   `position` after scaling, skewing and rotating. Children are composed
//!   with this matrix.
//! - [`to_affine_with_pivot`](Transform::to_affine_with_pivot) additionally
//!   shifts content by the pivot offset so that the local content box
//!   `(0, 0)..size` is scaled and rotated around the pivot. Content drawing
//!   and hit testing use this one.
//!
//! Matrices follow kurbo's convention: in `a * b`, `b` is applied first.

use kurbo::{Affine, Point, Size, Vec2};

/// Position, scale, rotation, skew, pivot and size of a node.
///
/// Angles are in degrees. The pivot is a normalized point inside the node's
/// box and is always clamped to `[0, 1]` on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position of the pivot point in the parent's space.
    pub position: Point,
    /// Scale factors along x and y.
    pub scale: Vec2,
    /// Clockwise rotation in degrees (y axis pointing down).
    pub rotation: f64,
    /// Skew angles in degrees along x and y.
    pub skew: Vec2,
    /// Size of the node's content box.
    pub size: Size,
    pivot: Point,
}

impl Transform {
    /// The identity transform: origin position, unit scale, zero size.
    pub const IDENTITY: Self = Self {
        position: Point::ORIGIN,
        scale: Vec2::new(1.0, 1.0),
        rotation: 0.0,
        skew: Vec2::ZERO,
        size: Size::ZERO,
        pivot: Point::ORIGIN,
    };

    /// Returns the normalized pivot.
    #[inline]
    #[must_use]
    pub const fn pivot(&self) -> Point {
        self.pivot
    }

    /// Sets the normalized pivot, clamping both components to `[0, 1]`.
    #[inline]
    pub fn set_pivot(&mut self, pivot: Point) {
        self.pivot = clamp_pivot(pivot);
    }

    /// Returns a copy with the given pivot (clamped to `[0, 1]`).
    #[inline]
    #[must_use]
    pub fn with_pivot(mut self, pivot: Point) -> Self {
        self.set_pivot(pivot);
        self
    }

    /// Returns the pivot in local content units (`pivot * size`).
    #[inline]
    #[must_use]
    pub fn pivot_offset(&self) -> Vec2 {
        Vec2::new(
            self.pivot.x * self.size.width,
            self.pivot.y * self.size.height,
        )
    }

    /// Scale, then skew, then rotate, then translate to `position`.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);
        let rotate = Affine::rotate(self.rotation.to_radians());
        let translate = Affine::translate(self.position.to_vec2());
        if self.skew == Vec2::ZERO {
            translate * rotate * scale
        } else {
            let skew = Affine::skew(
                libm::tan(self.skew.x.to_radians()),
                libm::tan(self.skew.y.to_radians()),
            );
            translate * rotate * skew * scale
        }
    }

    /// Like [`to_affine`](Self::to_affine), with the content first shifted
    /// so that the pivot point lands on `position`.
    #[must_use]
    pub fn to_affine_with_pivot(&self) -> Affine {
        self.to_affine() * Affine::translate(-self.pivot_offset())
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub(crate) fn clamp_pivot(pivot: Point) -> Point {
    Point::new(pivot.x.clamp(0.0, 1.0), pivot.y.clamp(0.0, 1.0))
}
