// Copyright 2026 the Kiwano Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing against a node's transformed content box.
//!
//! Both queries compose the ancestor chain directly instead of reading the
//! cached matrices, so they are correct even between transform passes.

use kurbo::{Affine, Point, Rect, Vec2};

use super::id::{INVALID, NodeId};
use super::tree::SceneTree;

impl SceneTree {
    /// Returns the node's post-pivot matrix computed from the current local
    /// transforms of it and its ancestors.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Affine {
        self.validate(id);
        let own = self.transform[id.idx as usize];
        let mut m = own.to_affine_with_pivot();
        let mut p = self.parent[id.idx as usize];
        while p != INVALID {
            m = self.transform[p as usize].to_affine() * m;
            p = self.parent[p as usize];
        }
        m
    }

    /// Returns whether `point` (in root space) lies inside the node's
    /// content box `(0, 0)..size`.
    ///
    /// A node with zero width or height never contains anything, nor does
    /// one whose matrix is singular.
    #[must_use]
    pub fn contains_point(&self, id: NodeId, point: Point) -> bool {
        let Some((m, rect)) = self.hit_box(id) else {
            return false;
        };
        rect.contains(m.inverse() * point)
    }

    /// Returns whether the transformed content boxes of `a` and `b` overlap.
    ///
    /// Uses separating axes over the four edge directions of the two boxes.
    /// Touching edges count as overlap. Zero-sized nodes never intersect,
    /// nor do nodes collapsed by a singular matrix.
    #[must_use]
    pub fn intersects(&self, a: NodeId, b: NodeId) -> bool {
        let (Some((ma, ra)), Some((mb, rb))) = (self.hit_box(a), self.hit_box(b)) else {
            return false;
        };
        let qa = quad(ma, ra);
        let qb = quad(mb, rb);

        for q in [&qa, &qb] {
            for edge in [q[1] - q[0], q[3] - q[0]] {
                let axis = Vec2::new(-edge.y, edge.x);
                if axis.hypot2() == 0.0 {
                    continue;
                }
                let (min_a, max_a) = project(&qa, axis);
                let (min_b, max_b) = project(&qb, axis);
                if max_a < min_b || max_b < min_a {
                    return false;
                }
            }
        }
        true
    }

    /// World matrix and local box of a node that can be hit at all.
    fn hit_box(&self, id: NodeId) -> Option<(Affine, Rect)> {
        let size = self.size(id);
        if size.width <= 0.0 || size.height <= 0.0 {
            return None;
        }
        let m = self.world_matrix(id);
        (m.determinant() != 0.0).then(|| (m, size.to_rect()))
    }
}

fn quad(m: Affine, r: Rect) -> [Point; 4] {
    [
        m * Point::new(r.x0, r.y0),
        m * Point::new(r.x1, r.y0),
        m * Point::new(r.x1, r.y1),
        m * Point::new(r.x0, r.y1),
    ]
}

fn project(q: &[Point; 4], axis: Vec2) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in q {
        let d = p.to_vec2().dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
