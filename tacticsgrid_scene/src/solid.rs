// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision solids and the intersection tests between them.
//!
//! Spheres and polygons are *into* shapes: they can be hit. Rays and segments
//! only ever act as probes. Polygons are triangles and are hit from both
//! sides. Touching counts as contact everywhere.

use glam::{DAffine3, DVec3};
use tacticsgrid_index::Aabb3D;

/// A collision shape.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Solid {
    /// A ball.
    Sphere {
        /// Centre.
        center: DVec3,
        /// Radius, must be positive.
        radius: f64,
    },
    /// A triangle.
    Polygon([DVec3; 3]),
    /// A half-line.
    Ray {
        /// Start point.
        origin: DVec3,
        /// Direction, need not be normalized.
        direction: DVec3,
    },
    /// A line segment.
    Segment {
        /// First endpoint.
        a: DVec3,
        /// Second endpoint.
        b: DVec3,
    },
}

impl Solid {
    /// The solid's representative point: the centre for spheres, the start
    /// for rays and segments, the centroid for polygons.
    pub fn origin(&self) -> DVec3 {
        match *self {
            Self::Sphere { center, .. } => center,
            Self::Polygon([a, b, c]) => (a + b + c) / 3.0,
            Self::Ray { origin, .. } => origin,
            Self::Segment { a, .. } => a,
        }
    }

    /// Whether probes can hit this solid.
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Sphere { .. } | Self::Polygon(_))
    }

    /// Axis-aligned bounds, `None` for rays, which are unbounded.
    pub fn bounds(&self) -> Option<Aabb3D> {
        match *self {
            Self::Sphere { center, radius } => {
                Some(Aabb3D::from_point(center.to_array()).inflate(radius))
            }
            Self::Polygon(v) => Aabb3D::from_points(v.map(|p| p.to_array())),
            Self::Ray { .. } => None,
            Self::Segment { a, b } => Aabb3D::from_points([a.to_array(), b.to_array()]),
        }
    }

    /// The solid mapped through `tf`.
    ///
    /// Sphere radii scale by the largest axis scale, which is exact for
    /// uniform scale and conservative otherwise.
    #[must_use]
    pub fn transformed(&self, tf: &DAffine3) -> Self {
        match *self {
            Self::Sphere { center, radius } => {
                let m = tf.matrix3;
                let scale = m.x_axis.length().max(m.y_axis.length()).max(m.z_axis.length());
                Self::Sphere {
                    center: tf.transform_point3(center),
                    radius: radius * scale,
                }
            }
            Self::Polygon(v) => Self::Polygon(v.map(|p| tf.transform_point3(p))),
            Self::Ray { origin, direction } => Self::Ray {
                origin: tf.transform_point3(origin),
                direction: tf.transform_vector3(direction),
            },
            Self::Segment { a, b } => Self::Segment {
                a: tf.transform_point3(a),
                b: tf.transform_point3(b),
            },
        }
    }

    /// Check the solid is usable by the intersection tests.
    pub fn validate(&self) -> Result<(), &'static str> {
        match *self {
            Self::Sphere { center, radius } => {
                if !center.is_finite() {
                    Err("sphere centre is not finite")
                } else if !(radius.is_finite() && radius > 0.0) {
                    Err("sphere radius must be positive and finite")
                } else {
                    Ok(())
                }
            }
            Self::Polygon([a, b, c]) => {
                if !(a.is_finite() && b.is_finite() && c.is_finite()) {
                    Err("polygon vertex is not finite")
                } else if (b - a).cross(c - a).length_squared() == 0.0 {
                    Err("polygon has zero area")
                } else {
                    Ok(())
                }
            }
            Self::Ray { origin, direction } => {
                if !(origin.is_finite() && direction.is_finite()) {
                    Err("ray is not finite")
                } else if direction.length_squared() == 0.0 {
                    Err("ray direction is zero")
                } else {
                    Ok(())
                }
            }
            Self::Segment { a, b } => {
                if !(a.is_finite() && b.is_finite()) {
                    Err("segment is not finite")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Two-sided Möller–Trumbore. Returns the ray parameter of the hit, if any,
/// with `t` in `[0, t_max]`.
pub(crate) fn ray_triangle(origin: DVec3, dir: DVec3, tri: &[DVec3; 3], t_max: f64) -> Option<f64> {
    let [v0, v1, v2] = *tri;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let h = dir.cross(e2);
    let det = e1.dot(h);
    if det == 0.0 {
        // Parallel to the plane.
        return None;
    }
    // Divide rather than multiply by 1/det so axis-aligned hits stay exact.
    let s = origin - v0;
    let u = s.dot(h) / det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) / det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) / det;
    (0.0..=t_max).contains(&t).then_some(t)
}

/// Smallest ray parameter in `[0, t_max]` at which the ray touches the
/// sphere surface. A ray starting inside reports its exit point.
pub(crate) fn ray_sphere(origin: DVec3, dir: DVec3, center: DVec3, radius: f64, t_max: f64) -> Option<f64> {
    let m = origin - center;
    let a = dir.length_squared();
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t0 = (-b - root) / a;
    let t1 = (-b + root) / a;
    [t0, t1]
        .into_iter()
        .find(|t| (0.0..=t_max).contains(t))
}

/// Closest point on segment `a..b` to `p`.
fn closest_on_segment(p: DVec3, a: DVec3, b: DVec3) -> DVec3 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point on a triangle to `p` (Ericson, Real-Time Collision Detection 5.1.5).
pub(crate) fn closest_on_triangle(p: DVec3, tri: &[DVec3; 3]) -> DVec3 {
    let [a, b, c] = *tri;
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }
    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }
    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }
    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

/// Whether a sphere touches a triangle.
pub(crate) fn sphere_triangle(center: DVec3, radius: f64, tri: &[DVec3; 3]) -> bool {
    closest_on_triangle(center, tri).distance_squared(center) <= radius * radius
}

/// Whether a sphere touches a segment.
pub(crate) fn sphere_segment(center: DVec3, radius: f64, a: DVec3, b: DVec3) -> bool {
    closest_on_segment(center, a, b).distance_squared(center) <= radius * radius
}

/// Slab test of a ray (or a segment, with `t_max = 1`) against a box.
pub(crate) fn ray_aabb(origin: DVec3, dir: DVec3, aabb: &Aabb3D, t_max: f64) -> bool {
    let (o, d) = (origin.to_array(), dir.to_array());
    let (lo, hi) = (aabb.min(), aabb.max());
    let mut t0 = 0.0_f64;
    let mut t1 = t_max;
    for axis in 0..3 {
        if d[axis] == 0.0 {
            if o[axis] < lo[axis] || o[axis] > hi[axis] {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let (mut near, mut far) = ((lo[axis] - o[axis]) * inv, (hi[axis] - o[axis]) * inv);
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }
        t0 = t0.max(near);
        t1 = t1.min(far);
        if t0 > t1 {
            return false;
        }
    }
    true
}

/// Whether a sphere touches a box.
pub(crate) fn sphere_aabb(center: DVec3, radius: f64, aabb: &Aabb3D) -> bool {
    let lo = DVec3::from_array(aabb.min());
    let hi = DVec3::from_array(aabb.max());
    center.clamp(lo, hi).distance_squared(center) <= radius * radius
}
