// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;

/// Axis-aligned bounding box in 3D.
///
/// Coordinates are assumed finite. An AABB may be degenerate (zero extent on
/// any axis), which is the normal case for a single point or a flat polygon.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3D {
    /// Minimum x
    pub min_x: f64,
    /// Minimum y
    pub min_y: f64,
    /// Minimum z
    pub min_z: f64,
    /// Maximum x
    pub max_x: f64,
    /// Maximum y
    pub max_y: f64,
    /// Maximum z
    pub max_z: f64,
}

impl Aabb3D {
    /// Create a new AABB from min/max corners.
    pub const fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            min_x: min[0],
            min_y: min[1],
            min_z: min[2],
            max_x: max[0],
            max_y: max[1],
            max_z: max[2],
        }
    }

    /// A zero-extent AABB at a single point.
    pub const fn from_point(p: [f64; 3]) -> Self {
        Self::new(p, p)
    }

    /// The smallest AABB containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = Self::from_point(it.next()?);
        Some(it.fold(first, |acc, p| acc.include_point(p)))
    }

    /// Minimum corner.
    pub const fn min(&self) -> [f64; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    /// Maximum corner.
    pub const fn max(&self) -> [f64; 3] {
        [self.max_x, self.max_y, self.max_z]
    }

    /// Extent along each axis.
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        ]
    }

    /// Centre point.
    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
            0.5 * (self.min_z + self.max_z),
        ]
    }

    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, p: [f64; 3]) -> bool {
        le(self.min_x, p[0])
            && le(self.min_y, p[1])
            && le(self.min_z, p[2])
            && le(p[0], self.max_x)
            && le(p[1], self.max_y)
            && le(p[2], self.max_z)
    }

    /// Whether two AABBs overlap. Touching faces count as overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// The intersection of two AABBs.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: max_t(self.min_x, other.min_x),
            min_y: max_t(self.min_y, other.min_y),
            min_z: max_t(self.min_z, other.min_z),
            max_x: min_t(self.max_x, other.max_x),
            max_y: min_t(self.max_y, other.max_y),
            max_z: min_t(self.max_z, other.max_z),
        }
    }

    /// Return true if the AABB is inverted on any axis. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y) || lt(self.max_z, self.min_z)
    }

    /// Grow the AABB to include `p`.
    #[must_use]
    pub fn include_point(self, p: [f64; 3]) -> Self {
        union_aabb(self, Self::from_point(p))
    }

    /// Grow the AABB by `margin` on every side.
    #[must_use]
    pub fn inflate(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            min_z: self.min_z - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
            max_z: self.max_z + margin,
        }
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

/// Smallest AABB containing both inputs.
pub fn union_aabb(a: Aabb3D, b: Aabb3D) -> Aabb3D {
    Aabb3D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        min_z: min_t(a.min_z, b.min_z),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
        max_z: max_t(a.max_z, b.max_z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_box_is_not_empty() {
        let a = Aabb3D::from_point([1.0, 2.0, 3.0]);
        assert!(!a.is_empty(), "a single point is a degenerate but valid box");
        assert!(a.contains_point([1.0, 2.0, 3.0]));
        assert_eq!(a.extent(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn touching_faces_intersect() {
        let a = Aabb3D::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = Aabb3D::new([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        let c = Aabb3D::new([1.5, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(a.intersects(&b), "shared face counts as contact");
        assert!(!a.intersects(&c));
    }

    #[test]
    fn from_points_unions_everything() {
        let b = Aabb3D::from_points([[0.0, 5.0, -1.0], [2.0, -3.0, 4.0], [1.0, 1.0, 1.0]])
            .expect("non-empty input");
        assert_eq!(b.min(), [0.0, -3.0, -1.0]);
        assert_eq!(b.max(), [2.0, 5.0, 4.0]);
        assert!(Aabb3D::from_points([]).is_none());
    }
}
