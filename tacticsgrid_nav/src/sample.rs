// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid sampling: downward probes, then the standability filter.

use glam::DVec3;
use tacticsgrid_scene::{CollideMask, QuerySession};

use crate::cell::NavCell;
use crate::error::{NavError, NavResult};

/// Hits of one probe closer than this are the same surface point.
///
/// A probe through the edge shared by two triangles hits both, at points that
/// can differ in the last bits on sloped surfaces.
pub const MERGE_DISTANCE: f64 = 0.001;

/// Sample positions `min, min + step, min + 2*step, …` up to and including `max`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    /// First sample.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Distance between samples; must be positive and finite.
    pub step: f64,
}

impl Interval {
    /// An interval from `min` to `max`.
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Check bounds and step, naming `axis` in the error.
    ///
    /// The step must be positive and finite, and the interval may not hold
    /// more samples than a `u32` index can count.
    pub fn validate(&self, axis: &'static str) -> NavResult<()> {
        let finite = self.min.is_finite() && self.max.is_finite() && self.step.is_finite();
        if finite && self.step > 0.0 && (self.max - self.min) / self.step < f64::from(u32::MAX) {
            Ok(())
        } else {
            Err(NavError::InvalidInterval {
                axis,
                min: self.min,
                max: self.max,
                step: self.step,
            })
        }
    }

    /// `(index, value)` of every sample.
    ///
    /// Values are computed as `min + index * step` rather than accumulated,
    /// so long intervals do not drift. Empty when `max < min`. Call
    /// [`Interval::validate`] first; an invalid interval yields nothing.
    pub fn samples(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        let valid = self.validate("").is_ok();
        (0..=u32::MAX)
            .map(move |i| (i, self.min + f64::from(i) * self.step))
            .take_while(move |(_, v)| valid && *v <= self.max)
    }
}

/// The clearance sphere a cell must have free above it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standability {
    /// Sphere radius.
    pub radius: f64,
    /// Height of the sphere centre above the cell.
    pub height: f64,
}

impl Default for Standability {
    fn default() -> Self {
        Self {
            radius: 0.8,
            height: 1.0,
        }
    }
}

impl Standability {
    /// Check the sphere is usable.
    pub fn validate(&self) -> NavResult<()> {
        if self.radius.is_finite() && self.radius > 0.0 && self.height.is_finite() {
            Ok(())
        } else {
            Err(NavError::InvalidStandability {
                radius: self.radius,
                height: self.height,
            })
        }
    }
}

/// Probe straight down from `origin + (x, y, 0)` for every `x` in `x` and
/// `y` in `y`, and turn every surface hit into a candidate cell.
///
/// Probes run x outer, y inner; within a probe, cells are in ray order (top
/// first). Hits of one probe within [`MERGE_DISTANCE`] of an earlier hit,
/// such as a hit on an edge shared by two triangles, are kept once.
pub fn find_footfalls(
    session: &mut QuerySession<'_>,
    origin: DVec3,
    x: Interval,
    y: Interval,
    mask: CollideMask,
) -> NavResult<Vec<NavCell>> {
    x.validate("x")?;
    y.validate("y")?;
    let mut cells: Vec<NavCell> = Vec::new();
    let mut probes = 0_usize;
    for (grid_x, dx) in x.samples() {
        for (grid_y, dy) in y.samples() {
            probes += 1;
            let start = DVec3::new(origin.x + dx, origin.y + dy, origin.z);
            let first = cells.len();
            for hit in session.ray_hits(start, DVec3::NEG_Z, mask)? {
                if cells[first..]
                    .iter()
                    .any(|c| c.position.distance(hit.point) < MERGE_DISTANCE)
                {
                    continue;
                }
                cells.push(NavCell {
                    grid_x,
                    grid_y,
                    position: hit.point,
                });
            }
        }
    }
    log::debug!("{probes} probes found {} footfalls", cells.len());
    Ok(cells)
}

/// Keep the cells whose standability sphere touches no geometry. Order is
/// preserved.
pub fn filter_for_standability(
    session: &mut QuerySession<'_>,
    cells: Vec<NavCell>,
    standability: Standability,
    mask: CollideMask,
) -> NavResult<Vec<NavCell>> {
    standability.validate()?;
    let before = cells.len();
    let mut kept = Vec::with_capacity(before);
    for cell in cells {
        let center = cell.position + DVec3::Z * standability.height;
        if !session.sphere_overlaps(center, standability.radius, mask)? {
            kept.push(cell);
        }
    }
    log::debug!("{} of {before} footfalls are standable", kept.len());
    Ok(kept)
}
