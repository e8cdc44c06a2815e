// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traversability between neighbouring cells.

use std::collections::BTreeMap;

use glam::DVec3;
use kurbo::Point;
use tacticsgrid_scene::{CollideMask, QuerySession};

use crate::cell::{CellId, NavCell};
use crate::error::NavResult;

/// Directed edges: source cell → destination cell → cost.
///
/// Only cells with at least one outgoing edge appear as keys.
pub type Adjacency = BTreeMap<CellId, BTreeMap<CellId, f64>>;

/// Settings for the traversability test.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraversalParams {
    /// Height above both cells of the segment swept between them.
    pub clearance: f64,
}

impl Default for TraversalParams {
    fn default() -> Self {
        Self { clearance: 0.5 }
    }
}

/// Horizontal distance between two points.
pub fn planar_distance(from: DVec3, to: DVec3) -> f64 {
    Point::new(from.x, from.y).distance(Point::new(to.x, to.y))
}

/// Cost of walking from `from` to `to`, ignoring obstacles.
///
/// Anything steeper than 45° upward is rejected. Descending costs the planar
/// distance; ascending scales it by `1 + dz / dxy`, so a 45° climb costs
/// twice the distance. Coincident columns (`dxy` not above zero) and NaN
/// coordinates are rejected.
pub fn traversal_cost(from: DVec3, to: DVec3) -> Option<f64> {
    let dz = to.z - from.z;
    let dxy = planar_distance(from, to);
    let admissible = dxy > 0.0 && dz <= dxy;
    if !admissible {
        return None;
    }
    Some(if dz > 0.0 { dxy * (1.0 + dz / dxy) } else { dxy })
}

/// Build the directed traversability graph over `cells`.
///
/// For each cell in id order, every cell in each of the eight neighbouring
/// grid columns is tested: the slope must pass [`traversal_cost`] and the
/// segment between the two points, lifted by the clearance, must not touch
/// geometry on `mask`.
pub fn determine_adjacency(
    session: &mut QuerySession<'_>,
    cells: &[NavCell],
    params: TraversalParams,
    mask: CollideMask,
) -> NavResult<Adjacency> {
    let mut columns: BTreeMap<(u32, u32), Vec<CellId>> = BTreeMap::new();
    for (i, cell) in cells.iter().enumerate() {
        columns.entry(cell.column()).or_default().push(CellId(i));
    }

    let lift = DVec3::Z * params.clearance;
    let mut adjacency = Adjacency::new();
    let mut tested = 0_usize;
    for (i, from) in cells.iter().enumerate() {
        for column in from.neighbor_columns() {
            let Some(targets) = columns.get(&column) else {
                continue;
            };
            for &to_id in targets {
                let to = &cells[to_id.get()];
                let Some(cost) = traversal_cost(from.position, to.position) else {
                    continue;
                };
                tested += 1;
                if session.segment_hits(from.position + lift, to.position + lift, mask)? {
                    continue;
                }
                adjacency.entry(CellId(i)).or_default().insert(to_id, cost);
            }
        }
    }
    log::debug!(
        "{tested} segment sweeps kept {} edges",
        adjacency.values().map(BTreeMap::len).sum::<usize>()
    );
    Ok(adjacency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_descending_cost_the_distance() {
        let a = DVec3::ZERO;
        assert_eq!(traversal_cost(a, DVec3::new(3.0, 4.0, 0.0)), Some(5.0));
        assert_eq!(traversal_cost(a, DVec3::new(3.0, 4.0, -20.0)), Some(5.0));
    }

    #[test]
    fn climbing_costs_more_up_to_double() {
        let a = DVec3::ZERO;
        let mut last = 1.0;
        for dz in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            let cost = traversal_cost(a, DVec3::new(1.0, 0.0, dz)).unwrap();
            assert!(dz == 0.0 || cost > last, "{cost} after {last}");
            last = cost;
        }
        assert_eq!(last, 2.0, "a 45° climb costs twice the distance");
    }

    #[test]
    fn steeper_than_45_degrees_is_cut_off() {
        let a = DVec3::ZERO;
        assert!(traversal_cost(a, DVec3::new(1.0, 0.0, 1.0)).is_some());
        assert!(traversal_cost(a, DVec3::new(1.0, 0.0, 1.0 + 1e-9)).is_none());
        // The same slope is fine the other way down.
        assert_eq!(traversal_cost(DVec3::new(1.0, 0.0, 2.0), a), Some(1.0));
    }

    #[test]
    fn cost_is_asymmetric() {
        let low = DVec3::ZERO;
        let high = DVec3::new(0.5, 0.0, 0.25);
        assert_eq!(traversal_cost(low, high), Some(0.75));
        assert_eq!(traversal_cost(high, low), Some(0.5));
    }

    #[test]
    fn same_column_is_rejected() {
        let a = DVec3::ZERO;
        assert_eq!(traversal_cost(a, DVec3::new(0.0, 0.0, -1.0)), None);
        assert_eq!(traversal_cost(a, a), None);
        assert_eq!(traversal_cost(a, DVec3::new(f64::NAN, 0.0, 0.0)), None);
    }
}
