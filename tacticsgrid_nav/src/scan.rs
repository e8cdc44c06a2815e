// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The whole scan: bounds, footfalls, standability, adjacency.

use glam::DVec3;
use tacticsgrid_scene::{CollideMask, NodeId, Scene};

use crate::adjacency::{TraversalParams, determine_adjacency};
use crate::error::NavResult;
use crate::graph::NavGraph;
use crate::sample::{Interval, Standability, filter_for_standability, find_footfalls};

/// Settings for [`scan_level`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanParams {
    /// Grid spacing along x and y.
    pub step: f64,
    /// How far above the top of the level probes start.
    pub probe_height: f64,
    /// Clearance sphere above each cell.
    pub standability: Standability,
    /// Edge test settings.
    pub traversal: TraversalParams,
    /// Layers that count as level geometry.
    pub mask: CollideMask,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            step: 0.5,
            probe_height: 10.0,
            standability: Standability::default(),
            traversal: TraversalParams::default(),
            mask: CollideMask::LEVEL,
        }
    }
}

/// Sample the level below `root` and build its navigation graph.
///
/// The grid covers the level's bounds on `params.mask`, with probes starting
/// `probe_height` above its top. An empty level gives an empty graph.
pub fn scan_level(scene: &Scene, root: NodeId, params: &ScanParams) -> NavResult<NavGraph> {
    let Some(bounds) = scene.tight_bounds(root, params.mask)? else {
        log::info!("level {root:?} has no geometry on {:?}", params.mask);
        return Ok(NavGraph::default());
    };
    let [min_x, min_y, _] = bounds.min();
    let [max_x, max_y, max_z] = bounds.max();
    let origin = DVec3::new(0.0, 0.0, max_z + params.probe_height);
    let x = Interval::new(min_x, max_x, params.step);
    let y = Interval::new(min_y, max_y, params.step);

    let mut session = scene.session(root)?;
    log::info!("finding footfalls");
    let cells = find_footfalls(&mut session, origin, x, y, params.mask)?;
    log::info!("filtering {} footfalls for standability", cells.len());
    let cells = filter_for_standability(&mut session, cells, params.standability, params.mask)?;
    log::info!("determining adjacency of {} cells", cells.len());
    let adjacency = determine_adjacency(&mut session, &cells, params.traversal, params.mask)?;
    let graph = NavGraph::new(cells, adjacency)?;
    log::info!(
        "scanned {} cells and {} edges ({} solids tested)",
        graph.len(),
        graph.edge_count(),
        session.stats().solids_tested
    );
    Ok(graph)
}
