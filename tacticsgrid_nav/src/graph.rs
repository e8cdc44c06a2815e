// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The finished navigation graph and lookups over it.

use std::collections::BTreeMap;

use glam::DVec3;
use kurbo::{Point, Rect};

use crate::adjacency::Adjacency;
use crate::cell::{CellId, NavCell};
use crate::error::{NavError, NavResult};

/// Cells plus directed, weighted edges between them. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavGraph {
    cells: Vec<NavCell>,
    adjacency: Adjacency,
}

/// A graph flattened for a search routine: positions by cell id, and
/// neighbour costs by cell id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavExport {
    /// World position of every cell, indexed by [`CellId::get`].
    pub positions: Vec<DVec3>,
    /// Source → destination → cost.
    pub neighbors: BTreeMap<CellId, BTreeMap<CellId, f64>>,
}

impl NavGraph {
    /// Assemble a graph, checking every edge.
    ///
    /// Fails with [`NavError::UnknownCell`] if an edge names a cell outside
    /// `cells`. Self-edges and costs that are not positive are dropped.
    pub fn new(cells: Vec<NavCell>, mut adjacency: Adjacency) -> NavResult<Self> {
        for (from, edges) in &adjacency {
            if from.get() >= cells.len() {
                return Err(NavError::UnknownCell(*from));
            }
            if let Some(to) = edges.keys().find(|to| to.get() >= cells.len()) {
                return Err(NavError::UnknownCell(*to));
            }
        }
        for (from, edges) in &mut adjacency {
            edges.retain(|to, cost| to != from && *cost > 0.0);
        }
        adjacency.retain(|_, edges| !edges.is_empty());
        Ok(Self { cells, adjacency })
    }

    /// All cells, in id order.
    pub fn cells(&self) -> &[NavCell] {
        &self.cells
    }

    /// The edge map.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// A cell by id.
    pub fn cell(&self, id: CellId) -> Option<&NavCell> {
        self.cells.get(id.get())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the graph has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }

    /// Outgoing edges of `id` as `(destination, cost)`, in destination order.
    pub fn neighbors(&self, id: CellId) -> impl Iterator<Item = (CellId, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(to, cost)| (*to, *cost)))
    }

    /// Cost of the edge `from → to`, if there is one.
    pub fn cost(&self, from: CellId, to: CellId) -> Option<f64> {
        self.adjacency.get(&from)?.get(&to).copied()
    }

    /// The cell at exactly `position`, lowest id first.
    pub fn cell_at(&self, position: DVec3) -> Option<CellId> {
        self.cells
            .iter()
            .position(|c| c.position == position)
            .map(CellId)
    }

    /// The cell closest to `coord` by straight-line distance.
    ///
    /// Ties go to the lowest id. `None` only for an empty graph.
    pub fn nearest(&self, coord: DVec3) -> Option<CellId> {
        let mut best: Option<(CellId, f64)> = None;
        for (i, cell) in self.cells.iter().enumerate() {
            let d = cell.position.distance_squared(coord);
            match best {
                Some((_, best_d)) if d >= best_d || d.is_nan() => {}
                _ => best = Some((CellId(i), d)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Planar extent of all cells, `None` for an empty graph.
    pub fn extent(&self) -> Option<Rect> {
        let mut points = self.cells.iter().map(|c| Point::new(c.position.x, c.position.y));
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
    }

    /// Flatten the graph for a search routine.
    pub fn export(&self) -> NavExport {
        NavExport {
            positions: self.cells.iter().map(|c| c.position).collect(),
            neighbors: self.adjacency.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: f64, y: f64, z: f64) -> NavCell {
        NavCell {
            grid_x: 0,
            grid_y: 0,
            position: DVec3::new(x, y, z),
        }
    }

    fn edges(list: &[(usize, usize, f64)]) -> Adjacency {
        let mut adjacency = Adjacency::new();
        for &(from, to, cost) in list {
            adjacency
                .entry(CellId(from))
                .or_default()
                .insert(CellId(to), cost);
        }
        adjacency
    }

    #[test]
    fn nearest_breaks_ties_by_lowest_id() {
        let graph = NavGraph::new(
            vec![cell(5.0, 0.0, 0.0), cell(0.0, 2.0, 0.0), cell(0.0, -2.0, 0.0)],
            Adjacency::new(),
        )
        .unwrap();
        assert_eq!(graph.nearest(DVec3::ZERO), Some(CellId(1)));
        assert_eq!(graph.nearest(DVec3::new(5.0, 0.0, 1.0)), Some(CellId(0)));
        assert_eq!(NavGraph::default().nearest(DVec3::ZERO), None);
    }

    #[test]
    fn unknown_cells_are_rejected() {
        let cells = vec![cell(0.0, 0.0, 0.0), cell(1.0, 0.0, 0.0)];
        assert_eq!(
            NavGraph::new(cells.clone(), edges(&[(0, 2, 1.0)])),
            Err(NavError::UnknownCell(CellId(2)))
        );
        assert_eq!(
            NavGraph::new(cells, edges(&[(5, 0, 1.0)])),
            Err(NavError::UnknownCell(CellId(5)))
        );
    }

    #[test]
    fn self_edges_and_free_edges_are_dropped() {
        let cells = vec![cell(0.0, 0.0, 0.0), cell(1.0, 0.0, 0.0)];
        let graph =
            NavGraph::new(cells, edges(&[(0, 0, 1.0), (0, 1, 0.0), (1, 0, 1.0)])).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(CellId(0)).count(), 0);
        assert_eq!(graph.cost(CellId(1), CellId(0)), Some(1.0));
        assert!(!graph.adjacency().contains_key(&CellId(0)));
    }

    #[test]
    fn lookups() {
        let cells = vec![cell(0.0, 0.0, 0.0), cell(1.0, 0.0, 0.5), cell(1.0, 3.0, 0.0)];
        let graph = NavGraph::new(cells, edges(&[(0, 1, 1.5), (0, 2, 3.2), (1, 0, 1.0)])).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.cell_at(DVec3::new(1.0, 0.0, 0.5)), Some(CellId(1)));
        assert_eq!(graph.cell_at(DVec3::new(1.0, 0.0, 0.4)), None);
        assert_eq!(
            graph.neighbors(CellId(0)).collect::<Vec<_>>(),
            [(CellId(1), 1.5), (CellId(2), 3.2)]
        );
        assert_eq!(graph.extent(), Some(Rect::new(0.0, 0.0, 1.0, 3.0)));

        let export = graph.export();
        assert_eq!(export.positions.len(), 3);
        assert_eq!(export.positions[2], DVec3::new(1.0, 3.0, 0.0));
        assert_eq!(export.neighbors[&CellId(1)][&CellId(0)], 1.0);
    }
}
