// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug visualization support.
//!
//! This module draws nothing itself. It keeps a caller's marker objects in
//! step with the cell list and produces coloured line segments for edges,
//! paths and sight lines, which a renderer can draw however it likes.

use glam::DVec3;

use crate::adjacency::planar_distance;
use crate::cell::{CellId, NavCell};
use crate::error::{NavError, NavResult};
use crate::graph::NavGraph;
use crate::visibility::Visibility;

/// Something that can create, destroy and move point markers.
pub trait MarkerSet {
    /// A marker handle.
    type Marker;

    /// Create a new marker.
    fn spawn(&mut self) -> Self::Marker;

    /// Destroy a marker that is no longer needed.
    fn despawn(&mut self, marker: Self::Marker);

    /// Move a marker.
    fn place(&mut self, marker: &mut Self::Marker, position: DVec3);
}

/// Grow or shrink `markers` to one per cell, then move marker `i` onto cell `i`.
///
/// Surplus markers are despawned from the end; existing markers are reused.
pub fn sync_markers<S: MarkerSet>(set: &mut S, markers: &mut Vec<S::Marker>, cells: &[NavCell]) {
    while markers.len() > cells.len() {
        if let Some(marker) = markers.pop() {
            set.despawn(marker);
        }
    }
    while markers.len() < cells.len() {
        markers.push(set.spawn());
    }
    for (marker, cell) in markers.iter_mut().zip(cells) {
        set.place(marker, cell.position);
    }
}

/// A coloured line segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DebugLine {
    /// Start point.
    pub from: DVec3,
    /// End point.
    pub to: DVec3,
    /// Linear RGB, each channel in `[0, 1]`.
    pub color: [f64; 3],
}

/// Colour for an edge: green when level or descending, shading to red as the
/// climb approaches 45°.
pub fn slope_color(from: DVec3, to: DVec3, cost: f64) -> [f64; 3] {
    let dxy = planar_distance(from, to);
    let factor = if dxy > 0.0 { cost / dxy } else { 1.0 };
    [(factor - 1.0).clamp(0.0, 1.0), (2.0 - factor).clamp(0.0, 1.0), 0.0]
}

/// One line per directed edge, lifted by `lift` so it clears the surface.
pub fn edge_lines(graph: &NavGraph, lift: f64) -> Vec<DebugLine> {
    let offset = DVec3::Z * lift;
    let cells = graph.cells();
    let mut lines = Vec::with_capacity(graph.edge_count());
    for (from, edges) in graph.adjacency() {
        let Some(a) = cells.get(from.get()) else {
            continue;
        };
        for (to, cost) in edges {
            let Some(b) = cells.get(to.get()) else {
                continue;
            };
            lines.push(DebugLine {
                from: a.position + offset,
                to: b.position + offset,
                color: slope_color(a.position, b.position, *cost),
            });
        }
    }
    lines
}

/// The polyline through `path`, in red, lifted by `lift`.
///
/// A path of fewer than two cells has no segments.
pub fn path_lines(graph: &NavGraph, path: &[CellId], lift: f64) -> NavResult<Vec<DebugLine>> {
    let offset = DVec3::Z * lift;
    let points = path
        .iter()
        .map(|id| {
            graph
                .cell(*id)
                .map(|c| c.position + offset)
                .ok_or(NavError::UnknownCell(*id))
        })
        .collect::<NavResult<Vec<_>>>()?;
    Ok(points
        .windows(2)
        .map(|w| DebugLine {
            from: w[0],
            to: w[1],
            color: [1.0, 0.0, 0.0],
        })
        .collect())
}

/// One yellow line per pair of distinct cells that see each other, lifted by `lift`.
pub fn visibility_lines(
    graph: &NavGraph,
    visibility: &Visibility,
    lift: f64,
) -> NavResult<Vec<DebugLine>> {
    let offset = DVec3::Z * lift;
    let position = |id: CellId| {
        graph
            .cell(id)
            .map(|c| c.position + offset)
            .ok_or(NavError::UnknownCell(id))
    };
    let mut lines = Vec::new();
    for (&from, seen) in visibility {
        let a = position(from)?;
        for &to in seen.iter().filter(|to| **to > from) {
            lines.push(DebugLine {
                from: a,
                to: position(to)?,
                color: [1.0, 1.0, 0.0],
            });
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::Adjacency;

    #[derive(Default)]
    struct Recorder {
        next: u32,
        despawned: Vec<u32>,
    }

    impl MarkerSet for Recorder {
        type Marker = (u32, DVec3);

        fn spawn(&mut self) -> Self::Marker {
            self.next += 1;
            (self.next, DVec3::NAN)
        }

        fn despawn(&mut self, marker: Self::Marker) {
            self.despawned.push(marker.0);
        }

        fn place(&mut self, marker: &mut Self::Marker, position: DVec3) {
            marker.1 = position;
        }
    }

    fn cells(n: u32) -> Vec<NavCell> {
        (0..n)
            .map(|i| NavCell {
                grid_x: i,
                grid_y: 0,
                position: DVec3::new(f64::from(i), 0.0, 0.0),
            })
            .collect()
    }

    #[test]
    fn markers_follow_the_cell_count() {
        let mut set = Recorder::default();
        let mut markers = Vec::new();

        sync_markers(&mut set, &mut markers, &cells(3));
        assert_eq!(markers.iter().map(|m| m.0).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(markers[2].1, DVec3::new(2.0, 0.0, 0.0));

        sync_markers(&mut set, &mut markers, &cells(1));
        assert_eq!(markers.len(), 1);
        assert_eq!(set.despawned, [3, 2]);

        sync_markers(&mut set, &mut markers, &cells(2));
        assert_eq!(markers.iter().map(|m| m.0).collect::<Vec<_>>(), [1, 4]);
        assert_eq!(markers[1].1, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn edge_colors_follow_the_slope() {
        let flat = slope_color(DVec3::ZERO, DVec3::X, 1.0);
        assert_eq!(flat, [0.0, 1.0, 0.0]);
        let steep = slope_color(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0), 2.0);
        assert_eq!(steep, [1.0, 0.0, 0.0]);
        let half = slope_color(DVec3::ZERO, DVec3::new(2.0, 0.0, 1.0), 3.0);
        assert_eq!(half, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn lines_are_lifted() {
        let mut adjacency = Adjacency::new();
        adjacency
            .entry(CellId(0))
            .or_default()
            .insert(CellId(1), 1.0);
        let graph = NavGraph::new(cells(3), adjacency).unwrap();

        let lines = edge_lines(&graph, 0.1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].from, DVec3::new(0.0, 0.0, 0.1));
        assert_eq!(lines[0].to, DVec3::new(1.0, 0.0, 0.1));

        let path = path_lines(&graph, &[CellId(0), CellId(1), CellId(2)], 0.25).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[1].to, DVec3::new(2.0, 0.0, 0.25));
        assert!(path_lines(&graph, &[CellId(0)], 0.0).unwrap().is_empty());
        assert_eq!(
            path_lines(&graph, &[CellId(0), CellId(7)], 0.0),
            Err(NavError::UnknownCell(CellId(7)))
        );
    }

    #[test]
    fn sight_lines_are_drawn_once_per_pair() {
        let graph = NavGraph::new(cells(3), Adjacency::new()).unwrap();
        let mut visibility = Visibility::new();
        visibility.insert(CellId(0), vec![CellId(0), CellId(1)]);
        visibility.insert(CellId(1), vec![CellId(0), CellId(1), CellId(2)]);
        visibility.insert(CellId(2), vec![CellId(1), CellId(2)]);

        let lines = visibility_lines(&graph, &visibility, 0.5).unwrap();
        assert_eq!(
            lines,
            [
                DebugLine {
                    from: DVec3::new(0.0, 0.0, 0.5),
                    to: DVec3::new(1.0, 0.0, 0.5),
                    color: [1.0, 1.0, 0.0],
                },
                DebugLine {
                    from: DVec3::new(1.0, 0.0, 0.5),
                    to: DVec3::new(2.0, 0.0, 0.5),
                    color: [1.0, 1.0, 0.0],
                },
            ]
        );

        visibility.insert(CellId(9), vec![CellId(9)]);
        assert_eq!(
            visibility_lines(&graph, &visibility, 0.0),
            Err(NavError::UnknownCell(CellId(9)))
        );
    }
}
