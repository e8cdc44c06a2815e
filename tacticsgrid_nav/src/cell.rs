// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigation cells and their ids.

use glam::DVec3;

/// Dense index of a cell: its position in the cell list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CellId(pub usize);

impl CellId {
    /// Raw index.
    pub const fn get(self) -> usize {
        self.0
    }
}

/// One walkable point.
///
/// `grid_x`/`grid_y` are sample indices along the two sampling intervals, not
/// world coordinates; cells stacked in one column (a bridge over a floor)
/// share them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavCell {
    /// Sample index along x.
    pub grid_x: u32,
    /// Sample index along y.
    pub grid_y: u32,
    /// World-space surface point.
    pub position: DVec3,
}

impl NavCell {
    /// Grid column of the cell.
    pub fn column(&self) -> (u32, u32) {
        (self.grid_x, self.grid_y)
    }

    /// Grid columns of the eight planar neighbours, skipping ones that would
    /// fall below index zero.
    pub fn neighbor_columns(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        OFFSETS.iter().filter_map(|&(dx, dy)| {
            let x = u32::try_from(i64::from(self.grid_x) + dx).ok()?;
            let y = u32::try_from(i64::from(self.grid_y) + dy).ok()?;
            Some((x, y))
        })
    }
}
