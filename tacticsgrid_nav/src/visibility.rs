// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line of sight between cells.

use std::collections::BTreeMap;

use glam::DVec3;
use tacticsgrid_scene::{CollideMask, QuerySession};

use crate::cell::{CellId, NavCell};
use crate::error::{NavError, NavResult};

/// Which cells can see which: cell → every cell visible from it, in id order.
///
/// Every cell is a key and lists itself. The relation is symmetric.
pub type Visibility = BTreeMap<CellId, Vec<CellId>>;

/// Settings for [`determine_visibility`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibilityParams {
    /// Eye height above each cell.
    pub view_height: f64,
}

impl Default for VisibilityParams {
    fn default() -> Self {
        Self { view_height: 1.6 }
    }
}

/// Eye positions: each cell raised by `view_height`.
pub fn view_points(cells: &[NavCell], view_height: f64) -> Vec<DVec3> {
    let offset = DVec3::Z * view_height;
    cells.iter().map(|c| c.position + offset).collect()
}

/// Test mutual line of sight between every pair of cells.
///
/// Two cells see each other when the segment between their eye points does
/// not touch geometry on `mask`. Each unordered pair is swept once. Cells
/// whose eye points coincide see each other without a sweep.
///
/// The view height must be finite.
pub fn determine_visibility(
    session: &mut QuerySession<'_>,
    cells: &[NavCell],
    params: VisibilityParams,
    mask: CollideMask,
) -> NavResult<Visibility> {
    if !params.view_height.is_finite() {
        return Err(NavError::InvalidViewHeight(params.view_height));
    }
    let eyes = view_points(cells, params.view_height);
    let mut visibility: Visibility = (0..cells.len())
        .map(|i| (CellId(i), vec![CellId(i)]))
        .collect();

    let mut swept = 0_usize;
    for (i, from) in eyes.iter().enumerate() {
        for (j, to) in eyes.iter().enumerate().skip(i + 1) {
            if from != to {
                swept += 1;
                if session.segment_hits(*from, *to, mask)? {
                    continue;
                }
            }
            visibility.entry(CellId(i)).or_default().push(CellId(j));
            visibility.entry(CellId(j)).or_default().push(CellId(i));
        }
    }
    for seen in visibility.values_mut() {
        seen.sort_unstable();
    }
    log::info!(
        "{swept} sight lines swept over {} cells, {} visible pairs",
        cells.len(),
        visibility.values().map(|v| v.len() - 1).sum::<usize>() / 2
    );
    Ok(visibility)
}
