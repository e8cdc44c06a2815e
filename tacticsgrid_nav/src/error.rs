// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for grid building.

use tacticsgrid_scene::QueryError;
use thiserror::Error;

use crate::cell::CellId;

/// A navigation-grid stage that could not complete.
///
/// Stages never return partial output: either the full result or one of these.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum NavError {
    /// A sampling interval has a non-finite bound or a step that is not a
    /// positive finite number.
    #[error("invalid {axis} interval: [{min}, {max}] step {step}")]
    InvalidInterval {
        /// `"x"` or `"y"`.
        axis: &'static str,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Step.
        step: f64,
    },

    /// The standability sphere has a non-positive radius or a non-finite height.
    #[error("invalid standability sphere: radius {radius}, height {height}")]
    InvalidStandability {
        /// Sphere radius.
        radius: f64,
        /// Height of the sphere centre above the cell.
        height: f64,
    },

    /// The eye height for line-of-sight tests is not finite.
    #[error("invalid view height {0}")]
    InvalidViewHeight(f64),

    /// A cell id that is not in the graph.
    #[error("unknown cell {0:?}")]
    UnknownCell(CellId),

    /// A collision query failed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Result type for navigation-grid stages.
pub type NavResult<T> = Result<T, NavError>;
