// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tacticsgrid Nav: a navigation grid sampled from a collision scene.
//!
//! Tacticsgrid Nav turns a committed [`Scene`](tacticsgrid_scene::Scene) into a graph of
//! walkable points that a path search can run over.
//!
//! - Probes the level straight down on a regular grid and turns every surface hit into a
//!   candidate cell, so stacked floors give stacked cells.
//! - Discards cells without room to stand, using a clearance sphere above each one.
//! - Connects each cell to the cells in the eight neighbouring grid columns when the slope is
//!   at most 45° upward and nothing blocks the way. Climbing costs more than descending.
//! - Answers nearest-cell lookups and flattens the graph for an external search routine.
//!
//! ## Pipeline
//!
//! [`scan_level`] runs the whole thing: [`find_footfalls`], [`filter_for_standability`],
//! [`determine_adjacency`] and finally [`NavGraph::new`]. Each stage is public, so a caller can
//! run them with its own sampling intervals on a [`QuerySession`](tacticsgrid_scene::QuerySession).
//!
//! [`determine_visibility`] is a separate pass over the same cells: it sweeps a sight line
//! between the eye points of every pair of cells and records which cells can see which.
//!
//! Cell ids are dense: [`CellId`] `i` is the `i`th cell of [`NavGraph::cells`]. Edges are
//! directed and only ever join cells of neighbouring grid columns.
//!
//! The [`debug`] module produces marker positions and coloured line segments for drawing a
//! graph; it draws nothing itself.
//!
//! ### Minimal usage
//!
//! ```
//! use glam::DVec3;
//! use tacticsgrid_nav::{CellId, ScanParams, scan_level};
//! use tacticsgrid_scene::{Scene, level};
//!
//! let mut scene = Scene::new();
//! let root = level::build_level(
//!     &mut scene,
//!     None,
//!     &[level::Element::Square { origin: DVec3::ZERO, a: DVec3::X, b: DVec3::Y }],
//! );
//! scene.commit();
//!
//! let graph = scan_level(&scene, root, &ScanParams::default()).unwrap();
//! // A 3x3 grid of cells over the unit square.
//! assert_eq!(graph.len(), 9);
//!
//! let corner = graph.nearest(DVec3::new(-1.0, -1.0, 0.0)).unwrap();
//! assert_eq!(corner, CellId(0));
//! assert_eq!(graph.neighbors(corner).count(), 3);
//! assert_eq!(graph.cost(CellId(0), CellId(1)), Some(0.5));
//! ```

mod adjacency;
mod cell;
pub mod debug;
mod error;
mod graph;
mod sample;
mod scan;
mod visibility;

pub use adjacency::{Adjacency, TraversalParams, determine_adjacency, planar_distance, traversal_cost};
pub use cell::{CellId, NavCell};
pub use error::{NavError, NavResult};
pub use graph::{NavExport, NavGraph};
pub use sample::{Interval, Standability, filter_for_standability, find_footfalls};
pub use scan::{ScanParams, scan_level};
pub use visibility::{Visibility, VisibilityParams, determine_visibility, view_points};
