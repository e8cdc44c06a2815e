// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tacticsgrid Index: a Morton-ordered bounding-volume tree.
//!
//! Tacticsgrid Index turns an unordered set of 3D items into a hierarchy that
//! collision queries can cull against.
//!
//! - Each item has a representative point (its *origin*), bounds, a grouping key and a payload.
//! - Origins are quantized onto a lattice spanning their bounding box and interleaved into
//!   Morton (Z-order) codes; see [`morton`].
//! - Items are sorted by `(code, key)` once, then partitioned by 3-bit Morton digit into an
//!   octree-shaped [`MortonTree`] whose nodes live in an arena and are addressed by [`NodeIdx`].
//! - Leaves hold [`LeafGroup`]s: runs of consecutive items with equal keys.
//!
//! The tree is built once and never updated. It does not depend on any geometry crate;
//! higher layers (like the scene crate) compute origins and bounds and feed them here.
//!
//! # Example
//!
//! ```rust
//! use tacticsgrid_index::{Aabb3D, BuildOptions, Entry, MortonTree};
//!
//! let entries: Vec<_> = (0..20)
//!     .map(|i| {
//!         let p = [i as f64, (i % 4) as f64, 0.0];
//!         Entry { origin: p, bounds: Aabb3D::from_point(p), key: 0_u8, payload: i }
//!     })
//!     .collect();
//! let tree = MortonTree::build(entries, BuildOptions::default());
//! assert_eq!(tree.len(), 20);
//!
//! // Everything within a box around x = 10.
//! let hits: Vec<_> = tree
//!     .query_aabb(&Aabb3D::new([9.5, -1.0, -1.0], [10.5, 5.0, 1.0]))
//!     .copied()
//!     .collect();
//! assert_eq!(hits, [10]);
//! ```
//!
//! ### Float semantics
//!
//! Origins are assumed finite. Quantization clamps onto the lattice, so a point that rounds
//! past the far face of the bounding box lands on the boundary cell instead of wrapping.

#![no_std]

extern crate alloc;

pub mod morton;
pub mod tree;
pub mod types;

pub use morton::Lattice;
pub use tree::{BuildOptions, Entry, LeafGroup, MortonTree, Node, NodeIdx, NodeKind};
pub use types::{Aabb3D, union_aabb};
