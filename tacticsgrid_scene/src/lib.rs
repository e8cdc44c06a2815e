// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tacticsgrid Scene: a small 3D scene graph with collision queries.
//!
//! Tacticsgrid Scene holds a static level and answers the collision queries a
//! navigation-grid builder needs, fast enough to issue tens of thousands of them.
//!
//! - Represents a hierarchy of nodes with local transforms, names, tags, flags and content
//!   (collision solids or triangle meshes).
//! - Supports batched edits with a [`Scene::commit`] step that refreshes world transforms and
//!   bounds; queries refuse to run on an uncommitted scene.
//! - Answers ray, sphere and segment queries through a [`QuerySession`] scoped to one subtree.
//! - Rebuilds a level's collision solids into a Morton-ordered hierarchy with
//!   [`optimize_collisions`], so that queries cull most of the level by bounds.
//!
//! ## Collision model
//!
//! Every query carries a [`CollideMask`]. A node takes part when its *into* mask shares a bit
//! with the query mask. Spheres, polygons and mesh triangles can be hit; rays and segments are
//! only ever probes. Polygons are two-sided and touching counts as contact. The
//! [`NodeFlags::VISIBLE`] flag is for drawing only and does not affect queries.
//!
//! A query never reports a failure as "no collision": malformed geometry, stale ids and
//! uncommitted edits all surface as a [`QueryError`].
//!
//! ## API overview
//!
//! - [`Scene`]: node arena. [`NodeId`] is its generational handle.
//! - [`LocalNode`], [`NodeContent`], [`CollisionNode`], [`MeshNode`]: per-node data.
//! - [`Solid`]: collision shapes.
//! - [`QuerySession`]: `ray_hits`, `sphere_overlaps`, `segment_hits`, plus [`QueryStats`].
//! - [`collect_solids`] and [`optimize_collisions`]: the collision optimizer.
//! - [`level`]: squares, fences and blocks for building levels in code.
//!
//! ### Minimal usage
//!
//! ```
//! use glam::DVec3;
//! use tacticsgrid_scene::{CollideMask, OptimizeOptions, Scene, level, optimize_collisions};
//!
//! let mut scene = Scene::new();
//! let root = level::build_level(&mut scene, None, &level::sandbox());
//! scene.commit();
//!
//! let options = OptimizeOptions {
//!     convert_geometry: true,
//!     ..Default::default()
//! };
//! let report = optimize_collisions(&mut scene, root, options).unwrap();
//! assert_eq!(report.solids, 10);
//!
//! let mut session = scene.session(root).unwrap();
//! let hits = session
//!     .ray_hits(DVec3::new(1.25, 2.25, 10.0), DVec3::NEG_Z, CollideMask::LEVEL)
//!     .unwrap();
//! assert_eq!(hits[0].point, DVec3::new(1.25, 2.25, 0.0));
//! ```

mod collect;
mod error;
pub mod level;
mod optimize;
mod query;
mod scene;
mod solid;
mod types;

pub use collect::{GroupKey, IdentityKey, SolidRecord, collect_solids};
pub use error::{QueryError, QueryResult};
pub use optimize::{OptimizeOptions, OptimizeReport, optimize_collisions};
pub use query::{QueryStats, QuerySession, RayHit};
pub use scene::Scene;
pub use solid::Solid;
pub use types::{CollideMask, CollisionNode, LocalNode, MeshNode, NodeContent, NodeFlags, NodeId};
