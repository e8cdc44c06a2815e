// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, flags, masks, and node content.

use std::collections::BTreeMap;

use glam::{DAffine3, DVec3};

use crate::solid::Solid;

/// Identifier for a node in the scene.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check whether a `NodeId` still refers to
/// a live node. Stale ids never alias a different live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is drawn. Collision queries ignore this flag.
        const VISIBLE = 0b0000_0001;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// A 32-bit layer mask.
    ///
    /// Targets carry an *into* mask, probes a *from* mask; a probe tests a
    /// target only when the two masks share a bit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CollideMask: u32 {
        /// Layer 0, the default layer for level geometry.
        const LEVEL = 1;

        const _ = !0;
    }
}

impl CollideMask {
    /// The mask with only bit `n` set; empty if `n` is 32 or more.
    pub const fn bit(n: u32) -> Self {
        match 1_u32.checked_shl(n) {
            Some(bits) => Self::from_bits_retain(bits),
            None => Self::empty(),
        }
    }

    /// Every layer.
    pub const fn all_on() -> Self {
        Self::all()
    }
}

impl Default for CollideMask {
    fn default() -> Self {
        Self::LEVEL
    }
}

/// Collision solids attached to a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionNode {
    /// Solids, in node-local space.
    pub solids: Vec<Solid>,
    /// Layers this node can be hit on. Empty means the node is never a target.
    pub into_mask: CollideMask,
    /// Layers this node probes when used as a query. Empty means it is never a probe.
    pub from_mask: CollideMask,
}

impl CollisionNode {
    /// A target-only node on the default layer.
    pub fn new(solids: Vec<Solid>) -> Self {
        Self {
            solids,
            into_mask: CollideMask::LEVEL,
            from_mask: CollideMask::empty(),
        }
    }
}

/// Render geometry: a triangle soup in node-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshNode {
    /// Triangles, each as three vertices.
    pub triangles: Vec<[DVec3; 3]>,
    /// Layers the mesh can be hit on.
    pub into_mask: CollideMask,
}

impl MeshNode {
    /// A mesh on the default layer.
    pub fn new(triangles: Vec<[DVec3; 3]>) -> Self {
        Self {
            triangles,
            into_mask: CollideMask::LEVEL,
        }
    }
}

/// What a node carries besides its transform.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NodeContent {
    /// Grouping node.
    #[default]
    Empty,
    /// Collision solids.
    Collision(CollisionNode),
    /// Render geometry.
    Mesh(MeshNode),
}

impl NodeContent {
    /// The into mask of collision or mesh content; empty for grouping nodes.
    pub fn into_mask(&self) -> CollideMask {
        match self {
            Self::Empty => CollideMask::empty(),
            Self::Collision(c) => c.into_mask,
            Self::Mesh(m) => m.into_mask,
        }
    }
}

/// Local data for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalNode {
    /// Node name. Not required to be unique.
    pub name: String,
    /// String tags, kept sorted by key.
    pub tags: BTreeMap<String, String>,
    /// Local transform relative to parent space.
    pub transform: DAffine3,
    /// Flags.
    pub flags: NodeFlags,
    /// Payload.
    pub content: NodeContent,
}

impl LocalNode {
    /// An empty grouping node with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            tags: BTreeMap::new(),
            transform: DAffine3::IDENTITY,
            flags: NodeFlags::default(),
            content: NodeContent::Empty,
        }
    }
}
