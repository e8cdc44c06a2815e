// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Programmatic level geometry: squares, fences and blocks as meshes.

use glam::DVec3;

use crate::scene::Scene;
use crate::types::{LocalNode, MeshNode, NodeContent, NodeId};

/// A level building block, spanned by edge vectors from a corner.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    /// The parallelogram `origin + s*a + t*b`, `s, t` in `[0, 1]`.
    Square {
        /// Corner.
        origin: DVec3,
        /// First edge.
        a: DVec3,
        /// Second edge.
        b: DVec3,
    },
    /// The four walls of a box with no floor or lid, `c` being the height.
    Fence {
        /// Corner.
        origin: DVec3,
        /// First edge.
        a: DVec3,
        /// Second edge.
        b: DVec3,
        /// Wall height.
        c: DVec3,
    },
    /// A closed box.
    Block {
        /// Corner.
        origin: DVec3,
        /// First edge.
        a: DVec3,
        /// Second edge.
        b: DVec3,
        /// Third edge.
        c: DVec3,
    },
}

// Corners of a box, indexed by bit 0 = a, bit 1 = b, bit 2 = c.
fn corners(origin: DVec3, a: DVec3, b: DVec3, c: DVec3) -> [DVec3; 8] {
    core::array::from_fn(|i| {
        let pick = |bit: usize, v: DVec3| if i & bit != 0 { v } else { DVec3::ZERO };
        origin + pick(1, a) + pick(2, b) + pick(4, c)
    })
}

// Two triangles for the quad p0 p1 p3 p2, split along p1..p2.
fn quad(p: [DVec3; 8], [i0, i1, i2, i3]: [usize; 4]) -> [[DVec3; 3]; 2] {
    [[p[i0], p[i1], p[i2]], [p[i2], p[i1], p[i3]]]
}

impl Element {
    /// Short kind name, used to name mesh nodes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Square { .. } => "square",
            Self::Fence { .. } => "fence",
            Self::Block { .. } => "block",
        }
    }

    /// The element's surface as triangles. Faces are two-sided, so each quad
    /// is two triangles regardless of winding.
    pub fn triangles(&self) -> Vec<[DVec3; 3]> {
        match *self {
            Self::Square { origin, a, b } => {
                quad(corners(origin, a, b, DVec3::ZERO), [0, 1, 2, 3]).to_vec()
            }
            Self::Fence { origin, a, b, c } => {
                let p = corners(origin, a, b, c);
                [[0, 1, 4, 5], [0, 2, 4, 6], [1, 3, 5, 7], [2, 3, 6, 7]]
                    .into_iter()
                    .flat_map(|face| quad(p, face))
                    .collect()
            }
            Self::Block { origin, a, b, c } => {
                let p = corners(origin, a, b, c);
                [
                    [0, 1, 2, 3],
                    [4, 5, 6, 7],
                    [0, 1, 4, 5],
                    [0, 2, 4, 6],
                    [1, 3, 5, 7],
                    [2, 3, 6, 7],
                ]
                .into_iter()
                .flat_map(|face| quad(p, face))
                .collect()
            }
        }
    }
}

/// Add a `level` node under `parent` with one mesh child per element.
pub fn build_level(scene: &mut Scene, parent: Option<NodeId>, elements: &[Element]) -> NodeId {
    let level = scene.insert(parent, LocalNode::named("level"));
    for element in elements {
        scene.insert(
            Some(level),
            LocalNode {
                content: NodeContent::Mesh(MeshNode::new(element.triangles())),
                ..LocalNode::named(element.kind())
            },
        );
    }
    level
}

/// A 30×30 floor enclosed by a 3 unit fence.
pub fn sandbox() -> Vec<Element> {
    vec![
        Element::Square {
            origin: DVec3::new(-15.0, -15.0, 0.0),
            a: DVec3::new(30.0, 0.0, 0.0),
            b: DVec3::new(0.0, 30.0, 0.0),
        },
        Element::Fence {
            origin: DVec3::new(-15.0, -15.0, 0.0),
            a: DVec3::new(30.0, 0.0, 0.0),
            b: DVec3::new(0.0, 30.0, 0.0),
            c: DVec3::new(0.0, 0.0, 3.0),
        },
    ]
}

/// The sandbox plus two towers joined by a bridge, and a ramp down from one
/// tower.
pub fn playground() -> Vec<Element> {
    let tower = |x: f64| Element::Block {
        origin: DVec3::new(x, -1.0, 0.0),
        a: DVec3::new(2.0, 0.0, 0.0),
        b: DVec3::new(0.0, 2.0, 0.0),
        c: DVec3::new(0.0, 0.0, 3.0),
    };
    let mut elements = sandbox();
    elements.extend([
        tower(-1.0),
        tower(-8.0),
        Element::Square {
            origin: DVec3::new(-6.0, -1.0, 3.0),
            a: DVec3::new(5.0, 0.0, 0.0),
            b: DVec3::new(0.0, 2.0, 0.0),
        },
        Element::Square {
            origin: DVec3::new(-1.0, -1.0, 3.0),
            a: DVec3::new(0.0, -8.0, -3.0),
            b: DVec3::new(2.0, 0.0, 0.0),
        },
    ]);
    elements
}
