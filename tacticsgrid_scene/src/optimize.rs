// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Re-emitting the collision solids of a subtree as a Morton-ordered tree of
//! scene nodes.

use tacticsgrid_index::morton::ROOT_SHIFT;
use tacticsgrid_index::{BuildOptions, Entry, MortonTree, NodeIdx, NodeKind};

use crate::collect::{GroupKey, collect_solids};
use crate::error::QueryResult;
use crate::scene::Scene;
use crate::solid::Solid;
use crate::types::{CollisionNode, LocalNode, NodeContent, NodeFlags, NodeId};

/// How [`optimize_collisions`] gathers and groups solids.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeOptions {
    /// Also turn mesh triangles into collision polygons.
    pub convert_geometry: bool,
    /// Do not split along Z. Suits mostly flat levels.
    pub ignore_z: bool,
    /// Keep node names; solids from differently named nodes are not merged.
    pub preserve_names: bool,
    /// Keep node tags; solids from differently tagged nodes are not merged.
    pub preserve_tags: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            convert_geometry: false,
            ignore_z: false,
            preserve_names: true,
            preserve_tags: true,
        }
    }
}

impl OptimizeOptions {
    /// Set both `preserve_names` and `preserve_tags`.
    #[must_use]
    pub fn preserve_identity(mut self, preserve: bool) -> Self {
        self.preserve_names = preserve;
        self.preserve_tags = preserve;
        self
    }

    /// Index build options matching these settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new(self.ignore_z)
    }
}

/// Summary of one [`optimize_collisions`] run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    /// Solids re-attached.
    pub solids: usize,
    /// Collision nodes created, one per leaf group.
    pub groups: usize,
    /// Hidden grouping nodes created, one per internal tree node.
    pub internal_nodes: usize,
    /// Internal levels on the longest path.
    pub depth: u32,
}

/// Rebuild the collision solids below `root` as a Morton-ordered hierarchy.
///
/// Solids are collected with [`collect_solids`], indexed with
/// [`MortonTree`], and re-attached under `root`: each internal tree node
/// becomes a hidden grouping node named `col-<prefix bits>x…x`, and each leaf
/// group becomes a collision node holding its solids. The scene is committed
/// afterwards. With no solids the scene is left as collected.
pub fn optimize_collisions(
    scene: &mut Scene,
    root: NodeId,
    options: OptimizeOptions,
) -> QueryResult<OptimizeReport> {
    let records = collect_solids(scene, root, &options)?;
    if records.is_empty() {
        log::info!("no collision solids below {root:?}, nothing to optimize");
        scene.commit();
        return Ok(OptimizeReport::default());
    }

    let entries: Vec<Entry<GroupKey, Solid>> = records
        .into_iter()
        .map(|r| Entry {
            origin: r.origin.to_array(),
            bounds: r.bounds,
            key: r.group_key(),
            payload: r.solid,
        })
        .collect();
    let tree = MortonTree::build(entries, options.build_options());
    log::debug!("built a Morton tree of {} solids, depth {}", tree.len(), tree.depth());

    let mut report = OptimizeReport {
        solids: tree.len(),
        depth: tree.depth(),
        ..Default::default()
    };
    // (tree node, scene node it attaches under)
    let mut stack: Vec<(NodeIdx, NodeId)> = tree.root().map(|r| (r, root)).into_iter().collect();
    while let Some((idx, parent)) = stack.pop() {
        let Some(node) = tree.node(idx) else {
            continue;
        };
        match node.kind() {
            NodeKind::Internal { .. } => {
                let group = scene.insert(
                    Some(parent),
                    LocalNode {
                        name: internal_name(node.prefix(), node.shift()),
                        flags: NodeFlags::empty(),
                        ..Default::default()
                    },
                );
                report.internal_nodes += 1;
                let before = stack.len();
                stack.extend(node.children().map(|c| (c, group)));
                stack[before..].reverse();
            }
            NodeKind::Leaf(groups) => {
                for g in groups {
                    let key = g.key();
                    let name = if options.preserve_names {
                        key.identity.name.clone()
                    } else {
                        format!("col-{:0width$b}", g.code(), width = ROOT_SHIFT as usize)
                    };
                    let mut collision = CollisionNode::new(g.payloads().copied().collect());
                    collision.into_mask = key.mask;
                    scene.insert(
                        Some(parent),
                        LocalNode {
                            name,
                            tags: key.identity.tags.iter().cloned().collect(),
                            transform: key.transform,
                            content: NodeContent::Collision(collision),
                            ..Default::default()
                        },
                    );
                    report.groups += 1;
                }
            }
        }
    }
    scene.commit();
    log::info!(
        "optimized {} solids into {} groups under {} grouping nodes, depth {}",
        report.solids,
        report.groups,
        report.internal_nodes,
        report.depth
    );
    Ok(report)
}

/// `col-` followed by the node's fixed Morton bits, then one `x` per free bit.
fn internal_name(prefix: u64, shift: u32) -> String {
    let fixed = (ROOT_SHIFT - shift) as usize;
    format!("col-{prefix:0fixed$b}{}", "x".repeat(shift as usize))
}
