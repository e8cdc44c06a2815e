// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene arena: nodes, hierarchy edits, and the commit pass.

use glam::DAffine3;
use tacticsgrid_index::{Aabb3D, union_aabb};

use crate::error::{QueryError, QueryResult};
use crate::types::{CollideMask, LocalNode, NodeContent, NodeFlags, NodeId};

/// World-space data cached per node by [`Scene::commit`].
#[derive(Clone, Debug, Default)]
pub(crate) struct WorldNode {
    pub(crate) transform: DAffine3,
    // AABB of this node's own solids or triangles.
    pub(crate) content_bounds: Option<Aabb3D>,
    // AABB of the content of the whole subtree.
    pub(crate) subtree_bounds: Option<Aabb3D>,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) local: LocalNode,
    pub(crate) world: WorldNode,
}

impl Node {
    fn new(local: LocalNode) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local,
            world: WorldNode::default(),
        }
    }
}

/// A node arena with transforms and collision content.
///
/// Edits mark the scene dirty; queries refuse to run until [`Scene::commit`]
/// has refreshed world transforms and bounds.
#[derive(Clone)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    // Generation per slot; outlives the node so a reused slot never aliases.
    generations: Vec<u32>,
    free_list: Vec<usize>,
    dirty: bool,
    epoch: u64,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("dirty", &self.dirty)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            dirty: false,
            epoch: 0,
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` is treated like `None`.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] = self.generations[idx].wrapping_add(1);
            let generation = self.generations[idx];
            self.nodes[idx] = Some(Node::new(local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let idx = idx as u32;
            (idx, generation)
        } else {
            self.nodes.push(Some(Node::new(local)));
            self.generations.push(1);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let idx = (self.nodes.len() - 1) as u32;
            (idx, 1)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent.filter(|p| self.is_alive(*p)) {
            self.link_parent(id, p);
        }
        self.dirty = true;
        id
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.unlink_parent(id, parent);
        }
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
        self.dirty = true;
    }

    /// Reparent `id` under `new_parent` (or make it a root).
    ///
    /// Moving a node under itself or one of its descendants is ignored.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if new_parent.is_some_and(|p| self.transform_to(p, id).is_some()) {
            return;
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent.filter(|p| self.is_alive(*p)) {
            self.link_parent(id, p);
        }
        self.dirty = true;
    }

    /// Update the local transform.
    pub fn set_transform(&mut self, id: NodeId, transform: DAffine3) {
        self.edit(id, |local| local.transform = transform);
    }

    /// Replace the node content.
    pub fn set_content(&mut self, id: NodeId, content: NodeContent) {
        self.edit(id, |local| local.content = content);
    }

    /// Rename a node.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        let name = name.into();
        self.edit(id, |local| local.name = name);
    }

    /// Set or replace a tag.
    pub fn set_tag(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        self.edit(id, |local| {
            local.tags.insert(key, value);
        });
    }

    /// Update flags. Flags do not affect world data, so this does not dirty the scene.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(node) = self.node_opt_mut(id) {
            node.local.flags = flags;
        }
    }

    /// Set the into mask of collision or mesh content. No-op on grouping nodes.
    pub fn set_into_mask(&mut self, id: NodeId, mask: CollideMask) {
        self.edit(id, |local| match &mut local.content {
            NodeContent::Collision(c) => c.into_mask = mask,
            NodeContent::Mesh(m) => m.into_mask = mask,
            NodeContent::Empty => {}
        });
    }

    /// Set the from mask of collision content. No-op on other nodes.
    pub fn set_from_mask(&mut self, id: NodeId, mask: CollideMask) {
        self.edit(id, |local| {
            if let NodeContent::Collision(c) = &mut local.content {
                c.from_mask = mask;
            }
        });
    }

    /// Drop every solid of a collision node, keeping its masks.
    pub fn clear_solids(&mut self, id: NodeId) {
        self.edit(id, |local| {
            if let NodeContent::Collision(c) = &mut local.content {
                c.solids.clear();
            }
        });
    }

    /// Recompute world transforms and bounds for the whole scene.
    pub fn commit(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        let roots: Vec<NodeId> = self.roots().collect();
        for root in roots {
            self.update_world_recursive(root, DAffine3::IDENTITY);
        }
        self.dirty = false;
    }

    /// Whether the world data reflects every edit.
    pub fn is_committed(&self) -> bool {
        !self.dirty
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.idx()).is_some_and(Option::is_some)
            && self.generations.get(id.idx()) == Some(&id.1)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the scene has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            Some(n) if n.parent.is_none() => {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                let idx = i as u32;
                Some(NodeId::new(idx, self.generations[i]))
            }
            _ => None,
        })
    }

    /// Local data of a live node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.node(id).map(|n| &n.local)
    }

    /// Parent of a live node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of a live node, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// World transform as of the last commit.
    pub fn world_transform(&self, id: NodeId) -> Option<DAffine3> {
        self.node(id).map(|n| n.world.transform)
    }

    /// World bounds of the node's own content as of the last commit.
    pub fn content_bounds(&self, id: NodeId) -> Option<Aabb3D> {
        self.node(id).and_then(|n| n.world.content_bounds)
    }

    /// World bounds of all content in the subtree as of the last commit.
    pub fn subtree_bounds(&self, id: NodeId) -> Option<Aabb3D> {
        self.node(id).and_then(|n| n.world.subtree_bounds)
    }

    /// `root` and all of its descendants in depth-first pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// First node named `name` in the subtree of `root`, in pre-order.
    pub fn find_named(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.local(*id).is_some_and(|l| l.name == name))
    }

    /// Transform from `id`'s space into `ancestor`'s space.
    ///
    /// Composed from local transforms, so it does not need a commit. `None`
    /// if `ancestor` is not `id` or one of its ancestors.
    pub fn transform_to(&self, id: NodeId, ancestor: NodeId) -> Option<DAffine3> {
        let mut tf = DAffine3::IDENTITY;
        let mut cur = id;
        loop {
            if cur == ancestor {
                return self.is_alive(cur).then_some(tf);
            }
            let node = self.node(cur)?;
            tf = node.local.transform * tf;
            cur = node.parent?;
        }
    }

    /// Bounds of the content in `root`'s subtree whose into mask shares a bit
    /// with `mask`, in world space. `None` if nothing matches.
    pub fn tight_bounds(&self, root: NodeId, mask: CollideMask) -> QueryResult<Option<Aabb3D>> {
        self.check_ready(root)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter_map(|id| self.node(id))
            .filter(|n| n.local.content.into_mask().intersects(mask))
            .filter_map(|n| n.world.content_bounds)
            .reduce(union_aabb))
    }

    pub(crate) fn check_ready(&self, root: NodeId) -> QueryResult<()> {
        if self.dirty {
            return Err(QueryError::Uncommitted);
        }
        if !self.is_alive(root) {
            return Err(QueryError::DanglingNode(root));
        }
        Ok(())
    }

    // --- internals ---

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes.get(id.idx())?.as_ref()
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes.get_mut(id.idx())?.as_mut()
    }

    fn edit(&mut self, id: NodeId, f: impl FnOnce(&mut LocalNode)) {
        if let Some(node) = self.node_opt_mut(id) {
            f(&mut node.local);
            self.dirty = true;
        }
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_opt_mut(id) {
            n.parent = None;
        }
    }

    fn update_world_recursive(&mut self, id: NodeId, parent_tf: DAffine3) -> Option<Aabb3D> {
        let (world_tf, content_bounds, child_ids) = {
            let node = self.node_opt_mut(id)?;
            let world_tf = parent_tf * node.local.transform;
            let content_bounds = content_world_bounds(&node.local.content, &world_tf);
            node.world.transform = world_tf;
            node.world.content_bounds = content_bounds;
            (world_tf, content_bounds, node.children.clone())
        };

        let mut subtree = content_bounds;
        for child in child_ids {
            if let Some(b) = self.update_world_recursive(child, world_tf) {
                subtree = Some(subtree.map_or(b, |s| union_aabb(s, b)));
            }
        }
        if let Some(node) = self.node_opt_mut(id) {
            node.world.subtree_bounds = subtree;
        }
        subtree
    }
}

/// World AABB of a node's own content.
fn content_world_bounds(content: &NodeContent, world: &DAffine3) -> Option<Aabb3D> {
    match content {
        NodeContent::Empty => None,
        NodeContent::Collision(c) => c
            .solids
            .iter()
            .filter_map(|s| s.transformed(world).bounds())
            .reduce(union_aabb),
        NodeContent::Mesh(m) => Aabb3D::from_points(
            m.triangles
                .iter()
                .flatten()
                .map(|v| world.transform_point3(*v).to_array()),
        ),
    }
}
