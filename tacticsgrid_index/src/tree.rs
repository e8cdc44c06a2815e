// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Morton-ordered bounding-volume tree.
//!
//! The tree is built in one pass: every entry gets a Morton code from the
//! [`Lattice`] spanning all entry origins, entries are sorted by
//! `(code, key)`, and the sorted array is partitioned recursively by 3-bit
//! Morton digit. Because the array is sorted, the entries that share a digit
//! at any level form a contiguous run, so no level needs to re-sort.
//!
//! Leaves hold *groups*: maximal runs of consecutive entries with equal keys.
//! Callers use the key for whatever must be identical within a group (in the
//! scene crate it is a transform, a layer mask and a name/tag identity).

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::morton::{LEVELS, Lattice, ROOT_SHIFT, digit};
use crate::types::{Aabb3D, union_aabb};

/// Input to [`MortonTree::build`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<K, P> {
    /// Representative point; only this point decides where the entry lands.
    pub origin: [f64; 3],
    /// Bounds of the entry, used for node bounding volumes and queries.
    pub bounds: Aabb3D,
    /// Grouping key; consecutive entries with equal keys share a leaf group.
    pub key: K,
    /// User payload.
    pub payload: P,
}

/// Build-time options.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Do not subdivide along z. Useful for flat levels.
    pub ignore_z: bool,
    /// A run whose parent span holds at most this many entries becomes a leaf.
    pub max_leaf_size: usize,
}

impl BuildOptions {
    /// Options with the customary leaf size: 4 for quadtree-like builds
    /// (`ignore_z`), 8 otherwise.
    pub const fn new(ignore_z: bool) -> Self {
        Self {
            ignore_z,
            max_leaf_size: if ignore_z { 4 } else { 8 },
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Index of a node in the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    /// Raw arena index.
    pub const fn get(self) -> usize {
        self.0
    }
}

/// A run of consecutive entries that share a key.
pub struct LeafGroup<K, P> {
    key: K,
    code: u64,
    bounds: Aabb3D,
    items: Vec<(Aabb3D, P)>,
}

impl<K, P> LeafGroup<K, P> {
    /// Key shared by every entry of the group.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Morton code of the first entry.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// Union of the entry bounds.
    pub fn bounds(&self) -> Aabb3D {
        self.bounds
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for groups produced by the builder.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Payloads in Morton order.
    pub fn payloads(&self) -> impl Iterator<Item = &P> + '_ {
        self.items.iter().map(|(_, p)| p)
    }

    fn open(key: K, code: u64, bounds: Aabb3D, payload: P) -> Self {
        Self {
            key,
            code,
            bounds,
            items: vec![(bounds, payload)],
        }
    }

    fn push(&mut self, bounds: Aabb3D, payload: P) {
        self.bounds = union_aabb(self.bounds, bounds);
        self.items.push((bounds, payload));
    }
}

impl<K: Debug, P> Debug for LeafGroup<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LeafGroup")
            .field("key", &self.key)
            .field("code", &self.code)
            .field("len", &self.items.len())
            .finish_non_exhaustive()
    }
}

/// Node payload: either leaf groups or up to eight children keyed by digit.
pub enum NodeKind<K, P> {
    /// Terminal run of entries.
    Leaf(Vec<LeafGroup<K, P>>),
    /// Children indexed by the 3-bit Morton digit; `None` for empty buckets.
    Internal {
        /// Child per digit.
        children: [Option<NodeIdx>; 8],
    },
}

impl<K: Debug, P> Debug for NodeKind<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Leaf(groups) => f.debug_tuple("Leaf").field(groups).finish(),
            Self::Internal { children } => f
                .debug_struct("Internal")
                .field("children", children)
                .finish(),
        }
    }
}

/// A node of the tree.
pub struct Node<K, P> {
    bounds: Aabb3D,
    prefix: u64,
    shift: u32,
    kind: NodeKind<K, P>,
}

impl<K, P> Node<K, P> {
    /// Bounding volume of everything below this node.
    pub fn bounds(&self) -> Aabb3D {
        self.bounds
    }

    /// Morton digits shared by every entry below this node.
    ///
    /// This is the code shifted right by [`Node::shift`]; it has
    /// [`Node::prefix_len`] significant bits.
    pub fn prefix(&self) -> u64 {
        self.prefix
    }

    /// Number of low code bits not fixed by this node's position.
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Number of bits in [`Node::prefix`].
    pub fn prefix_len(&self) -> u32 {
        ROOT_SHIFT - self.shift
    }

    /// Leaf groups or children.
    pub fn kind(&self) -> &NodeKind<K, P> {
        &self.kind
    }

    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Children in digit order. Empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        let children: &[Option<NodeIdx>] = match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal { children } => children,
        };
        children.iter().flatten().copied()
    }

    /// Leaf groups. Empty for internal nodes.
    pub fn groups(&self) -> &[LeafGroup<K, P>] {
        match &self.kind {
            NodeKind::Leaf(groups) => groups,
            NodeKind::Internal { .. } => &[],
        }
    }
}

impl<K: Debug, P> Debug for Node<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("bounds", &self.bounds)
            .field("prefix", &self.prefix)
            .field("shift", &self.shift)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Morton-ordered bounding-volume tree over user payloads.
pub struct MortonTree<K, P> {
    options: BuildOptions,
    root: Option<NodeIdx>,
    arena: Vec<Node<K, P>>,
    len: usize,
    depth: u32,
}

impl<K: Ord, P> MortonTree<K, P> {
    /// Build a tree over `entries`.
    ///
    /// An empty input produces an empty tree. A single entry produces a
    /// single leaf with one group.
    pub fn build(entries: Vec<Entry<K, P>>, options: BuildOptions) -> Self {
        let mut tree = Self {
            options,
            root: None,
            arena: Vec::new(),
            len: entries.len(),
            depth: 0,
        };
        let Some(extent) = Aabb3D::from_points(entries.iter().map(|e| e.origin)) else {
            return tree;
        };
        let lattice = Lattice::new(&extent, options.ignore_z);

        let mut coded: Vec<(u64, Entry<K, P>)> = entries
            .into_iter()
            .map(|e| (lattice.code(e.origin), e))
            .collect();
        // Stable: entries with equal (code, key) keep their input order.
        coded.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.key.cmp(&b.1.key)));

        let codes: Vec<u64> = coded.iter().map(|(c, _)| *c).collect();
        let mut items = coded.into_iter().map(|(_, e)| e);
        let root = if codes.len() == 1 {
            tree.push_leaf(&codes, 0, 1, ROOT_SHIFT, &mut items)
        } else {
            tree.build_run(&codes, 0, codes.len(), ROOT_SHIFT, 1, &mut items)
        };
        tree.root = Some(root);
        tree
    }

    /// Partition `codes[start..end]`, which all share the digits above `span`.
    fn build_run(
        &mut self,
        codes: &[u64],
        start: usize,
        end: usize,
        span: u32,
        level: u32,
        items: &mut impl Iterator<Item = Entry<K, P>>,
    ) -> NodeIdx {
        self.depth = self.depth.max(level);
        let child_span = span - 3;

        // digit -> (offset, count)
        let mut runs = [(0_usize, 0_usize); 8];
        for (i, code) in codes.iter().enumerate().take(end).skip(start) {
            let run = &mut runs[digit(*code, span)];
            if run.1 == 0 {
                run.0 = i;
            }
            run.1 += 1;
        }
        let non_empty = runs.iter().filter(|(_, n)| *n > 0).count();
        let count = end - start;

        let mut children = [None; 8];
        for (d, &(offset, n)) in runs.iter().enumerate() {
            if n == 0 {
                continue;
            }
            let leaf = count <= self.options.max_leaf_size
                || n == 1
                || non_empty == 1
                || child_span == 0;
            children[d] = Some(if leaf {
                self.push_leaf(codes, offset, offset + n, child_span, items)
            } else {
                self.build_run(codes, offset, offset + n, child_span, level + 1, items)
            });
        }

        let bounds = children
            .iter()
            .flatten()
            .map(|c| self.arena[c.get()].bounds)
            .reduce(union_aabb)
            .unwrap_or(Aabb3D::from_point([0.0; 3]));
        self.push(Node {
            bounds,
            prefix: codes[start] >> span,
            shift: span,
            kind: NodeKind::Internal { children },
        })
    }

    /// Emit `codes[start..end]` as one leaf, grouping equal keys.
    fn push_leaf(
        &mut self,
        codes: &[u64],
        start: usize,
        end: usize,
        span: u32,
        items: &mut impl Iterator<Item = Entry<K, P>>,
    ) -> NodeIdx {
        let mut groups: Vec<LeafGroup<K, P>> = Vec::new();
        for &code in &codes[start..end] {
            let Some(entry) = items.next() else {
                break;
            };
            match groups.last_mut() {
                Some(open) if open.key == entry.key => open.push(entry.bounds, entry.payload),
                _ => groups.push(LeafGroup::open(entry.key, code, entry.bounds, entry.payload)),
            }
        }
        let bounds = groups
            .iter()
            .map(LeafGroup::bounds)
            .reduce(union_aabb)
            .unwrap_or(Aabb3D::from_point([0.0; 3]));
        self.push(Node {
            bounds,
            prefix: codes[start] >> span,
            shift: span,
            kind: NodeKind::Leaf(groups),
        })
    }

    fn push(&mut self, node: Node<K, P>) -> NodeIdx {
        let idx = NodeIdx::new(self.arena.len());
        self.arena.push(node);
        idx
    }
}

impl<K, P> MortonTree<K, P> {
    /// Root node, `None` for an empty tree.
    pub fn root(&self) -> Option<NodeIdx> {
        self.root
    }

    /// Access a node by index.
    pub fn node(&self, idx: NodeIdx) -> Option<&Node<K, P>> {
        self.arena.get(idx.get())
    }

    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of materialized nodes, leaves included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of internal levels on the longest root-to-leaf path.
    ///
    /// Never exceeds [`LEVELS`]; a single-leaf tree has depth 0.
    pub fn depth(&self) -> u32 {
        debug_assert!(self.depth <= LEVELS, "depth bounded by digit count");
        self.depth
    }

    /// Options the tree was built with.
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// All leaf groups, in Morton order.
    pub fn groups(&self) -> impl Iterator<Item = &LeafGroup<K, P>> + '_ {
        self.preorder()
            .into_iter()
            .filter_map(|i| self.node(i))
            .flat_map(Node::groups)
    }

    /// Node indices in depth-first, digit-ascending order.
    pub fn preorder(&self) -> Vec<NodeIdx> {
        let mut out = Vec::with_capacity(self.arena.len());
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            out.push(i);
            if let Some(n) = self.node(i) {
                let before = stack.len();
                stack.extend(n.children());
                stack[before..].reverse();
            }
        }
        out
    }

    /// Payloads whose bounds intersect `aabb`.
    pub fn query_aabb(&self, aabb: &Aabb3D) -> vec::IntoIter<&P> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIdx> = self.root.into_iter().collect();
        while let Some(i) = stack.pop() {
            let Some(n) = self.node(i) else {
                continue;
            };
            if !n.bounds.intersects(aabb) {
                continue;
            }
            match &n.kind {
                NodeKind::Leaf(groups) => {
                    for g in groups.iter().filter(|g| g.bounds.intersects(aabb)) {
                        out.extend(
                            g.items
                                .iter()
                                .filter(|(b, _)| b.intersects(aabb))
                                .map(|(_, p)| p),
                        );
                    }
                }
                NodeKind::Internal { children } => stack.extend(children.iter().flatten()),
            }
        }
        out.into_iter()
    }
}

impl<K, P> Debug for MortonTree<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let leaves = self.arena.iter().filter(|n| n.is_leaf()).count();
        f.debug_struct("MortonTree")
            .field("options", &self.options)
            .field("len", &self.len)
            .field("arena_nodes", &self.arena.len())
            .field("leaves", &leaves)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
