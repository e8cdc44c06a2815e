// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Morton tree basics.
//!
//! Build a tree over a patch of points, walk it, and query a box.
//!
//! Run:
//! - `cargo run -p tacticsgrid_demos --example morton_tree_basics`

use tacticsgrid_index::{Aabb3D, BuildOptions, Entry, MortonTree};

fn main() {
    // A 10x10 patch of points with two alternating keys.
    let mut entries = Vec::new();
    for x in 0..10 {
        for y in 0..10 {
            let p = [f64::from(x), f64::from(y), 0.0];
            entries.push(Entry {
                origin: p,
                bounds: Aabb3D::from_point(p),
                key: (x + y) % 2,
                payload: (x, y),
            });
        }
    }
    let tree = MortonTree::build(entries, BuildOptions::new(true));
    println!("{tree:?}");

    for idx in tree.preorder() {
        let Some(node) = tree.node(idx) else {
            continue;
        };
        println!(
            "node {:>3}: prefix {:0width$b} groups {}",
            idx.get(),
            node.prefix(),
            node.groups().len(),
            width = node.prefix_len() as usize,
        );
    }

    let hits: Vec<_> = tree
        .query_aabb(&Aabb3D::new([2.0, 2.0, 0.0], [3.0, 3.0, 0.0]))
        .collect();
    println!("hits in [2,3]x[2,3]: {hits:?}");
}
