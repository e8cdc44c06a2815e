// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scan the playground level.
//!
//! Build the playground, optimize its collisions, scan it into a navigation
//! graph, and print a summary plus a few lookups and sight lines. Set `RUST_LOG=info` to see
//! each stage.
//!
//! Run:
//! - `cargo run -p tacticsgrid_demos --example scan_playground`

use glam::DVec3;
use tacticsgrid_nav::{ScanParams, VisibilityParams, debug, determine_visibility, scan_level};
use tacticsgrid_scene::{OptimizeOptions, Scene, level, optimize_collisions};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let root = level::build_level(&mut scene, None, &level::playground());
    scene.commit();

    let options = OptimizeOptions {
        convert_geometry: true,
        ..Default::default()
    };
    let report = optimize_collisions(&mut scene, root, options).expect("playground is well formed");
    println!(
        "optimized {} solids into {} groups under {} internal nodes (depth {})",
        report.solids, report.groups, report.internal_nodes, report.depth
    );

    let params = ScanParams::default();
    let graph = scan_level(&scene, root, &params).expect("scan succeeds");
    println!("{} cells, {} edges", graph.len(), graph.edge_count());
    if let Some(extent) = graph.extent() {
        println!("extent: {extent:?}");
    }

    // Towers, bridge and ramp.
    let stacked = graph
        .cells()
        .iter()
        .filter(|c| c.position.z > 0.5)
        .count();
    println!("{stacked} cells above the ground");

    for probe in [DVec3::ZERO, DVec3::new(4.0, 4.0, 3.0), DVec3::new(-10.0, 0.0, 0.0)] {
        if let Some(id) = graph.nearest(probe) {
            let cell = graph.cell(id).expect("nearest returns a valid id");
            println!(
                "nearest to {probe}: {id:?} at {} with {} neighbours",
                cell.position,
                graph.neighbors(id).count()
            );
        }
    }

    let lines = debug::edge_lines(&graph, 0.05);
    let steep = lines.iter().filter(|l| l.color[0] > 0.5).count();
    log::info!("{} debug lines, {steep} of them steep climbs", lines.len());

    // Every pair is swept, so check sight lines on a coarser grid.
    let coarse = ScanParams {
        step: 2.0,
        ..params
    };
    let coarse = scan_level(&scene, root, &coarse).expect("scan succeeds");
    let mut session = scene.session(root).expect("scene is committed");
    let visibility = determine_visibility(
        &mut session,
        coarse.cells(),
        VisibilityParams::default(),
        params.mask,
    )
    .expect("sight lines succeed");
    let sight = debug::visibility_lines(&coarse, &visibility, 0.05).expect("ids come from the graph");
    println!("{} coarse cells, {} mutually visible pairs", coarse.len(), sight.len());
}
