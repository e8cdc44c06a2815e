// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use tacticsgrid_nav::{ScanParams, scan_level};
use tacticsgrid_scene::level::{Element, build_level, playground};
use tacticsgrid_scene::{CollideMask, NodeId, OptimizeOptions, Scene, optimize_collisions};

// The playground plus an n x n patch of tiles, each its own mesh node.
fn gen_level(n: usize, optimize: bool) -> (Scene, NodeId) {
    let mut elements = playground();
    for y in 0..n {
        for x in 0..n {
            elements.push(Element::Square {
                origin: DVec3::new(20.0 + x as f64, y as f64, 0.0),
                a: DVec3::X,
                b: DVec3::Y,
            });
        }
    }
    let mut scene = Scene::new();
    let root = build_level(&mut scene, None, &elements);
    scene.commit();
    if optimize {
        let options = OptimizeOptions {
            convert_geometry: true,
            ..Default::default()
        };
        optimize_collisions(&mut scene, root, options).expect("level is well formed");
    }
    (scene, root)
}

fn bench_probes(c: &mut Criterion) {
    let mut group = c.benchmark_group("probes");
    for &optimize in &[false, true] {
        let label = if optimize { "optimized" } else { "flat" };
        let (scene, root) = gen_level(16, optimize);
        let rays: Vec<_> = (0..32)
            .flat_map(|x| (0..32).map(move |y| DVec3::new(x as f64, y as f64 * 0.5, 50.0)))
            .collect();
        group.throughput(Throughput::Elements(rays.len() as u64));
        group.bench_function(format!("ray_down_{label}"), |b| {
            let mut session = scene.session(root).expect("scene is committed");
            b.iter(|| {
                for origin in &rays {
                    let hits = session
                        .ray_hits(*origin, DVec3::NEG_Z, CollideMask::LEVEL)
                        .expect("level is well formed");
                    black_box(hits.len());
                }
            });
        });
        group.bench_function(format!("sphere_{label}"), |b| {
            let mut session = scene.session(root).expect("scene is committed");
            b.iter(|| {
                for origin in &rays {
                    let center = DVec3::new(origin.x, origin.y, 1.0);
                    black_box(
                        session
                            .sphere_overlaps(center, 0.8, CollideMask::LEVEL)
                            .expect("level is well formed"),
                    );
                }
            });
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_level");
    group.sample_size(10);
    for &optimize in &[false, true] {
        let label = if optimize { "optimized" } else { "flat" };
        let (scene, root) = gen_level(8, optimize);
        let params = ScanParams {
            step: 1.0,
            ..Default::default()
        };
        group.bench_function(label, |b| {
            b.iter(|| black_box(scan_level(&scene, root, &params).expect("scan succeeds")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_probes, bench_scan);
criterion_main!(benches);
