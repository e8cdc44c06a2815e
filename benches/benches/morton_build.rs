// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tacticsgrid_index::{Aabb3D, BuildOptions, Entry, MortonTree};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

// Unit boxes on an n x n floor, keyed in 4 groups.
fn gen_floor(n: usize) -> Vec<Entry<u8, usize>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let p = [x as f64, y as f64, 0.0];
            out.push(Entry {
                origin: p,
                bounds: Aabb3D::new(p, [p[0] + 1.0, p[1] + 1.0, 0.0]),
                key: ((x + y) % 4) as u8,
                payload: out.len(),
            });
        }
    }
    out
}

// Points scattered through a cube, all with one key.
fn gen_cloud(count: usize, size: f64) -> Vec<Entry<u8, usize>> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|i| {
            let p = [
                rng.next_f64() * size,
                rng.next_f64() * size,
                rng.next_f64() * size,
            ];
            Entry {
                origin: p,
                bounds: Aabb3D::from_point(p).inflate(0.5),
                key: 0,
                payload: i,
            }
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("morton_build");
    for &n in &[32usize, 64, 128] {
        let entries = gen_floor(n);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("floor_n{n}_ignore_z"), |b| {
            b.iter_batched(
                || entries.clone(),
                |entries| black_box(MortonTree::build(entries, BuildOptions::new(true))),
                BatchSize::SmallInput,
            );
        });
    }
    for &count in &[1_000usize, 10_000] {
        let entries = gen_cloud(count, 100.0);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("cloud_{count}"), |b| {
            b.iter_batched(
                || entries.clone(),
                |entries| black_box(MortonTree::build(entries, BuildOptions::new(false))),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("morton_query");
    let tree = MortonTree::build(gen_floor(128), BuildOptions::new(true));
    let probe = Aabb3D::new([40.0, 40.0, -1.0], [48.0, 48.0, 1.0]);
    group.bench_function("floor_n128_box", |b| {
        b.iter(|| black_box(tree.query_aabb(black_box(&probe)).count()));
    });
    let tree = MortonTree::build(gen_cloud(10_000, 100.0), BuildOptions::new(false));
    let probe = Aabb3D::new([10.0, 10.0, 10.0], [20.0, 20.0, 20.0]);
    group.bench_function("cloud_10000_box", |b| {
        b.iter(|| black_box(tree.query_aabb(black_box(&probe)).count()));
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
