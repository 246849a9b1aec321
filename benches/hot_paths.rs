use std::f64::consts::TAU;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::DVec2;

use tui_geoquiz::data::builtin_world;
use tui_geoquiz::map::{
    point_in_ring, resolve_click, BufferConfig, LayerState, MapRenderer, Viewport, WorldBuffer,
};

/// Roughly circular ring with `n` vertices, like a detailed coastline
fn circle_ring(n: usize) -> Vec<DVec2> {
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * TAU;
            DVec2::new(10.0 * a.cos(), 10.0 * a.sin())
        })
        .collect()
}

fn bench_point_in_ring(c: &mut Criterion) {
    let ring = circle_ring(2_000);
    c.bench_function("point_in_ring 2k vertices", |b| {
        b.iter(|| point_in_ring(black_box(DVec2::new(3.0, 4.0)), black_box(&ring)))
    });
}

fn bench_buffer_build(c: &mut Criterion) {
    let dataset = builtin_world();
    let mut buffer = WorldBuffer::new(dataset.features(), BufferConfig::default());
    c.bench_function("world buffer rebuild", |b| {
        b.iter(|| buffer.build(black_box(360.0)))
    });
}

fn bench_resolve_click(c: &mut Criterion) {
    let dataset = builtin_world();
    let buffer = WorldBuffer::new(dataset.features(), BufferConfig::default());
    c.bench_function("resolve_click land", |b| {
        b.iter(|| resolve_click(&buffer, &dataset, black_box(362.35), black_box(48.85)))
    });
    c.bench_function("resolve_click ocean", |b| {
        b.iter(|| resolve_click(&buffer, &dataset, black_box(-150.0), black_box(-20.0)))
    });
}

fn bench_render(c: &mut Criterion) {
    let dataset = builtin_world();
    let buffer = WorldBuffer::new(dataset.features(), BufferConfig::default());
    let renderer = MapRenderer::new();
    let mut layers = LayerState::new();
    layers.set_hover(Some("FRA"));
    let viewport = Viewport::world(320, 160);
    c.bench_function("render world 160x40 cells", |b| {
        b.iter(|| renderer.render(&buffer, &layers, black_box(&viewport)))
    });
}

criterion_group!(
    benches,
    bench_point_in_ring,
    bench_buffer_build,
    bench_resolve_click,
    bench_render
);
criterion_main!(benches);
