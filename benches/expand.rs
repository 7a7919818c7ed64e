use criterion::{black_box, criterion_group, criterion_main, Criterion};

use furshell::fur::density::FurDensityMap;
use furshell::fur::shell::{expand_shells, SurfaceVertex};

use glam::{Vec2, Vec3};

fn test_quad(subdivisions: u32) -> Vec<SurfaceVertex> {
    let mut vertices = Vec::new();
    let step = 1.0 / subdivisions as f32;
    for row in 0..subdivisions {
        for col in 0..subdivisions {
            let x0 = col as f32 * step;
            let z0 = row as f32 * step;
            let corners = [
                (x0, z0),
                (x0 + step, z0),
                (x0 + step, z0 + step),
                (x0, z0),
                (x0 + step, z0 + step),
                (x0, z0 + step),
            ];
            for (x, z) in corners {
                vertices.push(SurfaceVertex {
                    position: Vec3::new(x, 0.0, z),
                    normal: Vec3::Y,
                    uv: Vec2::new(x, z),
                });
            }
        }
    }
    vertices
}

fn bench_expand_shells_30_layers(c: &mut Criterion) {
    let base = test_quad(32);

    c.bench_function("expand_shells_30_layers", |b| {
        b.iter(|| expand_shells(black_box(&base), black_box(30), black_box(0.1)));
    });
}

fn bench_expand_shells_60_layers(c: &mut Criterion) {
    let base = test_quad(32);

    c.bench_function("expand_shells_60_layers", |b| {
        b.iter(|| expand_shells(black_box(&base), black_box(60), black_box(0.1)));
    });
}

fn bench_density_map_256(c: &mut Criterion) {
    c.bench_function("density_map_256", |b| {
        b.iter(|| FurDensityMap::generate(black_box(256), 256, 30, 0.7, 42));
    });
}

fn bench_density_map_1024(c: &mut Criterion) {
    c.bench_function("density_map_1024", |b| {
        b.iter(|| FurDensityMap::generate(black_box(1024), 1024, 30, 0.7, 42));
    });
}

criterion_group!(
    benches,
    bench_expand_shells_30_layers,
    bench_expand_shells_60_layers,
    bench_density_map_256,
    bench_density_map_1024
);
criterion_main!(benches);
