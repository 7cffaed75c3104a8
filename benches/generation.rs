use criterion::{Criterion, black_box, criterion_group, criterion_main};

use wildscape::generation::{ForestPlanner, VegetationSettings};
use wildscape::terrain::{HeightField, HeightFieldParams, TerrainMesh};

fn bench_height_sampling(c: &mut Criterion) {
    let field = HeightField::new(HeightFieldParams {
        warp_strength: 0.4,
        terrace_steps: 5,
        enable_rivers: true,
        enable_craters: true,
        ..Default::default()
    });

    c.bench_function("height_sample_full_pipeline", |b| {
        b.iter(|| field.height(black_box(0.37), black_box(0.58)));
    });
}

fn bench_terrain_mesh_128(c: &mut Criterion) {
    let field = HeightField::new(HeightFieldParams::default());

    c.bench_function("terrain_mesh_128", |b| {
        b.iter(|| TerrainMesh::generate(black_box(&field), 128));
    });
}

fn bench_forest_build(c: &mut Criterion) {
    let field = HeightField::new(HeightFieldParams::default());
    let settings = VegetationSettings {
        coverage: 20,
        tree_size: 15,
        leaf_density: 10,
    };

    c.bench_function("forest_build", |b| {
        b.iter(|| ForestPlanner::new(&field, settings.clone()).build(black_box(1337)));
    });
}

criterion_group!(
    benches,
    bench_height_sampling,
    bench_terrain_mesh_128,
    bench_forest_build
);
criterion_main!(benches);
