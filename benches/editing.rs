use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glam::IVec3;

use voxed::core::types::{Axis, VoxelId};
use voxed::document::index::GridIndex;
use voxed::math::GridBox;
use voxed::{Engine, Rgba};

fn sphere_positions(radius: i32) -> Vec<IVec3> {
    let mut out = Vec::new();
    let r2 = radius * radius;
    for x in -radius..=radius {
        for y in -radius..=radius {
            for z in -radius..=radius {
                if x * x + y * y + z * z <= r2 {
                    out.push(IVec3::new(x, y, z));
                }
            }
        }
    }
    out
}

fn bench_index_fill_16(c: &mut Criterion) {
    let positions = sphere_positions(16);

    c.bench_function("index_fill_r16", |b| {
        b.iter(|| {
            let mut index = GridIndex::with_capacity(0);
            for (i, pos) in positions.iter().enumerate() {
                index.insert(black_box(*pos), VoxelId(i as u64));
            }
            index.len()
        });
    });
}

fn bench_index_range_query(c: &mut Criterion) {
    let positions = sphere_positions(16);
    let mut index = GridIndex::with_capacity(0);
    for (i, pos) in positions.iter().enumerate() {
        index.insert(*pos, VoxelId(i as u64));
    }

    c.bench_function("index_cube_query_r4", |b| {
        b.iter(|| index.search(black_box(IVec3::ZERO), black_box(4)).len());
    });

    c.bench_function("index_slice_query", |b| {
        b.iter(|| index.search_box(black_box(&GridBox::slice(Axis::Z, 0))).len());
    });
}

fn filled_engine(radius: i32) -> Engine {
    let mut engine = Engine::new();
    let layer = engine.create_layer("bench");
    engine.select_layer(Some(layer));
    engine.fill_range(IVec3::ZERO, radius, Rgba::rgb(180, 90, 30));
    engine
}

fn bench_diff_poll(c: &mut Criterion) {
    let mut engine = filled_engine(8);
    // register and drain the first full fetch
    engine.poll_visible("bench");

    c.bench_function("diff_poll_after_point_edit", |b| {
        let mut toggle = false;
        b.iter(|| {
            let pos = IVec3::new(40, 0, 0);
            if toggle {
                let id = engine.search_voxel(pos, true).unwrap().id;
                engine.remove_voxel(id);
            } else {
                let _ = engine.add_voxel(Rgba::rgb(1, 2, 3), None, pos);
            }
            toggle = !toggle;
            black_box(engine.poll_visible("bench"))
        });
    });
}

fn bench_composition(c: &mut Criterion) {
    let mut engine = filled_engine(10);

    c.bench_function("visible_composition_rebuild", |b| {
        b.iter(|| {
            // a tiny edit invalidates, the read rebuilds
            engine.fill_range(IVec3::new(50, 0, 0), 0, Rgba::rgb(9, 9, 9));
            engine.undo();
            black_box(engine.visible_voxels().len())
        });
    });
}

criterion_group!(
    benches,
    bench_index_fill_16,
    bench_index_range_query,
    bench_diff_poll,
    bench_composition
);
criterion_main!(benches);
