//! Placement benchmarks for township_core.
//!
//! Run with: `cargo bench -p township_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Quat, Vec2, Vec3};
use township_core::grid::{Bounds, Cell, GridCoordinateSystem};
use township_core::ledger::{OccupancyLayer, OccupancyLedger};

/// Footprint computation for a rotated 3x5 building.
pub fn footprint_benchmark(c: &mut Criterion) {
    let grid = GridCoordinateSystem::default();
    let rotation = Quat::from_rotation_y(37f32.to_radians());

    c.bench_function("footprint_of_rotated", |b| {
        b.iter(|| {
            let bounds = Bounds::of_rotated_rect(
                Vec2::ZERO,
                Vec2::new(3.0, 5.0),
                black_box(Vec3::new(12.0, 0.0, -7.0)),
                black_box(rotation),
            );
            grid.footprint_of(&bounds)
        })
    });
}

/// Free-cell queries against a ledger holding a 64x64 town.
pub fn ledger_benchmark(c: &mut Criterion) {
    let mut ledger = OccupancyLedger::new();
    ledger.occupy(
        OccupancyLayer::Structures,
        (0..64).flat_map(|x| (0..64).filter(move |z| (x + z) % 3 == 0).map(move |z| Cell::new(x, z))),
    );
    let query: Vec<Cell> = (20..24)
        .flat_map(|x| (40..44).map(move |z| Cell::new(x, z)))
        .collect();

    c.bench_function("are_free_4x4", |b| {
        b.iter(|| ledger.are_free(OccupancyLayer::Structures, black_box(&query).iter().copied()))
    });
}

criterion_group!(benches, footprint_benchmark, ledger_benchmark);
criterion_main!(benches);
