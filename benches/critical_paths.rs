//! Criterion benchmarks for stitchbook critical paths
//!
//! - Usage tracker: acquire/release churn across a palette
//! - Sparse map: merging partial cells into an occupied grid
//! - Pattern: placing and removing stitches end to end

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use stitchbook::color::{Color, Rgb};
use stitchbook::pattern::Pattern;
use stitchbook::registry::ColorUsageTracker;
use stitchbook::sparse_map::{Coord, SparseMap};
use stitchbook::stitch::{Element, ElementId, Quadrant, Stitch, StitchCell, StitchKind, WeightTable};

fn make_palette(n: u8) -> Vec<Arc<Color>> {
    (0..n).map(|i| Arc::new(Color::new(format!("c{}", i), "bench", Rgb::new(i, i, i)))).collect()
}

fn make_stitches(count: usize, palette: &[Arc<Color>]) -> Vec<Stitch> {
    let weights = WeightTable::default();
    (0..count)
        .map(|i| {
            let color = Arc::clone(&palette[i % palette.len()]);
            Stitch::new(ElementId(i as u64), StitchKind::Full, color, &weights)
        })
        .collect()
}

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker");
    let palette = make_palette(32);

    for count in [1_000usize, 10_000, 50_000] {
        let stitches = make_stitches(count, &palette);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("acquire_release", count), &stitches, |b, s| {
            b.iter(|| {
                let mut tracker = ColorUsageTracker::new();
                for stitch in s {
                    tracker.acquire(stitch).unwrap();
                }
                for stitch in s.iter().step_by(2) {
                    tracker.release(black_box(stitch.id()));
                }
                black_box(tracker.total_weight())
            });
        });
    }
    group.finish();
}

fn bench_sparse_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_map");
    let quadrants =
        [Quadrant::TopLeft, Quadrant::TopRight, Quadrant::BottomLeft, Quadrant::BottomRight];

    for side in [32i32, 128] {
        group.throughput(Throughput::Elements((side * side * 4) as u64));
        group.bench_with_input(BenchmarkId::new("merge_quarters", side), &side, |b, &side| {
            b.iter(|| {
                let mut map: SparseMap<StitchCell> = SparseMap::new();
                let mut id = 0;
                for row in 0..side {
                    for col in 0..side {
                        for q in quadrants {
                            let cell = StitchCell::single(ElementId(id), StitchKind::Quarter(q));
                            map.merge(Coord::new(col, row), &cell);
                            id += 1;
                        }
                    }
                }
                black_box(map.len())
            });
        });
    }
    group.finish();
}

fn bench_pattern(c: &mut Criterion) {
    let palette = make_palette(16);
    c.bench_function("pattern_place_remove_10k", |b| {
        b.iter(|| {
            let mut pattern = Pattern::default();
            let mut ids = Vec::with_capacity(10_000);
            for i in 0..10_000i32 {
                let color = Arc::clone(&palette[(i % 16) as usize]);
                let pos = Coord::new(i % 100, i / 100);
                ids.push(pattern.place(pos, StitchKind::Full, Some(color)).unwrap());
            }
            for id in ids.into_iter().step_by(3) {
                pattern.remove_stitch(id);
            }
            black_box(pattern.usage().total_weight())
        });
    });
}

criterion_group!(benches, bench_tracker, bench_sparse_map, bench_pattern);
criterion_main!(benches);
