//! Performance benchmarks for edit-graph traversal and name parsing.
//!
//! Run with: `cargo bench --bench traversal`
//!
//! ## Shapes
//!
//! | Graph | Paths per leaf | Notes |
//! |-------|----------------|-------|
//! | Chain | 1 | Deep nesting, one route |
//! | Fan-in | 1 per leaf | Many shots cut into one master |
//! | Lattice | 2^depth | Every level has two containers |
//! | Ring | 0 or 1 | Every walk closes a cycle |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pipeline_context::{
    collect_edit_units, up_version, EditGraph, EditGraphBuilder, NamingConvention, SequenceId,
    SequenceInfo, TrackRef,
};

fn seq(i: usize) -> SequenceInfo {
    SequenceInfo::new(format!("/Game/Cine/S{}", i), format!("S{}", i))
}

/// Leaf nested `depth` levels deep.
fn make_chain(depth: usize) -> (EditGraph, SequenceId) {
    let mut b = EditGraphBuilder::new();
    let ids: Vec<_> = (0..=depth).map(|i| b.add_sequence(seq(i))).collect();
    for pair in ids.windows(2) {
        b.add_edit(pair[0], pair[1], TrackRef::new("Subs", 0)).unwrap();
    }
    (b.build(), ids[0])
}

/// `width` shots cut into one master.
fn make_fan_in(width: usize) -> EditGraph {
    let mut b = EditGraphBuilder::new();
    let master = b.add_sequence(seq(0));
    for i in 1..=width {
        let shot = b.add_sequence(seq(i));
        b.add_edit(shot, master, TrackRef::new("Shots", i as u32)).unwrap();
    }
    b.build()
}

/// Two containers per level, each containing both nodes of the level below.
fn make_lattice(depth: usize) -> (EditGraph, SequenceId) {
    let mut b = EditGraphBuilder::new();
    let leaf = b.add_sequence(seq(0));
    let mut below = vec![leaf];
    let mut next = 1;
    for _ in 0..depth {
        let level: Vec<_> = (0..2)
            .map(|_| {
                next += 1;
                b.add_sequence(seq(next))
            })
            .collect();
        for child in &below {
            for parent in &level {
                b.add_edit(*child, *parent, TrackRef::new("Subs", 0)).unwrap();
            }
        }
        below = level;
    }
    (b.build(), leaf)
}

/// `size` sequences in a ring.
fn make_ring(size: usize) -> (EditGraph, SequenceId) {
    let mut b = EditGraphBuilder::new();
    let ids: Vec<_> = (0..size).map(|i| b.add_sequence(seq(i))).collect();
    for i in 0..size {
        b.add_edit(ids[i], ids[(i + 1) % size], TrackRef::new("Subs", 0)).unwrap();
    }
    (b.build(), ids[0])
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");

    for depth in [4, 16, 64] {
        let (graph, leaf) = make_chain(depth);
        group.bench_with_input(BenchmarkId::new("depth", depth), &leaf, |b, leaf| {
            b.iter(|| {
                let traversal = graph.all_paths(black_box(*leaf));
                assert_eq!(traversal.paths.len(), 1);
                traversal
            })
        });
    }

    group.finish();
}

fn bench_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_in_units");

    for width in [10, 100, 1000] {
        let graph = make_fan_in(width);
        let leaves = graph.leaves();
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("shots", width), &leaves, |b, leaves| {
            b.iter(|| {
                let units = collect_edit_units(&graph, black_box(leaves));
                assert_eq!(units.units.len(), width);
                units
            })
        });
    }

    group.finish();
}

fn bench_lattice(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice");

    for depth in [2, 6, 10] {
        let (graph, leaf) = make_lattice(depth);
        group.throughput(Throughput::Elements(1 << depth));
        group.bench_with_input(BenchmarkId::new("depth", depth), &leaf, |b, leaf| {
            b.iter(|| {
                let traversal = graph.all_paths(black_box(*leaf));
                assert_eq!(traversal.paths.len(), 1 << depth);
                traversal
            })
        });
    }

    group.finish();
}

fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring");

    for size in [2, 16, 128] {
        let (graph, start) = make_ring(size);
        group.bench_with_input(BenchmarkId::new("size", size), &start, |b, start| {
            b.iter(|| {
                let traversal = graph.all_paths(black_box(*start));
                assert_eq!(traversal.cycles.len(), 1);
                traversal
            })
        });
    }

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let naming = NamingConvention::default();

    c.bench_function("parse_shot_path", |b| {
        b.iter(|| naming.parse_shot_path(black_box("/Game/Scenes/SCN/SCN_010/LAY/Cam")))
    });

    c.bench_function("parse_media_file", |b| {
        b.iter(|| naming.parse_media_file(black_box("/renders/SCN_010_Lighting.mov")))
    });

    c.bench_function("up_version", |b| b.iter(|| up_version(black_box("Layout v041"))));
}

criterion_group!(
    benches,
    bench_chain,
    bench_fan_in,
    bench_lattice,
    bench_ring,
    bench_parsing,
);

criterion_main!(benches);
