// Copyright 2025 the Espalier Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use espalier_tree::{Alignment, Dim, MeasureSpec, NodeFlags, NodeId, NodeKind, Tree};
use kurbo::Size;

/// Build a uniform tree of the given fanout and depth. Leaves get fixed
/// pixel dimensions so the wrap-content arithmetic has real work to do.
fn build_tree(fanout: usize, depth: usize) -> (Tree, NodeId, u64) {
    let mut tree = Tree::new();
    let root = tree.create(NodeKind(0), NodeFlags::empty());
    tree.set_alignment(root, Alignment::Center);
    let mut count = 1_u64;
    let mut frontier = vec![root];
    for level in 1..=depth {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for &parent in &frontier {
            for _ in 0..fanout {
                let child = tree.create(NodeKind(0), NodeFlags::empty());
                if level == depth {
                    tree.set_width(child, Dim::px(40.0));
                    tree.set_height(child, Dim::px(20.0));
                }
                tree.add_child(parent, child).unwrap();
                next.push(child);
                count += 1;
            }
        }
        frontier = next;
    }
    (tree, root, count)
}

fn bench_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure");
    for &(fanout, depth) in &[(4_usize, 3_usize), (8, 3), (4, 5)] {
        let (mut tree, root, count) = build_tree(fanout, depth);
        group.throughput(Throughput::Elements(count));
        group.bench_function(format!("fanout{fanout}_depth{depth}"), |b| {
            b.iter(|| {
                let size = tree
                    .measure(black_box(root), MeasureSpec::tight(Size::new(800.0, 600.0)))
                    .unwrap();
                black_box(size)
            });
        });
    }
    group.finish();
}

fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure_layout_and_draw");
    for &(fanout, depth) in &[(4_usize, 3_usize), (8, 3)] {
        let (mut tree, root, count) = build_tree(fanout, depth);
        group.throughput(Throughput::Elements(count));
        group.bench_function(format!("fanout{fanout}_depth{depth}"), |b| {
            b.iter(|| {
                let size = tree.measure_layout_and_draw(black_box(root)).unwrap();
                black_box(size)
            });
        });
    }
    group.finish();
}

fn bench_build_and_dispose(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_dispose");
    let fanout = 8_usize;
    let depth = 3_usize;
    let (_, _, count) = build_tree(fanout, depth);
    group.throughput(Throughput::Elements(count));
    group.bench_function(format!("fanout{fanout}_depth{depth}"), |b| {
        b.iter_batched(
            || (),
            |()| {
                let (mut tree, root, _) = build_tree(fanout, depth);
                tree.dispose(root);
                black_box(tree)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_measure,
    bench_full_frame,
    bench_build_and_dispose
);
criterion_main!(benches);
