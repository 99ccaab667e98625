//! Lingo Benchmark Suite
//!
//! Targets:
//!   binary_review_single ............ < 1μs
//!   graded_review_single ............ < 1μs
//!   review_queue_1000_items ......... < 500μs
//!   review_stats_1000_items ......... < 200μs

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use lingo_bench::{base_time, make_collection, make_item};
use lingo_core::due;
use lingo_core::scheduler::{binary, graded};
use lingo_core::stats;
use lingo_core::{LearnerId, Quality};

/// Benchmark: single binary review.
fn bench_binary_review(c: &mut Criterion) {
    let item = make_item(LearnerId::new(), 3);
    let now = base_time();
    c.bench_function("binary_review_single", |b| {
        b.iter_batched(
            || item.clone(),
            |mut it| {
                binary::review(&mut it, black_box(true), now);
                black_box(it);
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: single graded review.
fn bench_graded_review(c: &mut Criterion) {
    let item = make_item(LearnerId::new(), 3);
    let now = base_time();
    let q = Quality::new(4).expect("valid");
    c.bench_function("graded_review_single", |b| {
        b.iter_batched(
            || item.clone(),
            |mut it| {
                graded::review(&mut it, black_box(q), now);
                black_box(it);
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: prioritized queue over 1000 items.
fn bench_review_queue(c: &mut Criterion) {
    let items = make_collection(1000);
    let now = base_time();
    c.bench_function("review_queue_1000_items", |b| {
        b.iter(|| {
            let queue = due::review_queue(black_box(&items), now, 20);
            black_box(queue);
        });
    });
}

/// Benchmark: statistics over 1000 items.
fn bench_review_stats(c: &mut Criterion) {
    let items = make_collection(1000);
    let now = base_time();
    c.bench_function("review_stats_1000_items", |b| {
        b.iter(|| {
            let s = stats::review_stats(black_box(&items), now);
            black_box(s);
        });
    });
}

criterion_group!(
    benches,
    bench_binary_review,
    bench_graded_review,
    bench_review_queue,
    bench_review_stats,
);
criterion_main!(benches);
