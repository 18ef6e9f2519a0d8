//! Benchmarks for append growth and deque churn.
//!
//! Compares nexus-failfast against the std collections.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nexus_failfast::{ArrayList, LinkedList, Split};
use std::collections::VecDeque;

// ============================================================================
// Append growth
// ============================================================================

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for count in [1_000u64, 100_000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("array_list", count), &count, |b, &count| {
            b.iter(|| {
                let mut list = ArrayList::new();
                for i in 0..count {
                    list.add(black_box(i)).unwrap();
                }
                black_box(list.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("std_vec", count), &count, |b, &count| {
            b.iter(|| {
                let mut vec = Vec::new();
                for i in 0..count {
                    vec.push(black_box(i));
                }
                black_box(vec.len())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Deque churn
// ============================================================================

fn bench_deque(c: &mut Criterion) {
    let mut group = c.benchmark_group("deque_churn");

    // Steady state: the slab recycles freed node slots
    group.bench_function("linked_list/push_pop", |b| {
        let mut list = LinkedList::with_capacity(1024);
        for i in 0..512u64 {
            list.push_back(i).unwrap();
        }
        b.iter(|| {
            list.push_back(black_box(42u64)).unwrap();
            black_box(list.pop_front().unwrap())
        });
    });

    group.bench_function("std_vec_deque/push_pop", |b| {
        let mut deque = VecDeque::with_capacity(1024);
        for i in 0..512u64 {
            deque.push_back(i);
        }
        b.iter(|| {
            deque.push_back(black_box(42u64));
            black_box(deque.pop_front())
        });
    });

    group.finish();
}

// ============================================================================
// Traversal
// ============================================================================

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    let count = 100_000u64;
    group.throughput(Throughput::Elements(count));

    let array: ArrayList<u64> = (0..count).collect();
    group.bench_function("array_list/iter", |b| {
        b.iter(|| array.iter().map(Result::unwrap).sum::<u64>());
    });

    let linked: LinkedList<u64> = (0..count).collect();
    group.bench_function("linked_list/iter", |b| {
        b.iter(|| linked.iter().map(Result::unwrap).sum::<u64>());
    });

    group.bench_function("linked_list/split_batches", |b| {
        b.iter(|| {
            let mut rest = linked.splitter();
            let mut sum = 0u64;
            while let Some(batch) = rest.try_split().unwrap() {
                sum += batch.sum::<u64>();
            }
            rest.for_each_remaining(|v| sum += v).unwrap();
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_append, bench_deque, bench_traversal);
criterion_main!(benches);
