//! Benchmark: reference-count operations
//!
//! Measures the cost of the hot paths: allocation of a value with its
//! control block, strong clone/drop, weak promotion, and aliasing.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sharc::{SharedPtr, UniquePtr};
use std::hint::black_box;
use std::rc::Rc;

fn bench_new(c: &mut Criterion) {
    let mut group = c.benchmark_group("new");
    group.bench_function("shared_ptr", |b| {
        b.iter(|| black_box(SharedPtr::new(black_box(42u64))));
    });
    group.bench_function("from_unique", |b| {
        b.iter(|| {
            let mut unique = UniquePtr::new(black_box(42u64));
            black_box(SharedPtr::from_unique(&mut unique))
        });
    });
    group.bench_function("std_rc", |b| {
        b.iter(|| black_box(Rc::new(black_box(42u64))));
    });
    group.finish();
}

fn bench_clone_drop(c: &mut Criterion) {
    let sp = SharedPtr::new(vec![0u8; 16]);
    let rc = Rc::new(vec![0u8; 16]);

    let mut group = c.benchmark_group("clone_drop");
    group.bench_function("shared_ptr", |b| {
        b.iter(|| drop(black_box(sp.clone())));
    });
    group.bench_function("std_rc", |b| {
        b.iter(|| drop(black_box(Rc::clone(&rc))));
    });
    group.finish();
}

fn bench_lock(c: &mut Criterion) {
    let sp = SharedPtr::new(7u32);
    let live = sp.downgrade();
    let expired = SharedPtr::new(7u32).downgrade();

    let mut group = c.benchmark_group("lock");
    group.bench_function("live", |b| {
        b.iter(|| black_box(live.lock()));
    });
    group.bench_function("expired", |b| {
        b.iter(|| black_box(expired.lock()));
    });
    group.finish();
}

fn bench_many_owners(c: &mut Criterion) {
    c.bench_function("drop_1000_owners", |b| {
        b.iter_batched(
            || {
                let sp = SharedPtr::new([0u64; 8]);
                (0..1000).map(|_| sp.clone()).collect::<Vec<_>>()
            },
            drop,
            BatchSize::SmallInput,
        );
    });
}

fn bench_aliasing(c: &mut Criterion) {
    let sp = SharedPtr::new((1u32, String::from("field")));
    c.bench_function("map_field", |b| {
        b.iter(|| black_box(SharedPtr::map(&sp, |pair| &pair.1)));
    });
}

criterion_group!(
    benches,
    bench_new,
    bench_clone_drop,
    bench_lock,
    bench_many_owners,
    bench_aliasing
);
criterion_main!(benches);
