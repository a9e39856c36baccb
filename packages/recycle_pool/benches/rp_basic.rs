//! Basic benchmarks for the `recycle_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use recycle_pool::{Capacity, FnFactory, Pool, PoolRegistry};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const BUFFER_SIZE: usize = 1024;

fn buffer_factory(key: &'static str) -> FnFactory<&'static str, Vec<u8>> {
    FnFactory::new(key, || Some(vec![0_u8; BUFFER_SIZE]))
}

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp_pool");

    group.bench_function("create_prewarm_100", |b| {
        b.iter(|| {
            let pool = Pool::new(
                buffer_factory("buffer"),
                black_box(100),
                Capacity::Unbounded,
            );
            pool.clear();
        });
    });

    group.bench_function("acquire_release_warm", |b| {
        let mut pool = Pool::new(buffer_factory("buffer"), 1, Capacity::Unbounded);

        b.iter(|| {
            let handle = pool.acquire(None).expect("pool is unbounded");
            pool.release(black_box(handle)).expect("acquired above");
        });

        pool.clear();
    });

    group.bench_function("acquire_release_100_lifo", |b| {
        let mut pool = Pool::new(buffer_factory("buffer"), 100, Capacity::Bounded(100));
        let mut handles = Vec::with_capacity(100);

        b.iter(|| {
            while let Some(handle) = pool.acquire(None) {
                handles.push(handle);
            }

            while let Some(handle) = handles.pop() {
                pool.release(handle).expect("handle was just acquired");
            }
        });

        pool.clear();
    });

    group.finish();

    let mut registry_group = c.benchmark_group("rp_registry");

    registry_group.bench_function("acquire_release_by_key", |b| {
        let mut registry = PoolRegistry::new();
        for key in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            registry
                .create_pool(buffer_factory(key))
                .expect("keys are distinct");
        }

        b.iter(|| {
            let handle = registry
                .acquire(black_box(&"e"), None)
                .expect("pool exists")
                .expect("pool is unbounded");
            registry.release(handle).expect("handle was just acquired");
        });

        registry.clear_all();
    });

    registry_group.bench_function("create_clear_8_pools", |b| {
        b.iter(|| {
            let mut registry = PoolRegistry::new();
            for key in ["a", "b", "c", "d", "e", "f", "g", "h"] {
                registry
                    .create_pool(buffer_factory(key))
                    .expect("keys are distinct");
            }
            registry.clear_all();
        });
    });

    registry_group.finish();
}
