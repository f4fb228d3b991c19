mod common;

use std::time::{Duration, Instant};

use common::workload::{Workload, WorkloadSpec, run_hit_rate};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lfukit::LfuCache;
use lfukit::ds::FrequencyBuckets;

fn prefilled(capacity: usize) -> LfuCache<u64, u64> {
    let mut cache = LfuCache::new(capacity);
    for i in 0..capacity as u64 {
        cache.put(i, i);
    }
    cache
}

fn bench_lfu_put_get_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu_end_to_end");
    group.throughput(Throughput::Elements(1024 * 2));
    group.bench_function("put_get", |b| {
        b.iter_batched(
            || prefilled(1024),
            |mut cache| {
                for i in 0..1024u64 {
                    cache.put(std::hint::black_box(i + 10_000), i);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_lfu_get_hotset(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu_end_to_end");
    group.throughput(Throughput::Elements(4096));
    group.bench_function("get_hotset", |b| {
        b.iter_batched(
            || prefilled(4096),
            |mut cache| {
                for i in 0..4096u64 {
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_lfu_eviction_churn_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu_eviction_churn_sizes");
    for &capacity in &[256usize, 1024, 4096, 16384] {
        let inserts = capacity * 4;
        group.throughput(Throughput::Elements(inserts as u64));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            b.iter_batched(
                || prefilled(capacity),
                |mut cache| {
                    for i in 0..inserts as u64 {
                        cache.put(std::hint::black_box(10_000_000 + i), i);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_lfu_eviction_spread_frequencies(c: &mut Criterion) {
    c.bench_function("lfu_eviction_spread_frequencies", |b| {
        b.iter_batched(
            || {
                let mut cache = prefilled(4096);
                for i in 0..4096u64 {
                    for _ in 0..(i % 128) {
                        cache.get(&i);
                    }
                }
                cache
            },
            |mut cache| {
                for i in 0..4096u64 {
                    cache.put(std::hint::black_box(100_000 + i), i);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_lfu_pop_lfu(c: &mut Criterion) {
    c.bench_function("lfu_pop_lfu", |b| {
        b.iter_batched(
            || prefilled(1024),
            |mut cache| {
                for _ in 0..1024u64 {
                    let _ = std::hint::black_box(cache.pop_lfu());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lfu_get_hit_ns(c: &mut Criterion) {
    c.bench_function("lfu_get_hit_ns", |b| {
        b.iter_custom(|iters| {
            let capacity = 16_384u64;
            let mut cache = prefilled(capacity as usize);
            let start = Instant::now();
            for i in 0..iters {
                let _ = std::hint::black_box(cache.get(&(i % capacity)));
            }
            start.elapsed()
        })
    });
}

fn bench_lfu_put_full_ns(c: &mut Criterion) {
    c.bench_function("lfu_put_full_ns", |b| {
        b.iter_custom(|iters| {
            let capacity = 4096u64;
            let mut cache = prefilled(capacity as usize);
            let start = Instant::now();
            for i in 0..iters {
                cache.put(std::hint::black_box(capacity + i), i);
            }
            start.elapsed()
        })
    });
}

fn bench_frequency_index_touch_ns(c: &mut Criterion) {
    c.bench_function("frequency_index_touch_ns", |b| {
        b.iter_custom(|iters| {
            let capacity = 16_384u64;
            let mut index = FrequencyBuckets::with_capacity(capacity as usize, 64);
            index.ensure_bucket(1);
            let mut slots: Vec<_> = (0..capacity)
                .map(|key| (index.append_newest(1, key), 1u64))
                .collect();

            let start = Instant::now();
            for i in 0..iters {
                let (slot, freq) = &mut slots[(i % capacity) as usize];
                index.ensure_bucket(*freq + 1);
                index.detach(*freq, *slot);
                index.attach_newest(*freq + 1, *slot);
                *freq += 1;
            }
            start.elapsed()
        })
    });
}

fn bench_lfu_workload_hit_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu_workload_hit_rate");
    let operations = 200_000usize;
    group.throughput(Throughput::Elements(operations as u64));

    let specs = [
        ("uniform", Workload::Uniform),
        (
            "hotset_90_10",
            Workload::Hotset {
                hot_fraction: 0.1,
                hot_prob: 0.9,
            },
        ),
        ("scan", Workload::Scan),
        ("zipfian_0.99", Workload::Zipfian { theta: 0.99 }),
    ];

    for (name, workload) in specs {
        group.bench_function(name, |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::default();
                for _ in 0..iters {
                    let mut cache = LfuCache::new(4096);
                    let mut generator = WorkloadSpec {
                        universe: 16_384,
                        workload,
                        seed: 42,
                    }
                    .generator();
                    let start = Instant::now();
                    let stats = run_hit_rate(&mut cache, &mut generator, operations, |k| k);
                    let _ = std::hint::black_box(stats.hit_rate());
                    total += start.elapsed();
                }
                total
            })
        });
    }

    group.finish();
}

criterion_group!(
    end_to_end,
    bench_lfu_put_get_end_to_end,
    bench_lfu_get_hotset,
    bench_lfu_eviction_churn_sizes,
    bench_lfu_eviction_spread_frequencies,
    bench_lfu_pop_lfu
);
criterion_group!(
    micro_ops,
    bench_lfu_get_hit_ns,
    bench_lfu_put_full_ns,
    bench_frequency_index_touch_ns
);
criterion_group!(workloads, bench_lfu_workload_hit_rate);
criterion_main!(end_to_end, micro_ops, workloads);
