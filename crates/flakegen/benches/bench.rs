use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakegen::{
    DEFAULT_EPOCH, IdGenerator, MonotonicClock, SnowflakeId, SystemClock, TimeSource,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::{Duration, Instant},
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

fn fixed_clock() -> FixedMockTime {
    FixedMockTime {
        millis: DEFAULT_EPOCH.as_millis() as u64 + 1,
    }
}

/// Benchmarks a single generator on one thread.
fn bench_generator<T>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> IdGenerator<SnowflakeId, T>,
) where
    T: TimeSource,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads.
fn bench_generator_contended<T>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> IdGenerator<SnowflakeId, T>,
) where
    T: TimeSource + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(1);

    for thread_count in [1, 2, 4, 8, 16].into_iter().filter(|&n| n <= max_threads) {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let mut elapsed = Duration::ZERO;

                for _ in 0..iters {
                    let generator = Arc::new(generator_factory());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    let start = Instant::now();
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(generator.next_id().unwrap());
                                }
                            });
                        }
                        barrier.wait();
                    });
                    elapsed += start.elapsed();
                }

                elapsed
            });
        });
    }

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/lock", || {
        IdGenerator::with_clock(0, fixed_clock()).unwrap()
    });
}

fn benchmark_system_sequential(c: &mut Criterion) {
    bench_generator(c, "system/sequential/lock", || IdGenerator::new(0).unwrap());
}

fn benchmark_monotonic_sequential(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    bench_generator(c, "mono/sequential/lock", || {
        IdGenerator::with_clock(0, clock).unwrap()
    });
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", || {
        IdGenerator::with_clock(0, fixed_clock()).unwrap()
    });
}

fn benchmark_system_contended(c: &mut Criterion) {
    bench_generator_contended(c, "system/contended/lock", || {
        IdGenerator::with_clock(0, SystemClock).unwrap()
    });
}

criterion_group!(
    benches,
    benchmark_mock_sequential,
    benchmark_system_sequential,
    benchmark_monotonic_sequential,
    benchmark_mock_contended,
    benchmark_system_contended,
);
criterion_main!(benches);
