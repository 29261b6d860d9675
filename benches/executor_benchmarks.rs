use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use bounded_executor::{
    blocking,
    pool::{BoundedExecutor, Config as ExecutorConfig},
    run::{run_pull_collect, run_sequence_collect},
    source::Sequence,
    RunContext,
};
use tokio::time::Duration;
use std::hint::black_box;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .unwrap()
}

// Benchmark 1: накладные расходы на элемент
fn bench_dispatch_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_overhead");

    for size in [100u64, 1000, 10000] {
        group.throughput(Throughput::Elements(size));

        group.bench_with_input(BenchmarkId::new("sequence", size), &size, |b, &size| {
            let rt = create_runtime();
            b.to_async(&rt).iter(|| async move {
                let ctx = RunContext::new();
                let mut sum = 0u64;
                run_sequence_collect(
                    &ctx,
                    0,
                    0..size,
                    |x| async move { Ok::<_, String>(black_box(x)) },
                    |x| {
                        sum += x;
                        Ok(())
                    },
                )
                .await
                .unwrap();
                black_box(sum);
            });
        });

        group.bench_with_input(BenchmarkId::new("pull", size), &size, |b, &size| {
            let rt = create_runtime();
            b.to_async(&rt).iter(|| async move {
                let ctx = RunContext::new();
                let mut items = 0..size;
                let mut sum = 0u64;
                run_pull_collect(
                    &ctx,
                    0,
                    || Ok(items.next()),
                    |x| async move { Ok::<_, String>(black_box(x)) },
                    |x| {
                        sum += x;
                        Ok(())
                    },
                )
                .await
                .unwrap();
                black_box(sum);
            });
        });
    }

    group.finish();
}

// Benchmark 2: масштабирование по лимиту для I/O-подобных задач
fn bench_limit_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("limit_scaling");
    group.sample_size(20);

    for limit in [1usize, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            let rt = create_runtime();
            b.to_async(&rt).iter(|| async move {
                let ctx = RunContext::new();
                BoundedExecutor::new(limit)
                    .run(
                        &ctx,
                        Sequence::new(0..256u32),
                        |x| async move {
                            tokio::time::sleep(Duration::from_micros(100)).await;
                            Ok::<_, String>(x)
                        },
                        |x| {
                            black_box(x);
                            Ok(())
                        },
                    )
                    .await
                    .unwrap();
            });
        });
    }

    group.finish();
}

// Benchmark 3: блокирующие задачи, cpu_bound против io_bound
fn bench_blocking_tasks(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocking_tasks");
    group.sample_size(20);

    for (name, config) in [
        ("cpu_bound", ExecutorConfig::cpu_bound()),
        ("io_bound", ExecutorConfig::io_bound()),
    ] {
        group.bench_function(name, |b| {
            let rt = create_runtime();
            b.to_async(&rt).iter(|| {
                let config = config.clone();
                async move {
                    let ctx = RunContext::new();
                    BoundedExecutor::with_config(config)
                        .run(
                            &ctx,
                            Sequence::new(0..200u64),
                            blocking(|x: u64| {
                                std::thread::sleep(Duration::from_micros(200));
                                Ok::<_, String>(x * x)
                            }),
                            |x| {
                                black_box(x);
                                Ok(())
                            },
                        )
                        .await
                        .unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_dispatch_overhead,
    bench_limit_scaling,
    bench_blocking_tasks,
);
criterion_main!(benches);
