//! Submit/drain throughput at varying pool sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foreman::{Config, Task, TaskPool};

fn submit_and_drain(pool: &TaskPool, tasks: usize) {
    for i in 0..tasks {
        pool.submit(Task::new("bench", move || {
            black_box(i * 2);
        }));
    }

    while pool.poll().unwrap() {
        while pool.take_completed().is_some() {}
    }
}

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_drain");

    for threads in [1, 2, 4].iter() {
        let config = Config::builder().num_threads(*threads).build().unwrap();
        let mut pool = TaskPool::new(&config).unwrap();

        group.bench_with_input(
            BenchmarkId::new("threads", threads),
            threads,
            |b, _| b.iter(|| submit_and_drain(&pool, 256)),
        );

        pool.shutdown();
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
