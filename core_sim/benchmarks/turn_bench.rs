use core_sim::{build_headless_app, run_to_completion, run_turn};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn bench_turn(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn");

    group.bench_function("single_turn", |b| {
        b.iter_batched(
            build_headless_app,
            |mut app| {
                run_turn(&mut app);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("reference_run", |b| {
        b.iter_batched(
            build_headless_app,
            |mut app| run_to_completion(&mut app),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(turn_benches, bench_turn);
criterion_main!(turn_benches);
