//! Targeting benchmarks for armature-targeting

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use armature_targeting::{
    Allocation, Audience, StableHasher, TargetingContext, TargetingEvaluator, TargetingOptions,
    VariantAllocator,
};

fn hasher_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stable_hasher");
    group.throughput(Throughput::Elements(1));

    group.bench_function("keyed_percentage", |b| {
        b.iter(|| black_box(StableHasher::keyed_percentage(black_box("checkout"), black_box("user-42"))))
    });

    group.finish();
}

fn evaluator_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("targeting_evaluator");
    group.throughput(Throughput::Elements(1));

    for group_count in [1usize, 10, 100] {
        let audience = (0..group_count).fold(
            Audience::new(25.0).with_users(["Doe", "Marsha"]).exclude_user("Mallory"),
            |audience, i| audience.with_group(format!("ring{}", i), 10.0),
        );
        let context = TargetingContext::for_user("user-42").with_group(format!("ring{}", group_count - 1));

        for ignore_case in [false, true] {
            let evaluator = TargetingEvaluator::new(TargetingOptions::new().with_ignore_case(ignore_case));
            let id = BenchmarkId::new(if ignore_case { "ignore_case" } else { "exact" }, group_count);

            group.bench_with_input(id, &audience, |b, audience| {
                b.iter(|| black_box(evaluator.is_targeted(&context, audience, "checkout").unwrap()))
            });
        }
    }

    group.finish();
}

fn allocator_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("variant_allocator");
    group.throughput(Throughput::Elements(1));

    let allocation = Allocation::new()
        .with_users("Big", ["Marsha"])
        .with_groups("Big", ["Ring0"])
        .with_percentile("Small", 0.0, 50.0)
        .with_percentile("Big", 50.0, 100.0);
    let allocator = VariantAllocator::default();

    let user_match = TargetingContext::for_user("Marsha");
    group.bench_function("user_match", |b| {
        b.iter(|| black_box(allocator.assign_variant(Some(&user_match), "checkout", &allocation).unwrap()))
    });

    let percentile = TargetingContext::for_user("user-42").with_group("Ring9");
    group.bench_function("percentile", |b| {
        b.iter(|| black_box(allocator.assign_variant(Some(&percentile), "checkout", &allocation).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, hasher_benchmark, evaluator_benchmark, allocator_benchmark);
criterion_main!(benches);
