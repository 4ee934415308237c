mod common;

use common::{LatencyTransform, generate_provider};
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pseudonymous::prelude::*;
use std::time::Duration;
use tokio::runtime::Runtime;

const CATEGORIES: [&str; 3] = ["Patient", "Encounter", "Observation"];

/// Raw pipeline overhead with an instant transform
fn bench_pipeline_dataset_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_sizes");
    let runtime = Runtime::new().unwrap();

    for (size_name, per_category) in [("small_300", 100), ("medium_3k", 1_000)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(size_name),
            &per_category,
            |b, &per_category| {
                b.to_async(&runtime).iter_batched(
                    || generate_provider(&CATEGORIES, per_category),
                    |provider| async move {
                        let processor = Processor::with_components(
                            provider,
                            LatencyTransform(Duration::ZERO),
                            PipelineSettings::new("bench").with_concurrency(4),
                        );
                        black_box(processor.run().await.unwrap());
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Worker pool scaling against a transform with service latency
fn bench_pipeline_concurrency(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_concurrency");
    group.sample_size(10);
    let runtime = Runtime::new().unwrap();

    for concurrency in [1, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, &concurrency| {
                b.to_async(&runtime).iter_batched(
                    || generate_provider(&CATEGORIES, 20),
                    |provider| async move {
                        let processor = Processor::with_components(
                            provider,
                            LatencyTransform(Duration::from_millis(1)),
                            PipelineSettings::new("bench").with_concurrency(concurrency),
                        );
                        black_box(processor.run().await.unwrap());
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline_dataset_sizes, bench_pipeline_concurrency);
criterion_main!(benches);
