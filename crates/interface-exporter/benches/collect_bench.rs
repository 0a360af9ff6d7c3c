// Benchmark a full collection pass and the encoding of its samples

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use interface_exporter::{HealthCollector, MetricSample, MetricsRegistry, TargetRegistry, encode_samples};
use interface_probe::{ProbeConfig, Target};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn refused_targets(count: usize) -> TargetRegistry {
    TargetRegistry::new(
        (0..count)
            .map(|i| Target::new(format!("target-{}", i), "127.0.0.1:1", "tcp", None))
            .collect(),
    )
}

fn bench_collection_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_pass");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let probe = ProbeConfig {
        timeout: Duration::from_millis(100),
        follow_redirects: true,
    };

    for count in [1, 10, 100] {
        let collector = rt.block_on(async {
            HealthCollector::new(&refused_targets(count), &probe, Some(Arc::new(MetricsRegistry::new())))
                .unwrap()
        });

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| rt.block_on(async { black_box(collector.collect().await) }));
        });
    }

    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_samples");
    let metrics = MetricsRegistry::new();

    for count in [10, 100, 1000] {
        let samples: Vec<MetricSample> = refused_targets(count)
            .iter()
            .enumerate()
            .map(|(i, t)| MetricSample::new(t, i % 2 == 0))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| black_box(encode_samples(samples, Some(&metrics)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_collection_pass, bench_encoding);
criterion_main!(benches);
