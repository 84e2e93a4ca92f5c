//! Criterion benchmarks for ServiceCompiler::compile()
//!
//! - Baseline: minimal model with the default metric
//! - Metrics: one model per autoscaling metric
//! - Spread: growing numbers of topology spread constraints

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ksvc_common::k8s::{LabelSelector, TopologySpreadConstraint};
use ksvc_common::Quantity;
use ksvc_compiler::{DeploymentModel, ServiceCompiler};

// =============================================================================
// Fixtures
// =============================================================================

fn baseline_model() -> DeploymentModel {
    DeploymentModel {
        name: "bench".to_string(),
        namespace: "default".to_string(),
        labels: [("team", "bench")].into_iter().collect(),
        image: "img:v1".to_string(),
        container_port: 8080,
        cpu_requests: Quantity::parse("500m").unwrap(),
        memory_requests: Quantity::parse("1Gi").unwrap(),
        min_replicas: 1,
        max_replicas: 10,
        autoscaling_target: "10".to_string(),
        ..Default::default()
    }
}

fn spread_model(count: usize) -> DeploymentModel {
    let topology_spread_constraints = (0..count)
        .map(|i| TopologySpreadConstraint {
            max_skew: 1,
            topology_key: format!("topology.example.com/key-{}", i),
            when_unsatisfiable: "ScheduleAnyway".to_string(),
            label_selector: (i % 2 == 0).then(LabelSelector::default),
            ..Default::default()
        })
        .collect();
    DeploymentModel {
        topology_spread_constraints,
        ..baseline_model()
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_baseline");
    let compiler = ServiceCompiler::default();
    let model = baseline_model();

    group.bench_function("minimal", |b| {
        b.iter(|| black_box(compiler.compile(&model).unwrap()));
    });

    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_metrics");
    let compiler = ServiceCompiler::default();

    for (metric, target) in [
        ("concurrency", "12.5"),
        ("rps", "100"),
        ("cpu", "80"),
        ("memory", "50"),
        ("queue-depth", "7"),
    ] {
        let model = DeploymentModel {
            autoscaling_metric: metric.into(),
            autoscaling_target: target.to_string(),
            ..baseline_model()
        };
        group.bench_with_input(BenchmarkId::new("metric", metric), &model, |b, model| {
            b.iter(|| black_box(compiler.compile(model).unwrap()));
        });
    }

    group.finish();
}

fn bench_spread(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_spread");
    let compiler = ServiceCompiler::default();

    for count in [1, 5, 20] {
        let model = spread_model(count);
        group.bench_with_input(BenchmarkId::new("constraints", count), &model, |b, model| {
            b.iter(|| black_box(compiler.compile(model).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(benches, bench_baseline, bench_metrics, bench_spread);
criterion_main!(benches);
