//! Benchmarks for the job scheduler.
//!
//! Benchmarks cover:
//! - Policy checks on request shapes
//! - Submit/finish cycles on free resources
//! - Head-blocking cascades through a contended resource
//! - Registry availability flips over storage

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use techwm_scheduler::builders::{build_in_memory_scheduler, DefaultScheduler};
use techwm_scheduler::core::{
    AccountType, PermissionLevel, PolicyLimits, ResourceKind, ResourceService, User,
};
use techwm_scheduler::infra::{InMemoryStorage, ResourceRegistry, SimulatedBackend};

use tokio::runtime::Runtime;

// ============================================================================
// Fixtures
// ============================================================================

fn root_user() -> User {
    User::new("bench", PermissionLevel::Administrator, AccountType::Default)
}

async fn scheduler_with(devices: usize) -> DefaultScheduler<SimulatedBackend> {
    let backend = SimulatedBackend::new();
    for i in 0..devices {
        backend.add_device(format!("cpu-{i}"), ResourceKind::Cpu);
    }
    let scheduler = build_in_memory_scheduler(&PolicyLimits::default(), backend);
    for i in 0..devices {
        scheduler
            .resources()
            .attach_hardware_resource(&format!("cpu-{i}"), "bench core")
            .await
            .unwrap();
    }
    scheduler
}

// ============================================================================
// Policy Benchmarks
// ============================================================================

fn bench_policy_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_checks");
    let limits = PolicyLimits::default().limits_for(AccountType::Research);
    let kinds = [
        ResourceKind::Cpu,
        ResourceKind::Gpu,
        ResourceKind::Cpu,
        ResourceKind::Gpu,
    ];

    group.bench_function("research_mix", |b| {
        b.iter(|| {
            black_box(limits.check_count(black_box(kinds.len())).is_ok());
            black_box(limits.check_kinds(black_box(&kinds)).is_ok());
        });
    });
    group.finish();
}

// ============================================================================
// Scheduler Benchmarks (Async)
// ============================================================================

fn bench_submit_finish_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_finish_cycle");

    for job_count in [10u64, 50, 100] {
        group.throughput(Throughput::Elements(job_count));
        group.bench_with_input(
            BenchmarkId::from_parameter(job_count),
            &job_count,
            |b, &job_count| {
                b.to_async(Runtime::new().unwrap()).iter(|| async move {
                    let scheduler = scheduler_with(4).await;
                    let user = root_user();
                    for i in 0..job_count {
                        let resource = format!("cpu-{}", i % 4);
                        let pending = scheduler
                            .submit_job(&user, format!("job-{i}"), vec![resource])
                            .await
                            .unwrap();
                        let job = pending.await.unwrap();
                        scheduler.finish_job(&job).await.unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_contended_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_cascade");

    for depth in [10u64, 50] {
        group.throughput(Throughput::Elements(depth));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let scheduler = scheduler_with(1).await;
                let user = root_user();

                // Every job wants the same core, so each finish starts the next.
                let mut pending = Vec::new();
                for i in 0..depth {
                    pending.push(
                        scheduler
                            .submit_job(&user, format!("job-{i}"), vec!["cpu-0".to_string()])
                            .await
                            .unwrap(),
                    );
                }
                for p in pending {
                    let job = p.await.unwrap();
                    scheduler.finish_job(&job).await.unwrap();
                }
                black_box(scheduler.queue_len().await);
            });
        });
    }
    group.finish();
}

// ============================================================================
// Registry Benchmarks
// ============================================================================

fn bench_registry_flip(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_flip");

    group.bench_function("mark_unavailable_available", |b| {
        let rt = Runtime::new().unwrap();
        let registry = ResourceRegistry::new(InMemoryStorage::new());
        rt.block_on(registry.attach("gpu-0", "bench gpu")).unwrap();

        b.to_async(&rt).iter(|| async {
            registry.mark_unavailable("gpu-0").await.unwrap();
            registry.mark_available("gpu-0").await.unwrap();
            black_box(registry.is_available("gpu-0").await.unwrap());
        });
    });
    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(policy_benches, bench_policy_checks);

criterion_group!(
    scheduler_benches,
    bench_submit_finish_cycle,
    bench_contended_cascade
);

criterion_group!(registry_benches, bench_registry_flip);

criterion_main!(policy_benches, scheduler_benches, registry_benches);
