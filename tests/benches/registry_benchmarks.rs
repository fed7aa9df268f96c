//! # Game Tasks Registry Benchmarks
//!
//! | Path | Measured |
//! |------|----------|
//! | Single flight | start + resolve of one key |
//! | Attach | N waiters on one key, one resolve |
//! | Routed | start, bus dispatch, router resolve |
//! | Event identity | id lookup for a resolved event type |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use game_tasks::{CompletionRegistry, EntityHost, EntityTasks, PriorityConfig, ShowEntityRequest};
use shared_bus::events::ShowEntitySuccess;
use shared_bus::{EventBusExt, EventIdResolver, EventKind, InMemoryEventBus, SubscriptionRegistry, SubscriptionScope};
use shared_types::{AssetAddress, Entity, EntityId, HostError, Priority};
use std::sync::Arc;
use std::time::Duration;

struct NullHost;

impl EntityHost for NullHost {
    fn show_entity(&self, _request: &ShowEntityRequest, _priority: Priority) -> Result<(), HostError> {
        Ok(())
    }
}

fn bench_single_flight(c: &mut Criterion) {
    let mut group = c.benchmark_group("single-flight");
    let registry: CompletionRegistry<u64, u64> = CompletionRegistry::new("bench");

    group.bench_function("start_resolve", |b| {
        let mut key = 0u64;
        b.iter(|| {
            key += 1;
            let completion = registry.get_or_start(key, |_| Ok(()));
            registry.resolve_success(&key, key);
            black_box(completion)
        })
    });

    for waiters in [1usize, 10, 100] {
        group.throughput(Throughput::Elements(waiters as u64));
        group.bench_with_input(BenchmarkId::new("attach", waiters), &waiters, |b, &waiters| {
            b.iter(|| {
                let completions: Vec<_> = (0..waiters)
                    .map(|_| registry.get_or_start(7, |_| Ok(())))
                    .collect();
                registry.resolve_success(&7, 1);
                black_box(completions)
            })
        });
    }

    group.finish();
}

fn bench_routed_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("routed");

    let bus = Arc::new(InMemoryEventBus::new());
    let subscriptions = SubscriptionRegistry::new(bus.clone());
    let scope = SubscriptionScope::new();
    let entities = EntityTasks::new(Arc::new(NullHost), &PriorityConfig::default());
    if entities.install(&subscriptions, &scope).is_err() {
        return;
    }
    let address = AssetAddress::in_current_package("entities/bench");

    group.bench_function("show_entity_fire_now", |b| {
        let mut id = 0;
        b.iter(|| {
            id += 1;
            let completion = entities.show_entity_async(ShowEntityRequest::new(
                EntityId(id),
                "Bench",
                address.clone(),
                "bench",
            ));
            bus.fire_event_now(ShowEntitySuccess {
                entity: Entity {
                    id: EntityId(id),
                    logic_type: "Bench".into(),
                    asset_address: address.clone(),
                    group: "bench".into(),
                    instance: None,
                },
                duration: Duration::ZERO,
            });
            black_box(completion)
        })
    });

    group.finish();
}

fn bench_event_identity(c: &mut Criterion) {
    let resolver = EventIdResolver::new();
    let kind = EventKind::of::<ShowEntitySuccess>();
    resolver.resolve(&kind);

    c.bench_function("event_id_lookup", |b| b.iter(|| black_box(resolver.resolve(&kind))));
}

criterion_group!(
    benches,
    bench_single_flight,
    bench_routed_resolution,
    bench_event_identity
);
criterion_main!(benches);
