use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

use callbridge::{BridgeConfig, CallBroker};
use callbridge_core::{
    Continuation, CorrelationId, CorrelationRegistry, ErrorTranslator, HandleAllocator,
    NativePayload, StatusCode, ViolationPolicy,
};

fn broker() -> CallBroker {
    CallBroker::new(BridgeConfig::default().with_violation_policy(ViolationPolicy::Log))
}

fn bench_round_trip(c: &mut Criterion) {
    let broker = broker();
    c.bench_function("call_and_inline_callback", |b| {
        b.iter(|| {
            let pending = broker
                .call::<String, _>("bench", |id, dispatcher| {
                    let _ = dispatcher.dispatch(id, StatusCode::SUCCESS, NativePayload::string("ok"));
                    StatusCode::SUCCESS
                })
                .unwrap();
            black_box(pending.blocking_wait().unwrap())
        })
    });

    c.bench_function("sync_rejection", |b| {
        b.iter(|| black_box(broker.call::<(), _>("bench", |_, _| StatusCode(1002)).is_err()))
    });
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_shuffled_take");
    for size in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                let registry = CorrelationRegistry::new();
                let allocator = HandleAllocator::new();
                let mut ids: Vec<CorrelationId> = (0..size)
                    .map(|_| registry.register_fresh(&allocator, Continuation::new("bench", |_, _| {})))
                    .collect();
                ids.shuffle(&mut rng);
                for id in ids {
                    black_box(registry.take(id));
                }
            })
        });
    }
    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let translator = ErrorTranslator::sdk();
    c.bench_function("translate_known", |b| {
        b.iter(|| black_box(translator.translate(black_box(StatusCode(212)))))
    });
    c.bench_function("translate_unknown", |b| {
        b.iter(|| black_box(translator.translate(black_box(StatusCode(-17)))))
    });
}

criterion_group!(benches, bench_round_trip, bench_registry, bench_translate);
criterion_main!(benches);
