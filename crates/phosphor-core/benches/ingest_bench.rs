use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phosphor_core::{NoTexture, SampleRingBuffer, Scope, ScopeParameters, TriggerDetector};

fn sine_chunk(samples: usize, period: f32) -> Vec<f32> {
    (0..samples)
        .flat_map(|i| {
            let phase = i as f32 / period * std::f32::consts::TAU;
            [phase.sin(), phase.cos()]
        })
        .collect()
}

fn bench_ring_write_512(c: &mut Criterion) {
    let chunk = sine_chunk(512, 97.0);
    let mut buffer = SampleRingBuffer::new(8192, NoTexture);
    c.bench_function("ring_write_512", |b| {
        b.iter(|| black_box(buffer.write(&chunk).ok()));
    });
}

fn bench_trigger_scan_512(c: &mut Criterion) {
    let chunk = sine_chunk(512, 97.0);
    let mut buffer = SampleRingBuffer::new(8192, NoTexture);
    let mut detector = TriggerDetector::new();
    c.bench_function("trigger_scan_512", |b| {
        b.iter(|| {
            if let Ok(range) = buffer.write(&chunk) {
                black_box(detector.scan(range, &buffer, 64));
            }
        });
    });
}

fn bench_scope_ingest_and_plan(c: &mut Criterion) {
    let chunk = sine_chunk(512, 97.0);
    let params = ScopeParameters {
        time_scale: 256.0,
        ..Default::default()
    };
    let Ok(mut scope) = Scope::new(params, NoTexture) else {
        return;
    };
    scope.set_surface(1024, 512);
    c.bench_function("scope_ingest_and_plan", |b| {
        b.iter(|| {
            black_box(scope.ingest(&chunk).ok());
            black_box(scope.take_redraw());
        });
    });
}

criterion_group!(
    benches,
    bench_ring_write_512,
    bench_trigger_scan_512,
    bench_scope_ingest_and_plan,
);
criterion_main!(benches);
