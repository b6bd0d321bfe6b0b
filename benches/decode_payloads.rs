//! Benchmarks for payload decoding
//!
//! Measures the progress decoder across the encodings the service emits,
//! and the cost of routing a frame through the full adapter.

use std::sync::Arc;

use convertlink::decode::{decode_frame, decode_progress};
use convertlink::{MemoryTransport, Queue, SessionAdapter, SessionSettings};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const PROGRESS_PAYLOADS: [(&str, &str); 5] = [
    ("number", "42"),
    ("object", r#"{"progress": 17.5}"#),
    ("json_string", r#""63""#),
    ("raw_fallback", "+12.5"),
    ("garbage", "abc"),
];

fn bench_decode_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_progress");
    for (name, payload) in PROGRESS_PAYLOADS {
        group.bench_with_input(BenchmarkId::from_parameter(name), payload, |b, p| {
            b.iter(|| decode_progress(black_box(p)))
        });
    }
    group.finish();
}

fn bench_decode_frame(c: &mut Criterion) {
    c.bench_function("decode_frame_result", |b| {
        b.iter(|| decode_frame(black_box(Queue::Result), black_box("/download/abc.mp3")))
    });
}

fn bench_frame_routing(c: &mut Criterion) {
    let transport = Arc::new(MemoryTransport::default().with_auto_connect(true));
    let adapter = SessionAdapter::new(transport.clone(), SessionSettings::default());
    adapter.connect();

    c.bench_function("deliver_progress_frame", |b| {
        b.iter(|| transport.deliver("/queue/progress", black_box(r#"{"progress": 50}"#)))
    });
}

criterion_group!(
    benches,
    bench_decode_progress,
    bench_decode_frame,
    bench_frame_routing
);
criterion_main!(benches);
