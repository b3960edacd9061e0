// Criterion benchmarks for the zrpc-common protocol layer
//
// Run benchmarks with:
//   cargo bench -p zrpc-common

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde::{Deserialize, Serialize};
use zrpc_common::transport::frame;
use zrpc_common::{codec, RpcHeader};

#[derive(Serialize, Deserialize)]
struct Payload {
    name: String,
    values: Vec<u64>,
}

fn payload(n: usize) -> Payload {
    Payload {
        name: "benchmark".into(),
        values: (0..n as u64).collect(),
    }
}

fn bench_header_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("header_codec");

    let header = RpcHeader::new("UserServiceRpc", "Login", 256);
    let encoded = codec::encode(&header).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| codec::encode(black_box(&header)));
    });
    group.bench_function("decode", |b| {
        b.iter(|| codec::decode::<RpcHeader>(black_box(&encoded)));
    });

    group.finish();
}

fn bench_message_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_codec");

    for (label, n) in [("small", 4), ("medium", 64), ("large", 1024)] {
        let message = payload(n);
        let encoded = codec::encode(&message).unwrap();

        group.bench_function(format!("encode_{}", label), |b| {
            b.iter(|| codec::encode(black_box(&message)));
        });
        group.bench_function(format!("decode_{}", label), |b| {
            b.iter(|| codec::decode::<Payload>(black_box(&encoded)));
        });
    }

    group.finish();
}

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");

    let body = codec::encode(&payload(64)).unwrap();
    let header = RpcHeader::new("UserServiceRpc", "Login", body.len() as u32);
    let wire = frame::encode_frame(&header, &body).unwrap();

    group.bench_function("encode_frame", |b| {
        b.iter(|| frame::encode_frame(black_box(&header), black_box(&body)));
    });
    group.bench_function("read_frame", |b| {
        b.iter(|| frame::read_frame(&mut Cursor::new(black_box(&wire))));
    });
    group.bench_function("read_frame_into_reused_buffer", |b| {
        let mut scratch = Vec::with_capacity(4 * 1024);
        b.iter(|| frame::read_frame_into(&mut Cursor::new(black_box(&wire)), &mut scratch));
    });

    group.finish();
}

criterion_group!(benches, bench_header_codec, bench_message_codec, bench_framing);
criterion_main!(benches);
