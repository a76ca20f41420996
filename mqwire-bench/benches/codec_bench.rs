//! Packet encoding/decoding benchmarks.

use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mqwire_protocol::{
    Connect, Decoder, EncodeOptions, Encoder, LastWill, Packet, Publish, QoS, Subscribe,
    Subscription,
};

fn create_publish(payload_size: usize) -> Packet {
    Packet::Publish(
        Publish::new("bench/topic", Bytes::from(vec![b'x'; payload_size]))
            .with_qos(QoS::AtLeastOnce, 42),
    )
}

fn create_connect() -> Packet {
    Packet::Connect(
        Connect::new("bench-client")
            .with_keepalive(60)
            .with_will(LastWill::new("bench/will", "offline"))
            .with_credentials("user", "secret"),
    )
}

fn create_subscribe(topics: usize) -> Packet {
    Packet::Subscribe(Subscribe {
        message_id: 7,
        subscriptions: (0..topics)
            .map(|i| Subscription::new(format!("bench/{}/+", i), QoS::AtLeastOnce))
            .collect(),
        ..Default::default()
    })
}

fn bench_publish_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_encode");

    for size in [100, 1000, 10000] {
        let packet = create_publish(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &packet, |b, packet| {
            b.iter(|| black_box(Encoder::encode(packet).unwrap()));
        });
    }

    group.finish();
}

fn bench_publish_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_decode");

    for size in [100, 1000, 10000] {
        let encoded = Encoder::encode(&create_publish(size)).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                black_box(decoder.feed(encoded))
            });
        });
    }

    group.finish();
}

fn bench_connect(c: &mut Criterion) {
    let packet = create_connect();
    let encoded = Encoder::encode(&packet).unwrap();

    c.bench_function("connect_encode", |b| {
        b.iter(|| black_box(Encoder::encode(&packet).unwrap()));
    });

    c.bench_function("connect_decode", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            black_box(decoder.feed(&encoded))
        });
    });
}

fn bench_subscribe(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscribe_roundtrip");

    for topics in [1, 10, 100] {
        let packet = create_subscribe(topics);

        group.throughput(Throughput::Elements(topics as u64));
        group.bench_with_input(BenchmarkId::from_parameter(topics), &packet, |b, packet| {
            b.iter(|| {
                let encoded = Encoder::encode(packet).unwrap();
                let mut decoder = Decoder::new();
                black_box(decoder.feed(&encoded))
            });
        });
    }

    group.finish();
}

fn bench_split_feed(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_feed");

    let mut stream = BytesMut::new();
    for _ in 0..100 {
        stream.extend_from_slice(&Encoder::encode(&create_publish(256)).unwrap());
    }

    for chunk in [1, 16, 1024] {
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &stream, |b, stream| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                let mut decoded = 0;
                for piece in stream.chunks(chunk) {
                    decoded += decoder.feed(piece).messages.len();
                }
                black_box(decoded)
            });
        });
    }

    group.finish();
}

fn bench_encode_to_sink(c: &mut Criterion) {
    let packet = create_publish(1000);
    let opts = EncodeOptions::new(5);

    c.bench_function("encode_to_buffer", |b| {
        let mut sink = BytesMut::with_capacity(64 * 1024);
        b.iter(|| {
            sink.clear();
            black_box(Encoder::encode_to(&packet, &mut sink, &opts).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_publish_encode,
    bench_publish_decode,
    bench_connect,
    bench_subscribe,
    bench_split_feed,
    bench_encode_to_sink,
);

criterion_main!(benches);
