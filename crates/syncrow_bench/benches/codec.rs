//! Record codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use syncrow_codec::{CborMarshaler, JsonMarshaler, Marshaler, RecordCodec, Secret};

/// Generate random data of the specified size.
fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

fn codec(marshaler: impl Marshaler<Vec<u8>> + 'static, secret: Option<&str>) -> RecordCodec<Vec<u8>> {
    let codec = RecordCodec::new(marshaler);
    match secret {
        Some(secret) => codec.with_secret(Secret::new(secret)),
        None => codec,
    }
}

/// Benchmark encoding across payload sizes, with and without encryption.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [64, 1024, 16384].iter() {
        let data = random_data(*size);
        group.throughput(Throughput::Bytes(*size as u64));

        let plain = codec(CborMarshaler, None);
        group.bench_with_input(BenchmarkId::new("cbor", size), &data, |b, data| {
            b.iter(|| black_box(plain.encode("id-1", black_box(data)).unwrap()));
        });

        let encrypted = codec(CborMarshaler, Some("bench-secret"));
        group.bench_with_input(BenchmarkId::new("cbor_encrypted", size), &data, |b, data| {
            b.iter(|| black_box(encrypted.encode("id-1", black_box(data)).unwrap()));
        });

        let json = codec(JsonMarshaler, None);
        group.bench_with_input(BenchmarkId::new("json", size), &data, |b, data| {
            b.iter(|| black_box(json.encode("id-1", black_box(data)).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark decoding, including key derivation for encrypted payloads.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [64, 1024, 16384].iter() {
        let data = random_data(*size);
        group.throughput(Throughput::Bytes(*size as u64));

        for (label, secret) in [("cbor", None), ("cbor_encrypted", Some("bench-secret"))] {
            let codec = codec(CborMarshaler, secret);
            let bytes = codec.encode("id-1", &data).unwrap();
            group.bench_with_input(BenchmarkId::new(label, size), &bytes, |b, bytes| {
                b.iter(|| black_box(codec.decode("id-1", black_box(bytes)).unwrap()));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
