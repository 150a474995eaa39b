//! RAMF Serialization Benchmarks
//!
//! Measures envelope encoding and decoding across payload sizes, up to the
//! largest payload a message may carry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use relaynet_domain::{MessageFields, Parcel};

const PAYLOAD_SIZES: [usize; 4] = [0, 1024, 64 * 1024, 8 * 1024 * 1024];

fn stub_parcel(payload_size: usize) -> Parcel {
    Parcel::new(MessageFields::new(
        "0deadbeef",
        3600,
        vec![0xab; payload_size],
    ))
    .unwrap()
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("ramf_serialize");
    for size in PAYLOAD_SIZES {
        let parcel = stub_parcel(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &parcel, |b, parcel| {
            b.iter(|| black_box(parcel.serialize().unwrap()))
        });
    }
    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("ramf_deserialize");
    for size in PAYLOAD_SIZES {
        let serialization = stub_parcel(size).serialize().unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &serialization,
            |b, serialization| b.iter(|| black_box(Parcel::deserialize(serialization).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_serialize, bench_deserialize);
criterion_main!(benches);
