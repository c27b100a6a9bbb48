use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use courier::{Courier, KeyStore, RawTransmission};
use courier_core::{Encoding, TextEncoding};
use courier_testkit::two_key_store;

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn bench_encodings(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    for len in [16usize, 128, 1024] {
        let data = sample(len);
        group.throughput(Throughput::Bytes(len as u64));
        for encoding in [Encoding::Base64, Encoding::Base32768] {
            let text = encoding.encode(&data);
            group.bench_with_input(
                BenchmarkId::new(format!("{encoding:?}/encode"), len),
                &data,
                |b, data| b.iter(|| encoding.encode(black_box(data))),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{encoding:?}/decode"), len),
                &text,
                |b, text| b.iter(|| encoding.decode(black_box(text))),
            );
        }
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let courier = Courier::default();
    let plain = KeyStore::new();
    let keyed = two_key_store();
    let transmission = RawTransmission::from_payload(sample(96));

    c.bench_function("pipeline/plain", |b| {
        b.iter(|| {
            let text = courier
                .encode_transmission(&plain, &transmission, None, usize::MAX)
                .unwrap();
            courier.decode_text(&plain, &text).unwrap()
        })
    });

    c.bench_function("pipeline/second_key", |b| {
        b.iter(|| {
            let text = courier
                .encode_transmission(&keyed, &transmission, Some("B"), usize::MAX)
                .unwrap();
            courier.decode_text(&keyed, &text).unwrap()
        })
    });
}

criterion_group!(benches, bench_encodings, bench_pipeline);
criterion_main!(benches);
