use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pfor_block::{decode, encode_delta, encode_raw};

fn sequential_values() -> Vec<u32> {
    (0..128).collect()
}

fn patched_values() -> Vec<u32> {
    let mut values: Vec<u32> = (0..128).map(|i| 16 + (i % 16)).collect();
    values[10] = (1 << 18) | 7;
    values[77] = (1 << 20) | 5;
    values
}

fn sawtooth_values() -> Vec<u32> {
    (0..128)
        .map(|i| if i % 2 == 0 { 1000 + i } else { 900 + i })
        .collect()
}

fn bench_encode_raw(c: &mut Criterion) {
    let values = sequential_values();
    c.bench_function("encode_raw/sequential", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            encode_raw(&mut buf, black_box(&values)).unwrap();
            buf
        })
    });
}

fn bench_encode_raw_patched(c: &mut Criterion) {
    let values = patched_values();
    c.bench_function("encode_raw/patched", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            encode_raw(&mut buf, black_box(&values)).unwrap();
            buf
        })
    });
}

fn bench_encode_delta(c: &mut Criterion) {
    let values = sawtooth_values();
    c.bench_function("encode_delta/sawtooth", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            encode_delta(&mut buf, black_box(&values)).unwrap();
            buf
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let values = sequential_values();
    let mut buf = Vec::new();
    encode_raw(&mut buf, &values).unwrap();
    let mut out = vec![0u32; values.len()];
    c.bench_function("decode/sequential", |b| {
        b.iter(|| decode(&mut out, black_box(&buf)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_encode_raw,
    bench_encode_raw_patched,
    bench_encode_delta,
    bench_decode
);
criterion_main!(benches);
