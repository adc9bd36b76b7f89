use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stxlink_core::{frame, Config, Parity};

fn configs() -> [(&'static str, Config); 3] {
    [
        ("none", Config::default()),
        ("odd", Config::default().with_parity(Parity::Odd)),
        ("even_no_lrc", Config::default().with_parity(Parity::Even).with_checksum(false)),
    ]
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [16, 256, 1000] {
        let text = vec![b'R'; size];
        group.throughput(Throughput::Bytes(size as u64));
        for (name, config) in configs() {
            group.bench_with_input(BenchmarkId::new(name, size), &text, |b, text| {
                b.iter(|| frame::build(black_box(text), &config, false).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");

    for size in [16, 256, 1000] {
        for (name, config) in configs() {
            let encoded = frame::build(&vec![b'R'; size], &config, true).unwrap();
            group.throughput(Throughput::Bytes(encoded.len() as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &encoded, |b, data| {
                b.iter(|| frame::verify(black_box(data), &config).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let mut out = vec![0u8; 1024];

    for size in [16, 256, 1000] {
        for (name, config) in configs() {
            let encoded = frame::build(&vec![b'R'; size], &config, false).unwrap();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::new(name, size), &encoded, |b, data| {
                b.iter(|| frame::extract_text(black_box(data), &config, &mut out).unwrap());
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_verify, bench_extract);
criterion_main!(benches);
