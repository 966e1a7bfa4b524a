//! Compression and decompression speed of the default model.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ctxmix::{compress, decompress, CoderWidth, ContextKind, ModelConfig};

/// Some English-like text with enough repetition for the models to learn from
fn sample(len: usize) -> Vec<u8> {
    let words = [
        "the ", "of ", "and ", "compression ", "context ", "model ", "mixing ", "bit ",
        "probability ", "arithmetic ", "coder ", "stream ", "\n",
    ];
    let mut x = 0x9e37_79b9_u32;
    let mut buf = Vec::with_capacity(len + 16);
    while buf.len() < len {
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        buf.extend_from_slice(words[x as usize % words.len()].as_bytes());
    }
    buf.truncate(len);
    buf
}

fn bench_configs(c: &mut Criterion) {
    let data = sample(64 << 10);
    let configs = [
        ("default", ModelConfig::default()),
        (
            "order2_u64",
            ModelConfig::new(vec![ContextKind::order(2)], 20, CoderWidth::U64).unwrap(),
        ),
    ];

    let mut group = c.benchmark_group("ctxmix");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    for (name, config) in &configs {
        let compressed = compress(&data, config).unwrap();
        group.bench_function(format!("compress_{name}"), |b| {
            b.iter(|| black_box(compress(black_box(&data), config).unwrap()))
        });
        group.bench_function(format!("decompress_{name}"), |b| {
            b.iter(|| black_box(decompress(black_box(&compressed), config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_configs);
criterion_main!(benches);
