//! Benchmark token codec and snapshot serialization
//!
//! Run with: cargo bench --bench codec

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ammcipher::{
    build_challenge, CipherToken, PoolDraft, Registry, TaggedBase64Cipher, ValueCipher,
};

const CREATOR: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

/// Registry with `n` pools, created in order.
fn registry_of(n: usize) -> Registry {
    let cipher = TaggedBase64Cipher;
    let mut registry = Registry::new();
    for i in 0..n {
        let draft = PoolDraft::new(format!("POOL-{}", i), format!("{}", 1000 + i), "0.3");
        if let Ok(pool) = registry.create_at(&draft, CREATOR, &cipher, 1_700_000_000 + i as i64) {
            registry = registry.append(pool);
        }
    }
    registry
}

fn bench_tokens(c: &mut Criterion) {
    let cipher = TaggedBase64Cipher;
    let token = cipher.encode(1234.5678);
    let bare = CipherToken::from_raw("1234.5678");

    let mut group = c.benchmark_group("token");
    group.bench_function("encode", |b| b.iter(|| cipher.encode(black_box(1234.5678))));
    group.bench_function("decode_tagged", |b| b.iter(|| cipher.decode(black_box(&token))));
    group.bench_function("decode_bare", |b| b.iter(|| cipher.decode(black_box(&bare))));
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    for n in [10usize, 100, 1000] {
        let registry = registry_of(n);
        let bytes = registry.to_json_bytes().unwrap_or_default();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("serialize", n), &registry, |b, r| {
            b.iter(|| r.to_json_bytes())
        });
        group.bench_with_input(BenchmarkId::new("parse", n), &bytes, |b, bytes| {
            b.iter(|| Registry::from_json_bytes(black_box(bytes)))
        });
        group.bench_with_input(BenchmarkId::new("filter", n), &registry, |b, r| {
            b.iter(|| r.filter(black_box("pool-9")).len())
        });
    }
    group.finish();
}

fn bench_challenge(c: &mut Criterion) {
    let key = format!("0x{}", "ab".repeat(1000));
    c.bench_function("challenge_message", |b| {
        b.iter(|| build_challenge(black_box(&key), CREATOR, 11_155_111, 1_700_000_000, 30))
    });
}

criterion_group!(benches, bench_tokens, bench_snapshot, bench_challenge);
criterion_main!(benches);
