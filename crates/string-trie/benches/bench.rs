use criterion::{Criterion, criterion_group, criterion_main};
use string_trie::{BytesTrie, BytesTrieBuilder, BytesTrieIter, UnitsTrie, UnitsTrieBuilder};

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn generate_keyset(n: usize) -> Vec<(String, i32)> {
    (0..n).map(|i| (format!("key_{i:06}"), i as i32)).collect()
}

fn bench_build(c: &mut Criterion) {
    let keyset = generate_keyset(10_000);

    let mut group = c.benchmark_group("build");
    group.bench_function("bytes_10k_keys", |b| {
        b.iter(|| {
            keyset
                .iter()
                .map(|(k, v)| (k.as_str(), *v))
                .collect::<BytesTrieBuilder>()
                .build()
        });
    });
    group.bench_function("units_10k_keys", |b| {
        b.iter(|| {
            keyset
                .iter()
                .map(|(k, v)| (k.as_str(), *v))
                .collect::<UnitsTrieBuilder>()
                .build()
        });
    });
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let keyset = generate_keyset(10_000);
    let bytes = keyset
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect::<BytesTrieBuilder>()
        .build()
        .expect("build failed");
    let units = keyset
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect::<UnitsTrieBuilder>()
        .build()
        .expect("build failed");
    let utf16: Vec<Vec<u16>> = keyset.iter().map(|(k, _)| k.encode_utf16().collect()).collect();

    let mut group = c.benchmark_group("lookup");
    group.bench_function("bytes_next_seq", |b| {
        let mut trie = BytesTrie::new(&bytes);
        b.iter(|| {
            for (key, _) in &keyset {
                assert!(trie.reset().next_seq(key.as_bytes()).has_value());
            }
        });
    });
    group.bench_function("bytes_next_per_byte", |b| {
        let mut trie = BytesTrie::new(&bytes);
        b.iter(|| {
            for (key, _) in &keyset {
                trie.reset();
                for &byte in key.as_bytes() {
                    trie.next(byte);
                }
            }
        });
    });
    group.bench_function("units_next_seq", |b| {
        let mut trie = UnitsTrie::new(&units);
        b.iter(|| {
            for key in &utf16 {
                assert!(trie.reset().next_seq(key).has_value());
            }
        });
    });
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let keyset = generate_keyset(10_000);
    let bytes = keyset
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect::<BytesTrieBuilder>()
        .build()
        .expect("build failed");

    let mut group = c.benchmark_group("iterate");
    group.bench_function("bytes_10k_keys", |b| {
        b.iter(|| {
            let mut iter = BytesTrieIter::new(&bytes, 0);
            let mut count = 0;
            while iter.advance() {
                count += 1;
            }
            assert_eq!(count, keyset.len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup, bench_iterate);
criterion_main!(benches);
