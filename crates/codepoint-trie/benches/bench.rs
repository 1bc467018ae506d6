use codepoint_trie::{CodePointTrie, MutableCodePointTrie, TrieType, ValueWidth};
use criterion::{Criterion, criterion_group, criterion_main};

/// A script-like map: runs of a few hundred code points with repeating values.
fn generate_mutable() -> MutableCodePointTrie {
    let mut trie = MutableCodePointTrie::new(0, 0xffff);
    let mut start = 0x80;
    let mut value = 1;
    while start < 0x3_0000 {
        let len = 40 + (value * 37) % 400;
        trie.set_range(start, start + len - 1, value % 17)
            .expect("range within Unicode");
        start += len + value % 3 * 64;
        value += 1;
    }
    trie
}

fn bench_build(c: &mut Criterion) {
    let mutable = generate_mutable();

    let mut group = c.benchmark_group("build");
    group.bench_function("set_ranges", |b| b.iter(generate_mutable));
    group.bench_function("compact_fast_16", |b| {
        b.iter(|| {
            mutable
                .clone()
                .build_immutable(TrieType::Fast, ValueWidth::Bits16)
        });
    });
    group.bench_function("compact_small_32", |b| {
        b.iter(|| {
            mutable
                .clone()
                .build_immutable(TrieType::Small, ValueWidth::Bits32)
        });
    });
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let trie = generate_mutable()
        .build_immutable(TrieType::Fast, ValueWidth::Bits16)
        .expect("build failed");
    let text: Vec<u16> = "Lorem ipsum Καλημέρα Здравствуйте こんにちは 𝔘𝔫𝔦𝔠𝔬𝔡𝔢 "
        .repeat(64)
        .encode_utf16()
        .collect();

    let mut group = c.benchmark_group("lookup");
    group.bench_function("get_all_code_points", |b| {
        b.iter(|| (0..0x11_0000).map(|c| trie.get(c)).fold(0u32, u32::wrapping_add));
    });
    group.bench_function("values_utf16", |b| {
        b.iter(|| trie.values_utf16(&text).map(|(_, v)| v).fold(0u32, u32::wrapping_add));
    });
    group.bench_function("iter_ranges", |b| b.iter(|| trie.iter_ranges().count()));
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let bytes = generate_mutable()
        .build_immutable(TrieType::Small, ValueWidth::Bits32)
        .expect("build failed")
        .to_bytes();

    c.bench_function("from_bytes", |b| b.iter(|| CodePointTrie::from_bytes(&bytes)));
}

criterion_group!(benches, bench_build, bench_lookup, bench_decode);
criterion_main!(benches);
