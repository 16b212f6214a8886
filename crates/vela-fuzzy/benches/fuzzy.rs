//! Benchmarks for subsequence scoring, ranking and highlighting.
//!
//! Candidates are synthetic snake_case identifiers generated from a fixed
//! seed so runs are comparable across machines and commits.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use vela_fuzzy::{highlights, match_score, rank};

fn lcg(seed: u64) -> impl FnMut() -> u64 {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    }
}

fn gen_ident(rng: &mut impl FnMut() -> u64) -> String {
    const WORDS: &[&str] = &[
        "session", "file", "store", "resolve", "handler", "index", "watch",
        "buffer", "parse", "symbol", "cache", "request", "commit", "merge",
    ];
    let pieces = 1 + (rng() as usize) % 4;
    let mut ident = String::new();
    for i in 0..pieces {
        if i > 0 {
            ident.push('_');
        }
        ident.push_str(WORDS[(rng() as usize) % WORDS.len()]);
    }
    ident
}

fn gen_corpus(size: usize) -> Vec<String> {
    let mut rng = lcg(42);
    (0..size).map(|_| gen_ident(&mut rng)).collect()
}

fn bench_match_score(c: &mut Criterion) {
    let corpus = gen_corpus(4096);
    c.bench_function("match_score/corpus_4096", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for candidate in &corpus {
                if match_score(black_box("resl"), candidate) > 0.0 {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

fn bench_rank(c: &mut Criterion) {
    let corpus = gen_corpus(4096);
    let candidates: Vec<&str> = corpus.iter().map(String::as_str).collect();
    c.bench_function("rank/corpus_4096", |b| {
        b.iter(|| black_box(rank(black_box("resl"), candidates.iter().copied())))
    });
}

fn bench_highlights(c: &mut Criterion) {
    let corpus = gen_corpus(512);
    c.bench_function("highlights/corpus_512", |b| {
        b.iter(|| {
            let mut total_spans = 0usize;
            for candidate in &corpus {
                total_spans += highlights(black_box("resl"), candidate).len();
            }
            black_box(total_spans)
        })
    });
}

fn criterion_config() -> Criterion {
    Criterion::default().sample_size(50)
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_match_score, bench_rank, bench_highlights
}
criterion_main!(benches);
