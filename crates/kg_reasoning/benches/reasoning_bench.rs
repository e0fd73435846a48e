//! Benchmarks for kg_reasoning
//!
//! Run with: cargo bench -p kg_reasoning

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kg_reasoning::{ChainOptions, ContradictionDetector, Fact, Reasoner};

fn chain(len: usize) -> Vec<Fact> {
    (0..len)
        .map(|i| Fact::new(format!("n:{}", i), "partOf", format!("n:{}", i + 1)))
        .collect()
}

fn bench_transitive_closure(c: &mut Criterion) {
    let reasoner = Reasoner::new();
    let mut group = c.benchmark_group("transitive_closure");

    for size in [8, 16, 32].iter() {
        let facts = chain(*size);
        group.bench_with_input(BenchmarkId::new("chain", size), &facts, |b, facts| {
            b.iter(|| reasoner.infer(black_box(facts), &ChainOptions::default()));
        });
    }

    group.finish();
}

fn bench_mixed_relations(c: &mut Criterion) {
    let reasoner = Reasoner::new();
    let mut facts = Vec::new();
    for i in 0..50 {
        facts.push(Fact::new(format!("user:{}", i), "knows", format!("user:{}", (i + 1) % 50)));
        facts.push(Fact::new(format!("org:{}", i % 5), "employs", format!("user:{}", i)));
    }

    c.bench_function("mixed_relations", |b| {
        b.iter(|| reasoner.infer_default(black_box(&facts)));
    });
}

fn bench_detect(c: &mut Criterion) {
    let detector = ContradictionDetector::with_defaults();
    let facts: Vec<Fact> = (0..1000)
        .map(|i| {
            let predicate = if i % 2 == 0 { "is" } else { "is_not" };
            Fact::new(format!("e:{}", i % 100), predicate, format!("v:{}", i % 7))
        })
        .collect();

    c.bench_function("contradiction_detect", |b| {
        b.iter(|| detector.detect(black_box(&facts)));
    });
}

criterion_group!(benches, bench_transitive_closure, bench_mixed_relations, bench_detect);
criterion_main!(benches);
