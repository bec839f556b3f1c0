use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use wherechain::bench::{Benchmark, ProcessingMode};
use wherechain::chain::WhereChain;
use wherechain::compose::{compose, reduce};
use wherechain::workload::Workload;

pub fn strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    for headers in [10, 100, 1_000] {
        let workload = Workload::generate(headers, 3, 10 * headers);
        let key_pairs = workload.headers.key_pairs();
        let benchmark = Benchmark::new(&workload.lines);
        for mode in ProcessingMode::ALL {
            group.bench_with_input(BenchmarkId::new(mode.code(), headers), &key_pairs, |b, key_pairs| {
                b.iter(|| benchmark.run(black_box(key_pairs), mode))
            });
        }
    }
    group.finish();
}

// Tree construction alone, without evaluating the filter.
pub fn construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    for headers in [10, 100, 1_000] {
        let key_pairs = Workload::generate(headers, 0, 0).headers.key_pairs();
        let tokens = WhereChain::build(&key_pairs).into_parts().0;
        group.bench_with_input(BenchmarkId::new("compose", headers), &tokens, |b, tokens| {
            b.iter(|| compose(black_box(tokens)))
        });
        group.bench_with_input(BenchmarkId::new("reduce", headers), &tokens, |b, tokens| {
            b.iter(|| reduce(black_box(tokens.clone())))
        });
    }
    // the recursive composer is left out where its depth would be a problem
    let key_pairs = Workload::generate(100_000, 0, 0).headers.key_pairs();
    let tokens = WhereChain::build(&key_pairs).into_parts().0;
    group.sample_size(10);
    group.bench_function("reduce 100k", |b| b.iter(|| reduce(black_box(tokens.clone()))));
    group.finish();
}

criterion_group!(benches, strategies, construction);
criterion_main!(benches);
