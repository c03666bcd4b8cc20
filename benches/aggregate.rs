//! Aggregate merge and fan-out benchmarks
//!
//! Measures the sorted-merge cost of `ResultAggregate::update` and the
//! overhead of a full fan-out over the in-memory catalog.
//!
//! Run with: cargo bench --bench aggregate

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio_util::sync::CancellationToken;

use semfora_search::{
    Catalog, CatalogFile, CatalogRepo, CatalogSymbol, PatternInfo, RepositoryRef, ResultAggregate,
    SearchConfig, SearchOrchestrator,
};

/// Repository counts to merge
const SIZES: &[i32] = &[10, 100, 1_000, 10_000];

fn repo(id: i32) -> RepositoryRef {
    RepositoryRef::new(id, format!("github.com/bench/r{}", id))
}

/// Aggregate that searched every `step`-th repository in `0..n`
fn aggregate(n: i32, step: usize, offset: i32) -> ResultAggregate {
    let mut agg = ResultAggregate::with_max_results(n);
    for id in (offset..n).step_by(step) {
        let r = repo(id);
        agg.add_repos([&r]);
        agg.mark_searched(&r);
        if id % 7 == 0 {
            agg.mark_partial(&r);
        }
    }
    agg.add_results(n as usize);
    agg
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_update");
    group.sample_size(50);

    for &n in SIZES {
        // Interleaved halves: every merge step has to weave both lists
        let left = aggregate(n, 2, 0);
        let right = aggregate(n, 2, 1);
        group.bench_with_input(BenchmarkId::new("interleaved", n), &n, |b, _| {
            b.iter(|| {
                let mut merged = left.clone();
                merged.update(black_box(&right));
                merged
            });
        });

        // Identical sides: every element is a duplicate
        group.bench_with_input(BenchmarkId::new("idempotent", n), &n, |b, _| {
            b.iter(|| {
                let mut merged = left.clone();
                merged.update(black_box(&left));
                merged
            });
        });
    }

    group.finish();
}

fn catalog(repos: i32) -> Arc<Catalog> {
    let entries = (0..repos)
        .map(|id| {
            let mut revisions = BTreeMap::new();
            revisions.insert(String::new(), format!("c{}", id));
            CatalogRepo {
                id,
                name: format!("github.com/bench/r{}", id),
                revisions,
                files: vec![CatalogFile {
                    path: "src/handler.go".into(),
                    language: "Go".into(),
                    content: String::new(),
                    symbols: (0..20)
                        .map(|i| CatalogSymbol {
                            name: format!("HandleRequest{}", i),
                            kind: "func".into(),
                            ..Default::default()
                        })
                        .collect(),
                }],
                ..Default::default()
            }
        })
        .collect();
    Arc::new(Catalog::from_repos(entries).unwrap())
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_symbols");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Runtime::new().unwrap();

    for repos in [10, 100, 500] {
        let catalog = catalog(repos);
        let set = catalog.select(&[]).unwrap();
        let orchestrator =
            SearchOrchestrator::new(catalog.clone(), catalog.clone(), SearchConfig::default());
        let pattern = PatternInfo::new("handlerequest1");

        group.bench_with_input(BenchmarkId::new("repos", repos), &repos, |b, _| {
            b.iter(|| {
                runtime.block_on(orchestrator.search_symbols(
                    &CancellationToken::new(),
                    black_box(&set),
                    &pattern,
                    10_000,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update, bench_fan_out);
criterion_main!(benches);
