//! Compile benchmarks: route registration cost.
//!
//! Measures each pipeline stage on its own, then full single and
//! multi-pattern builds. Registration happens once per route table, so these
//! matter for startup and reloads, not per request.

use waypath::{compile, optimizer, parse, Eval, Router};

fn main() {
    divan::main();
}

const PATTERN: &str = "/users/:id(/(followers|following|posts/:post))?";

#[divan::bench]
fn parse_only(bencher: divan::Bencher) {
    bencher.bench_local(|| parse(divan::black_box(PATTERN)));
}

#[divan::bench]
fn compile_only(bencher: divan::Bencher) {
    let nodes = parse(PATTERN).unwrap();
    bencher.bench_local(|| compile(divan::black_box(&nodes)));
}

#[divan::bench]
fn optimize_only(bencher: divan::Bencher) {
    let states = compile(&parse(PATTERN).unwrap()).unwrap();
    bencher.bench_local(|| {
        optimizer::get_all_paths(divan::black_box(&states)).and_then(optimizer::optimize)
    });
}

#[divan::bench]
fn single(bencher: divan::Bencher) {
    bencher.bench_local(|| Eval::single(divan::black_box(PATTERN)));
}

/// Every optional group doubles the path count.
#[divan::bench(args = [2, 4, 8])]
fn optional_groups(bencher: divan::Bencher, n: usize) {
    let pattern = "(/:x)?".repeat(n);
    bencher.bench_local(|| Eval::single(divan::black_box(&pattern)));
}

#[divan::bench(args = [10, 100, 1000])]
fn multi(bencher: divan::Bencher, n: usize) {
    let patterns: Vec<(String, usize)> = (0..n)
        .map(|i| (format!("/resource{i}/:id(/edit)?"), i))
        .collect();
    bencher.bench_local(|| Eval::multi(patterns.iter().map(|(p, i)| (p.as_str(), *i))));
}

#[divan::bench(args = [10, 100])]
fn router_build(bencher: divan::Bencher, n: usize) {
    bencher.bench_local(|| {
        (0..n)
            .fold(Router::builder(), |builder, i| {
                builder.get(format!("/resource{i}/:id"), i)
            })
            .build()
    });
}
