//! Compose benchmarks — definitions → route tree construction.
//!
//! Measures the one-time cost of validating and compiling a configuration,
//! including pattern compilation and feature-list merging at scale.

use routeweave::prelude::*;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern compilation
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn compile_literal(bencher: divan::Bencher) {
    bencher.bench_local(|| routeweave::CompiledPattern::compile("crisis/center/list"));
}

#[divan::bench]
fn compile_params(bencher: divan::Bencher) {
    bencher.bench_local(|| routeweave::CompiledPattern::compile("team/:team/member/:id/edit"));
}

#[divan::bench]
fn compile_regex_matcher(bencher: divan::Bencher) {
    bencher.bench_local(|| RegexSegmentMatcher::new(r"^@(?P<username>\w+)$"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tree composition at scale
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 10, 50, 100, 200])]
fn compose_n_flat_routes(bencher: divan::Bencher, n: usize) {
    bencher.bench_local(|| {
        let routes: Vec<RouteDefinition<usize>> = (0..n)
            .map(|i| RouteDefinition::path(format!("route{i}/:id")).payload(i))
            .chain(std::iter::once(RouteDefinition::path("**").payload(n)))
            .collect();
        RouteTree::new(routes)
    });
}

#[divan::bench(args = [1, 4, 16])]
fn compose_feature_lists(bencher: divan::Bencher, lists: usize) {
    bencher.bench_local(|| {
        let mut composer = Composer::new(vec![
            RouteDefinition::path("**").payload(0usize),
            RouteDefinition::path("home").payload(1),
        ]);
        for l in 0..lists {
            composer = composer.merge(
                (0..10)
                    .map(|i| RouteDefinition::path(format!("f{l}/r{i}")).payload(i))
                    .collect(),
            );
        }
        composer.compose()
    });
}

#[divan::bench(args = [1, 8, 16, 31])]
fn compose_nested(bencher: divan::Bencher, depth: usize) {
    bencher.bench_local(|| {
        let mut route = RouteDefinition::path("leaf").payload(depth);
        for i in 0..depth {
            route = RouteDefinition::path(format!("n{i}")).child(route);
        }
        RouteTree::new(vec![route])
    });
}
