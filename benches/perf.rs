use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use scores365::detail_fetch::parse_match_detail;
use scores365::listing::parse_results_page;
use scores365::project::{ProjectOptions, project};
use scores365::resolve::resolve;

const RESULTS_JSON: &str = include_str!("../tests/fixtures/results_page.json");
const MATCH_JSON: &str = include_str!("../tests/fixtures/match_detail.json");

fn bench_results_page_parse(c: &mut Criterion) {
    c.bench_function("results_page_parse", |b| {
        b.iter(|| {
            let page = parse_results_page(black_box(RESULTS_JSON)).unwrap();
            black_box(page.rows.len());
        })
    });
}

fn bench_match_detail_parse(c: &mut Criterion) {
    c.bench_function("match_detail_parse", |b| {
        b.iter(|| {
            let detail = parse_match_detail(black_box(MATCH_JSON)).unwrap().unwrap();
            black_box(detail.events.len());
        })
    });
}

fn bench_resolve_and_project(c: &mut Criterion) {
    let detail = parse_match_detail(MATCH_JSON)
        .expect("valid fixture json")
        .expect("fixture carries a game");
    let opts = ProjectOptions::default();

    c.bench_function("resolve_and_project", |b| {
        b.iter(|| {
            let ids = resolve(black_box(&detail));
            let tables = project(black_box(&detail), &ids, &opts);
            black_box(tables.row_count());
        })
    });
}

criterion_group!(
    benches,
    bench_results_page_parse,
    bench_match_detail_parse,
    bench_resolve_and_project
);
criterion_main!(benches);
