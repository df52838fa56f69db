//! Benchmarks for catalog scoring and the full search pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pantry_search::{levenshtein_distance, score_catalog, CatalogItem, ManualClock, SearchConfig, SearchEngine};

const WORDS: [&str; 8] = ["spicy", "mild", "smoked", "aged", "sausage", "cheddar", "kimchi", "tofu"];

fn create_catalog(count: usize) -> Vec<CatalogItem> {
    (0..count)
        .map(|i| {
            let name = format!("{} {}", WORDS[i % WORDS.len()], WORDS[(i / 3) % WORDS.len()]);
            CatalogItem::new(i.to_string(), name)
                .with_description(format!("Item number {i} from the deli counter"))
                .with_category(WORDS[(i / 7) % WORDS.len()])
                .with_tags([WORDS[i % 5], WORDS[(i + 2) % 7]])
                .with_price((i % 100) as f64 * 1000.0)
        })
        .collect()
}

fn bench_levenshtein(c: &mut Criterion) {
    c.bench_function("levenshtein_short", |b| {
        b.iter(|| levenshtein_distance(black_box("spicy sausag"), black_box("spicy sausage")))
    });
}

fn bench_score_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_catalog");
    let config = SearchConfig::default();

    for size in [100, 1000, 5000].iter() {
        let catalog = create_catalog(*size);
        group.bench_with_input(BenchmarkId::new("typo_query", size), size, |b, _| {
            b.iter(|| score_catalog(black_box("spicy sausag"), black_box(&catalog), &config))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut engine = SearchEngine::with_clock(SearchConfig::default(), ManualClock::new())
        .with_catalog(create_catalog(1000));

    c.bench_function("search_now_1000", |b| {
        b.iter(|| engine.search_now(black_box("smoked kimchi")))
    });
}

criterion_group!(benches, bench_levenshtein, bench_score_catalog, bench_pipeline);
criterion_main!(benches);
