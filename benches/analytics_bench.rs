//! Analytics and lexicon benchmarks.
//!
//! Measures how `summarize` scales with the size of a product's review set.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use chrono::Utc;
use review_sentiment::analytics::summarize;
use review_sentiment::models::{Review, SentimentLabel};
use review_sentiment::sentiment::{LexiconBackend, SentimentBackend};

fn synthetic_reviews(count: usize) -> Vec<Review> {
    let created_at = Utc::now().naive_utc();
    (0..count)
        .map(|i| {
            let (label, score) = match i % 3 {
                0 => (SentimentLabel::Positive, 0.5 + (i % 50) as f64 / 100.0),
                1 => (SentimentLabel::Negative, -0.5 - (i % 50) as f64 / 100.0),
                _ => (SentimentLabel::Neutral, 0.0),
            };
            Review {
                id: i64::try_from(i).unwrap_or(i64::MAX),
                product_id: 1,
                user_name: format!("user{i}"),
                rating: u8::try_from(i % 5 + 1).unwrap_or(3),
                review_text: format!("synthetic review {i}"),
                sentiment_score: score,
                sentiment_label: label,
                created_at,
                updated_at: None,
            }
        })
        .collect()
}

/// Benchmark summarize at increasing review counts.
fn bench_summarize_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize_scaling");
    group.measurement_time(Duration::from_secs(5));

    for &size in &[10, 100, 1_000, 10_000] {
        let reviews = synthetic_reviews(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("summarize", size), &reviews, |b, reviews| {
            b.iter(|| black_box(summarize(reviews)));
        });
    }

    group.finish();
}

/// Benchmark the lexicon backend on short and long review texts.
fn bench_lexicon_predict(c: &mut Criterion) {
    let Ok(lexicon) = LexiconBackend::new() else {
        return;
    };
    let short = "Really great sound, but the strap broke after a week.";
    let long = short.repeat(40);

    let mut group = c.benchmark_group("lexicon_predict");
    group.bench_function("short", |b| b.iter(|| black_box(lexicon.predict(black_box(short)))));
    group.bench_function("long", |b| b.iter(|| black_box(lexicon.predict(black_box(&long)))));
    group.finish();
}

criterion_group!(benches, bench_summarize_scaling, bench_lexicon_predict);
criterion_main!(benches);
