//! Per-product review analytics.
//!
//! Everything here is a pure function of the review slice it is given. The
//! caller is expected to pass the product's complete review set in its natural
//! (insertion) order, since that order decides ties between extreme reviews.

use crate::models::{AnalyticsSummary, Review, SentimentDistribution, SentimentLabel};

/// Round `value` to `places` decimal places, exact halves to the even digit
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Mean rating rounded to 2 places, 0 for an empty slice
#[must_use]
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    round_to(total / reviews.len() as f64, 2)
}

/// Compute the analytics summary for one product's reviews.
///
/// Distribution percentages are rounded independently, so they need not sum
/// to exactly 100.
#[must_use]
pub fn summarize(reviews: &[Review]) -> AnalyticsSummary {
    let total = reviews.len();
    if total == 0 {
        return AnalyticsSummary::default();
    }
    let count = total as f64;

    let sentiment_sum: f64 = reviews.iter().map(|r| r.sentiment_score).sum();

    let mut positives = 0usize;
    let mut neutrals = 0usize;
    let mut negatives = 0usize;
    for review in reviews {
        match review.sentiment_label {
            SentimentLabel::Positive => positives += 1,
            SentimentLabel::Neutral => neutrals += 1,
            SentimentLabel::Negative => negatives += 1,
        }
    }
    let percentage = |bucket: usize| round_to(bucket as f64 * 100.0 / count, 2);

    // Strict comparisons keep the first of equal scores
    let mut most_positive = &reviews[0];
    let mut most_negative = &reviews[0];
    for review in &reviews[1..] {
        if review.sentiment_score > most_positive.sentiment_score {
            most_positive = review;
        }
        if review.sentiment_score < most_negative.sentiment_score {
            most_negative = review;
        }
    }

    AnalyticsSummary {
        total_reviews: total,
        average_rating: average_rating(reviews),
        average_sentiment_score: round_to(sentiment_sum / count, 3),
        sentiment_distribution: SentimentDistribution {
            positive: percentage(positives),
            neutral: percentage(neutrals),
            negative: percentage(negatives),
        },
        most_positive_review: Some(most_positive.review_text.clone()),
        most_negative_review: Some(most_negative.review_text.clone()),
    }
}
