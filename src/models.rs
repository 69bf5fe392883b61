//! Data models for products, reviews and sentiment analytics
//!
//! This module contains all data structures used throughout the application,
//! including the persisted rows, the write-side payloads, and the derived
//! values produced by the classifier and the aggregator.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// One of the three fixed sentiment classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Model judged the text positive
    Positive,
    /// Model judged the text negative
    Negative,
    /// No verdict was available (classifier degraded or inference failed)
    Neutral,
}

impl SentimentLabel {
    /// All labels in distribution order
    pub const ALL: [Self; 3] = [Self::Positive, Self::Neutral, Self::Negative];

    /// Lowercase name as stored in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!(
                "Unknown sentiment label: {other}. Must be one of: positive, negative, neutral"
            )),
        }
    }
}

impl ToSql for SentimentLabel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SentimentLabel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// The classifier's output: a signed confidence and its label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    /// Signed confidence: positive for positive sentiment, negative for negative
    pub score: f64,
    /// Sentiment class
    pub label: SentimentLabel,
}

impl SentimentVerdict {
    /// The verdict recorded when no classification is available
    pub const FALLBACK: Self = Self {
        score: 0.0,
        label: SentimentLabel::Neutral,
    };

    /// True if this is the degraded neutral verdict
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        *self == Self::FALLBACK
    }
}

/// Database representation of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Database primary key
    pub id: i64,
    /// Product name (at most 200 characters)
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Category used for filtering listings
    pub category: String,
    /// Creation timestamp
    pub created_at: NaiveDateTime,
}

/// Data for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    /// Product name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Product category
    pub category: String,
}

/// Partial product update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New category
    pub category: Option<String>,
}

impl ProductUpdate {
    /// True when no field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.category.is_none()
    }
}

/// A product together with its review count and average rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    /// The product row
    #[serde(flatten)]
    pub product: Product,
    /// Number of reviews attached to the product
    pub total_reviews: usize,
    /// Mean rating rounded to 2 places, 0 when there are no reviews
    pub average_rating: f64,
}

/// Database representation of a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Database primary key
    pub id: i64,
    /// Foreign key to the owning product
    pub product_id: i64,
    /// Author name
    pub user_name: String,
    /// Star rating, 1 to 5 inclusive
    pub rating: u8,
    /// Review body
    pub review_text: String,
    /// Signed classifier confidence
    pub sentiment_score: f64,
    /// Classifier label
    pub sentiment_label: SentimentLabel,
    /// Creation timestamp
    pub created_at: NaiveDateTime,
    /// Last update timestamp
    pub updated_at: Option<NaiveDateTime>,
}

impl Review {
    /// The verdict stored on this review
    #[must_use]
    pub const fn verdict(&self) -> SentimentVerdict {
        SentimentVerdict {
            score: self.sentiment_score,
            label: self.sentiment_label,
        }
    }
}

/// Data submitted by a client to create a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    /// Author name
    pub user_name: String,
    /// Star rating
    pub rating: u8,
    /// Review body
    pub review_text: String,
}

/// Partial review update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    /// New star rating
    pub rating: Option<u8>,
    /// New review body; triggers reclassification
    pub review_text: Option<String>,
}

/// A review row ready to be inserted, verdict already attached
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    /// Owning product
    pub product_id: i64,
    /// Author name
    pub user_name: String,
    /// Star rating
    pub rating: u8,
    /// Review body
    pub review_text: String,
    /// Verdict derived from `review_text`
    pub verdict: SentimentVerdict,
}

/// Column changes applied to an existing review
#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    /// New star rating
    pub rating: Option<u8>,
    /// New body and the verdict computed from it
    pub text: Option<(String, SentimentVerdict)>,
}

/// Percentage share of each sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    /// Percentage of positive reviews
    pub positive: f64,
    /// Percentage of neutral reviews
    pub neutral: f64,
    /// Percentage of negative reviews
    pub negative: f64,
}

impl SentimentDistribution {
    /// Percentage for one label
    #[must_use]
    pub const fn get(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
        }
    }
}

/// Summary statistics over one product's reviews; never persisted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Number of reviews
    pub total_reviews: usize,
    /// Mean rating rounded to 2 places
    pub average_rating: f64,
    /// Mean sentiment score rounded to 3 places
    pub average_sentiment_score: f64,
    /// Per-label percentages, each rounded to 2 places
    pub sentiment_distribution: SentimentDistribution,
    /// Text of the review with the highest score
    pub most_positive_review: Option<String>,
    /// Text of the review with the lowest score
    pub most_negative_review: Option<String>,
}

/// 1-based page selection for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Page number, starting at 1
    pub page: u32,
    /// Rows per page
    pub limit: u32,
}

impl Page {
    /// Create a page selection
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of rows to skip
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}
