//! Review Sentiment - Product Reviews with Sentiment Analytics
//!
//! A Rust library for storing product reviews, attaching a sentiment verdict to
//! each one, and summarizing a product's reviews on demand.
//!
//! # Features
//!
//! - Sentiment classification with a permanent neutral fallback when no model is available
//! - Per-product analytics: average rating, average sentiment, label distribution,
//!   most positive and most negative review
//! - Product and review management backed by SQLite
//! - Configurable backends, pagination limits and logging

/// Review analytics aggregation
pub mod analytics;
/// Configuration management
pub mod config;
/// Database operations and connection pooling
pub mod db;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Repository pattern for data access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Sentiment classification
pub mod sentiment;
/// Product and review operations
pub mod service;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use analytics::summarize;
pub use db::Database;
pub use error::{Result, ReviewError};
pub use models::{AnalyticsSummary, Product, Review, SentimentLabel, SentimentVerdict};
pub use sentiment::SentimentClassifier;
pub use service::ReviewService;
