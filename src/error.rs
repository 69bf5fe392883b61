//! Error types for the review-sentiment library.
//!
//! This module provides custom error types using `thiserror` for the storage and
//! write paths. Sentiment classification never produces one of these: inference
//! failures are absorbed by the classifier and turned into the neutral verdict.

use thiserror::Error;

/// Errors that can occur in the review-sentiment application.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Review not found
    #[error("Review not found: {0}")]
    ReviewNotFound(i64),

    /// Input rejected by validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking storage task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl ReviewError {
    /// True for the not-found variants, which callers usually map to a 404-style response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ProductNotFound(_) | Self::ReviewNotFound(_))
    }
}

/// Convenience type alias for Result with `ReviewError`
pub type Result<T> = std::result::Result<T, ReviewError>;

impl From<anyhow::Error> for ReviewError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ReviewError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
