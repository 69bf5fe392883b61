//! Database schema definitions
//!
//! This module provides constants for table and column names used with rusqlite.
//! The tables themselves are created by the SQL files under `migrations/`.

/// Products table schema
pub mod products {
    /// Table name
    pub const TABLE: &str = "products";
    /// Primary key column
    pub const ID: &str = "id";
    /// Product name column
    pub const NAME: &str = "name";
    /// Description column
    pub const DESCRIPTION: &str = "description";
    /// Category column
    pub const CATEGORY: &str = "category";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
}

/// Reviews table schema
pub mod reviews {
    /// Table name
    pub const TABLE: &str = "reviews";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to products table
    pub const PRODUCT_ID: &str = "product_id";
    /// Author name column
    pub const USER_NAME: &str = "user_name";
    /// Star rating column
    pub const RATING: &str = "rating";
    /// Review body column
    pub const REVIEW_TEXT: &str = "review_text";
    /// Signed sentiment score column
    pub const SENTIMENT_SCORE: &str = "sentiment_score";
    /// Sentiment label column
    pub const SENTIMENT_LABEL: &str = "sentiment_label";
    /// Creation timestamp column
    pub const CREATED_AT: &str = "created_at";
    /// Last update timestamp column
    pub const UPDATED_AT: &str = "updated_at";
}
