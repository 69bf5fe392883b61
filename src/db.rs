use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::config::DatabaseConfig;
use crate::error::{Result, ReviewError};
use crate::models::{
    NewProduct, Page, Product, ProductUpdate, Review, ReviewChanges, ReviewRecord, SentimentLabel,
};
use crate::schema::{products, reviews};

// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database manager for handling connections and operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database connection pool with default pool settings
    pub fn new(database_url: &str) -> Result<Self> {
        Self::with_pool_settings(database_url, 10, Duration::from_secs(30))
    }

    /// Create a connection pool sized and timed from configuration
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::with_pool_settings(
            &config.url,
            config.max_connections,
            Duration::from_secs(config.connection_timeout_secs),
        )
    }

    fn with_pool_settings(database_url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        let path = database_path(database_url);

        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Foreign keys are per-connection in SQLite, so every pooled connection enables them
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(max_connections)
            .connection_timeout(timeout)
            .build(manager)?;

        let conn = pool.get()?;
        Self::run_migrations(&conn)?;

        tracing::debug!(path, max_connections, "Database pool ready");
        Ok(Self { pool })
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!("../migrations/2025-06-01-000000_create_products/up.sql"))?;
        conn.execute_batch(include_str!("../migrations/2025-06-01-000001_create_reviews/up.sql"))?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Insert a product and return the stored row
    pub fn insert_product(&self, new_product: &NewProduct) -> Result<Product> {
        let conn = self.get_connection()?;
        let now = Utc::now().naive_utc();

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
                products::TABLE,
                products::NAME,
                products::DESCRIPTION,
                products::CATEGORY,
                products::CREATED_AT
            ),
            params![new_product.name, new_product.description, new_product.category, now],
        )?;

        Ok(Product {
            id: conn.last_insert_rowid(),
            name: new_product.name.clone(),
            description: new_product.description.clone(),
            category: new_product.category.clone(),
            created_at: now,
        })
    }

    /// Get a product by ID
    pub fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
        let conn = self.get_connection()?;

        let product = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", products::TABLE, products::ID),
                params![product_id],
                map_product,
            )
            .optional()?;

        Ok(product)
    }

    /// List products in insertion order, optionally restricted to one category
    pub fn list_products(&self, category: Option<&str>, page: Page) -> Result<Vec<Product>> {
        let conn = self.get_connection()?;

        let mut query = format!("SELECT * FROM {}", products::TABLE);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = category {
            query.push_str(&format!(" WHERE {} = ?", products::CATEGORY));
            params.push(Box::new(category.to_string()));
        }

        query.push_str(&format!(" ORDER BY {} ASC LIMIT ? OFFSET ?", products::ID));
        params.push(Box::new(i64::from(page.limit)));
        params.push(Box::new(page.offset()));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_product)?;

        let mut results = Vec::new();
        for product in rows {
            results.push(product?);
        }

        Ok(results)
    }

    /// Apply a partial update to a product; `None` if the product does not exist
    pub fn update_product(&self, product_id: i64, update: &ProductUpdate) -> Result<Option<Product>> {
        let mut update_fields = Vec::new();
        let mut update_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(name) = &update.name {
            update_fields.push(format!("{} = ?", products::NAME));
            update_params.push(Box::new(name.clone()));
        }

        if let Some(description) = &update.description {
            update_fields.push(format!("{} = ?", products::DESCRIPTION));
            update_params.push(Box::new(description.clone()));
        }

        if let Some(category) = &update.category {
            update_fields.push(format!("{} = ?", products::CATEGORY));
            update_params.push(Box::new(category.clone()));
        }

        if !update_fields.is_empty() {
            update_params.push(Box::new(product_id));

            let query = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                products::TABLE,
                update_fields.join(", "),
                products::ID
            );

            let conn = self.get_connection()?;
            conn.execute(&query, rusqlite::params_from_iter(update_params.iter()))?;
        }

        self.get_product(product_id)
    }

    /// Delete a product and, through the cascade, all of its reviews
    pub fn delete_product(&self, product_id: i64) -> Result<bool> {
        let conn = self.get_connection()?;

        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?", products::TABLE, products::ID),
            params![product_id],
        )?;

        Ok(deleted > 0)
    }

    /// Insert a review together with its verdict in a single row write
    pub fn insert_review(&self, record: &ReviewRecord) -> Result<Review> {
        let conn = self.get_connection()?;
        let now = Utc::now().naive_utc();

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?)",
                reviews::TABLE,
                reviews::PRODUCT_ID,
                reviews::USER_NAME,
                reviews::RATING,
                reviews::REVIEW_TEXT,
                reviews::SENTIMENT_SCORE,
                reviews::SENTIMENT_LABEL,
                reviews::CREATED_AT
            ),
            params![
                record.product_id,
                record.user_name,
                record.rating,
                record.review_text,
                record.verdict.score,
                record.verdict.label,
                now
            ],
        )?;

        Ok(Review {
            id: conn.last_insert_rowid(),
            product_id: record.product_id,
            user_name: record.user_name.clone(),
            rating: record.rating,
            review_text: record.review_text.clone(),
            sentiment_score: record.verdict.score,
            sentiment_label: record.verdict.label,
            created_at: now,
            updated_at: None,
        })
    }

    /// Get a review by ID
    pub fn get_review(&self, review_id: i64) -> Result<Option<Review>> {
        let conn = self.get_connection()?;

        let review = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", reviews::TABLE, reviews::ID),
                params![review_id],
                map_review,
            )
            .optional()?;

        Ok(review)
    }

    /// List one page of a product's reviews, optionally filtered by label
    pub fn list_reviews(
        &self,
        product_id: i64,
        label: Option<SentimentLabel>,
        page: Page,
    ) -> Result<Vec<Review>> {
        let conn = self.get_connection()?;

        let mut query = format!("SELECT * FROM {} WHERE {} = ?", reviews::TABLE, reviews::PRODUCT_ID);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(product_id)];

        if let Some(label) = label {
            query.push_str(&format!(" AND {} = ?", reviews::SENTIMENT_LABEL));
            params.push(Box::new(label));
        }

        query.push_str(&format!(" ORDER BY {} ASC LIMIT ? OFFSET ?", reviews::ID));
        params.push(Box::new(i64::from(page.limit)));
        params.push(Box::new(page.offset()));

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), map_review)?;

        let mut results = Vec::new();
        for review in rows {
            results.push(review?);
        }

        Ok(results)
    }

    /// Every review of a product, in insertion order
    pub fn reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>> {
        let conn = self.get_connection()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} WHERE {} = ? ORDER BY {} ASC",
            reviews::TABLE,
            reviews::PRODUCT_ID,
            reviews::ID
        ))?;
        let rows = stmt.query_map(params![product_id], map_review)?;

        let mut results = Vec::new();
        for review in rows {
            results.push(review?);
        }

        Ok(results)
    }

    /// Count and mean rating of a product's reviews
    pub fn review_stats(&self, product_id: i64) -> Result<(usize, Option<f64>)> {
        let conn = self.get_connection()?;

        let (count, average): (i64, Option<f64>) = conn.query_row(
            &format!(
                "SELECT COUNT(*), AVG({}) FROM {} WHERE {} = ?",
                reviews::RATING,
                reviews::TABLE,
                reviews::PRODUCT_ID
            ),
            params![product_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let count = usize::try_from(count).map_err(|e| ReviewError::Other(e.to_string()))?;
        Ok((count, average))
    }

    /// Apply column changes to a review; `None` if the review does not exist
    pub fn update_review(&self, review_id: i64, changes: &ReviewChanges) -> Result<Option<Review>> {
        let mut update_fields = Vec::new();
        let mut update_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some((text, verdict)) = &changes.text {
            update_fields.push(format!("{} = ?", reviews::REVIEW_TEXT));
            update_params.push(Box::new(text.clone()));
            update_fields.push(format!("{} = ?", reviews::SENTIMENT_SCORE));
            update_params.push(Box::new(verdict.score));
            update_fields.push(format!("{} = ?", reviews::SENTIMENT_LABEL));
            update_params.push(Box::new(verdict.label));
        }

        if let Some(rating) = changes.rating {
            update_fields.push(format!("{} = ?", reviews::RATING));
            update_params.push(Box::new(rating));
        }

        if !update_fields.is_empty() {
            update_fields.push(format!("{} = ?", reviews::UPDATED_AT));
            update_params.push(Box::new(Utc::now().naive_utc()));
            update_params.push(Box::new(review_id));

            let query = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                reviews::TABLE,
                update_fields.join(", "),
                reviews::ID
            );

            let conn = self.get_connection()?;
            conn.execute(&query, rusqlite::params_from_iter(update_params.iter()))?;
        }

        self.get_review(review_id)
    }

    /// Delete a review
    pub fn delete_review(&self, review_id: i64) -> Result<bool> {
        let conn = self.get_connection()?;

        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?", reviews::TABLE, reviews::ID),
            params![review_id],
        )?;

        Ok(deleted > 0)
    }
}

/// Strip an optional `sqlite:` / `sqlite://` scheme from a database URL
#[must_use]
pub fn database_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

/// Map a database row to a Product
fn map_product(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(products::ID)?,
        name: row.get(products::NAME)?,
        description: row.get(products::DESCRIPTION)?,
        category: row.get(products::CATEGORY)?,
        created_at: row.get(products::CREATED_AT)?,
    })
}

/// Map a database row to a Review
fn map_review(row: &Row) -> rusqlite::Result<Review> {
    Ok(Review {
        id: row.get(reviews::ID)?,
        product_id: row.get(reviews::PRODUCT_ID)?,
        user_name: row.get(reviews::USER_NAME)?,
        rating: row.get(reviews::RATING)?,
        review_text: row.get(reviews::REVIEW_TEXT)?,
        sentiment_score: row.get(reviews::SENTIMENT_SCORE)?,
        sentiment_label: row.get(reviews::SENTIMENT_LABEL)?,
        created_at: row.get(reviews::CREATED_AT)?,
        updated_at: row.get(reviews::UPDATED_AT)?,
    })
}
