use async_trait::async_trait;

use crate::db::Database;
use crate::error::Result;
use crate::metrics::{MetricsCollector, MetricsTimer};
use crate::models::{
    NewProduct, Page, Product, ProductUpdate, Review, ReviewChanges, ReviewRecord, SentimentLabel,
};

/// Storage operations the review service needs.
///
/// `reviews_for_product` must return the product's complete review set in
/// insertion order; analytics depends on both properties.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Store a new product and return it with its id and creation time.
    async fn insert_product(&self, product: NewProduct) -> Result<Product>;
    /// Fetch one product; `None` when the id is unknown.
    async fn get_product(&self, product_id: i64) -> Result<Option<Product>>;
    /// One page of products, optionally restricted to a category.
    async fn list_products(&self, category: Option<String>, page: Page) -> Result<Vec<Product>>;
    /// Apply the supplied fields and stamp `updated_at`; `None` when the id is unknown.
    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>>;
    /// Delete a product and, through the foreign key, its reviews. Returns whether a row went.
    async fn delete_product(&self, product_id: i64) -> Result<bool>;

    /// Store a review together with its verdict in one row write.
    async fn insert_review(&self, record: ReviewRecord) -> Result<Review>;
    /// Fetch one review; `None` when the id is unknown.
    async fn get_review(&self, review_id: i64) -> Result<Option<Review>>;
    /// One page of a product's reviews, optionally only those with `label`.
    async fn list_reviews(
        &self,
        product_id: i64,
        label: Option<SentimentLabel>,
        page: Page,
    ) -> Result<Vec<Review>>;
    /// Every review of a product, unpaginated, oldest first.
    async fn reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>>;
    /// Review count and unrounded mean rating; the mean is `None` with no reviews.
    async fn review_stats(&self, product_id: i64) -> Result<(usize, Option<f64>)>;
    /// Apply a rating change and/or new text with its verdict; `None` when the id is unknown.
    async fn update_review(&self, review_id: i64, changes: ReviewChanges) -> Result<Option<Review>>;
    /// Delete one review. Returns whether a row went.
    async fn delete_review(&self, review_id: i64) -> Result<bool>;
}

/// SQLite-backed repository; each call runs on tokio's blocking pool
#[derive(Clone)]
pub struct SqliteReviewRepository {
    database: Database,
    metrics: MetricsCollector,
}

impl SqliteReviewRepository {
    /// Wrap an open database
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self {
            database,
            metrics: MetricsCollector::default(),
        }
    }

    /// Run a blocking database call off the async runtime and time it
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let database = self.database.clone();
        let timer = MetricsTimer::new(self.metrics, operation);

        let result = tokio::task::spawn_blocking(move || f(&database))
            .await
            .map_err(crate::error::ReviewError::from)
            .and_then(|inner| inner);

        if let Err(e) = &result {
            tracing::warn!(operation, error = %e, "Storage operation failed");
        }
        timer.finish(result.is_ok());
        result
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        self.run("insert_product", move |db| db.insert_product(&product)).await
    }

    async fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
        self.run("get_product", move |db| db.get_product(product_id)).await
    }

    async fn list_products(&self, category: Option<String>, page: Page) -> Result<Vec<Product>> {
        self.run("list_products", move |db| db.list_products(category.as_deref(), page))
            .await
    }

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>> {
        self.run("update_product", move |db| db.update_product(product_id, &update))
            .await
    }

    async fn delete_product(&self, product_id: i64) -> Result<bool> {
        self.run("delete_product", move |db| db.delete_product(product_id)).await
    }

    async fn insert_review(&self, record: ReviewRecord) -> Result<Review> {
        self.run("insert_review", move |db| db.insert_review(&record)).await
    }

    async fn get_review(&self, review_id: i64) -> Result<Option<Review>> {
        self.run("get_review", move |db| db.get_review(review_id)).await
    }

    async fn list_reviews(
        &self,
        product_id: i64,
        label: Option<SentimentLabel>,
        page: Page,
    ) -> Result<Vec<Review>> {
        self.run("list_reviews", move |db| db.list_reviews(product_id, label, page))
            .await
    }

    async fn reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>> {
        self.run("reviews_for_product", move |db| db.reviews_for_product(product_id))
            .await
    }

    async fn review_stats(&self, product_id: i64) -> Result<(usize, Option<f64>)> {
        self.run("review_stats", move |db| db.review_stats(product_id)).await
    }

    async fn update_review(&self, review_id: i64, changes: ReviewChanges) -> Result<Option<Review>> {
        self.run("update_review", move |db| db.update_review(review_id, &changes))
            .await
    }

    async fn delete_review(&self, review_id: i64) -> Result<bool> {
        self.run("delete_review", move |db| db.delete_review(review_id)).await
    }
}
