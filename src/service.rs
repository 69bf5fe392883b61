//! The product and review operations behind the CLI.
//!
//! Inputs are sanitized and validated here before they reach storage or the
//! classifier. Missing rows surface as `ProductNotFound` or `ReviewNotFound`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::analytics;
use crate::error::{Result, ReviewError};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{
    AnalyticsSummary, NewProduct, NewReview, Product, ProductDetail, ProductUpdate, Review,
    ReviewChanges, ReviewRecord, ReviewUpdate, SentimentLabel, SentimentVerdict,
};
use crate::repository::ReviewRepository;
use crate::sentiment::SentimentClassifier;
use crate::validation::InputValidator;

/// Product and review operations.
///
/// This is the only write path for reviews, so it is where a review's verdict
/// is kept in step with its text: classified on create, and again whenever
/// an update supplies text.
pub struct ReviewService {
    repository: Arc<dyn ReviewRepository>,
    classifier: SentimentClassifier,
    validator: InputValidator,
    metrics: MetricsCollector,
}

impl ReviewService {
    /// Build a service over a repository and an already loaded classifier
    #[must_use]
    pub fn new(
        repository: Arc<dyn ReviewRepository>,
        classifier: SentimentClassifier,
        validator: InputValidator,
    ) -> Self {
        Self {
            repository,
            classifier,
            validator,
            metrics: MetricsCollector::default(),
        }
    }

    /// The classifier shared by every write
    #[must_use]
    pub const fn classifier(&self) -> &SentimentClassifier {
        &self.classifier
    }

    /// Validate and store a new product
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let product = NewProduct {
            name: InputValidator::sanitize_text(&product.name),
            description: product.description.map(|d| InputValidator::sanitize_text(&d)),
            category: InputValidator::sanitize_text(&product.category),
        };
        InputValidator::validate_new_product(&product)?;

        let product = self.repository.insert_product(product).await?;
        info!(product_id = product.id, category = %product.category, "Product created");
        Ok(product)
    }

    /// A product with its review count and average rating
    pub async fn get_product(&self, product_id: i64) -> Result<ProductDetail> {
        let product = self.require_product(product_id).await?;
        let (total_reviews, average) = self.repository.review_stats(product_id).await?;

        Ok(ProductDetail {
            product,
            total_reviews,
            average_rating: average.map_or(0.0, |avg| analytics::round_to(avg, 2)),
        })
    }

    /// One page of products, optionally limited to a category
    pub async fn list_products(
        &self,
        category: Option<String>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Product>> {
        let page = self.validator.page(page, limit)?;
        let category = category
            .map(|c| InputValidator::sanitize_text(&c))
            .filter(|c| !c.is_empty());

        self.repository.list_products(category, page).await
    }

    /// Change the supplied product fields. An empty update returns the product as is.
    pub async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product> {
        let update = ProductUpdate {
            name: update.name.map(|n| InputValidator::sanitize_text(&n)),
            description: update.description.map(|d| InputValidator::sanitize_text(&d)),
            category: update.category.map(|c| InputValidator::sanitize_text(&c)),
        };
        InputValidator::validate_product_update(&update)?;

        if update.is_empty() {
            return self.require_product(product_id).await;
        }

        let product = self
            .repository
            .update_product(product_id, update)
            .await?
            .ok_or(ReviewError::ProductNotFound(product_id))?;

        info!(product_id, "Product updated");
        Ok(product)
    }

    /// Delete a product and all of its reviews
    pub async fn delete_product(&self, product_id: i64) -> Result<()> {
        if !self.repository.delete_product(product_id).await? {
            return Err(ReviewError::ProductNotFound(product_id));
        }

        info!(product_id, "Product deleted");
        Ok(())
    }

    /// Summary statistics over the product's current reviews
    pub async fn product_analytics(&self, product_id: i64) -> Result<AnalyticsSummary> {
        self.require_product(product_id).await?;

        let timer = OperationTimer::new("product_analytics");
        let reviews = self.repository.reviews_for_product(product_id).await?;
        let summary = analytics::summarize(&reviews);

        self.metrics.record_analytics(&summary);
        debug!(
            product_id,
            total_reviews = summary.total_reviews,
            duration_ms = timer.elapsed().as_millis(),
            "Product analytics computed"
        );
        Ok(summary)
    }

    /// Validate, classify and store a review for an existing product
    pub async fn create_review(&self, product_id: i64, review: NewReview) -> Result<Review> {
        let review = NewReview {
            user_name: InputValidator::sanitize_text(&review.user_name),
            rating: review.rating,
            review_text: InputValidator::sanitize_text(&review.review_text),
        };
        self.validator.validate_new_review(&review)?;
        self.require_product(product_id).await?;

        let verdict = self.classifier.classify(&review.review_text).await;

        let review = self
            .repository
            .insert_review(ReviewRecord {
                product_id,
                user_name: review.user_name,
                rating: review.rating,
                review_text: review.review_text,
                verdict,
            })
            .await?;

        info!(
            review_id = review.id,
            product_id,
            label = %review.sentiment_label,
            score = review.sentiment_score,
            "Review created"
        );
        Ok(review)
    }

    /// Fetch a single review
    pub async fn get_review(&self, review_id: i64) -> Result<Review> {
        self.repository
            .get_review(review_id)
            .await?
            .ok_or(ReviewError::ReviewNotFound(review_id))
    }

    /// One page of a product's reviews, optionally filtered by label
    pub async fn list_reviews(
        &self,
        product_id: i64,
        sentiment: Option<SentimentLabel>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Review>> {
        let page = self.validator.page(page, limit)?;
        self.require_product(product_id).await?;

        self.repository.list_reviews(product_id, sentiment, page).await
    }

    /// Apply a partial update. Any supplied text is reclassified; a
    /// rating-only update leaves the stored verdict alone.
    pub async fn update_review(&self, review_id: i64, update: ReviewUpdate) -> Result<Review> {
        let update = ReviewUpdate {
            rating: update.rating,
            review_text: update.review_text.map(|t| InputValidator::sanitize_text(&t)),
        };
        self.validator.validate_review_update(&update)?;

        let existing = self.get_review(review_id).await?;
        if update.rating.is_none() && update.review_text.is_none() {
            return Ok(existing);
        }

        let text = match update.review_text {
            Some(text) => {
                let verdict = self.classifier.classify(&text).await;
                Some((text, verdict))
            }
            None => None,
        };
        let changes = ReviewChanges {
            rating: update.rating,
            text,
        };
        let reclassified = changes.text.is_some();

        let review = self
            .repository
            .update_review(review_id, changes)
            .await?
            .ok_or(ReviewError::ReviewNotFound(review_id))?;

        info!(
            review_id,
            reclassified,
            label = %review.sentiment_label,
            "Review updated"
        );
        Ok(review)
    }

    /// Delete a single review
    pub async fn delete_review(&self, review_id: i64) -> Result<()> {
        if !self.repository.delete_review(review_id).await? {
            return Err(ReviewError::ReviewNotFound(review_id));
        }

        info!(review_id, "Review deleted");
        Ok(())
    }

    /// Classify arbitrary text without storing anything
    pub async fn analyze_text(&self, text: &str) -> Result<SentimentVerdict> {
        let text = InputValidator::sanitize_text(text);
        self.validator.validate_review_text(&text)?;

        Ok(self.classifier.classify(&text).await)
    }

    async fn require_product(&self, product_id: i64) -> Result<Product> {
        self.repository
            .get_product(product_id)
            .await?
            .ok_or(ReviewError::ProductNotFound(product_id))
    }
}
