use crate::config::ApiConfig;
use crate::error::{Result, ReviewError};
use crate::models::{NewProduct, NewReview, Page, ProductUpdate, ReviewUpdate, SentimentLabel};

fn invalid(message: impl Into<String>) -> ReviewError {
    ReviewError::Validation(message.into())
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Clone)]
pub struct InputValidator {
    min_review_length: usize,
    default_page_size: u32,
    max_page_size: u32,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::from_config(&crate::config::AppConfig::default().api)
    }
}

impl InputValidator {
    /// Validator using the limits from the API configuration section
    #[must_use]
    pub const fn from_config(config: &ApiConfig) -> Self {
        Self {
            min_review_length: config.min_review_length,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Validate reviewer name
    pub fn validate_user_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(invalid("User name cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(invalid("User name too long (max 100 characters)"));
        }

        // Check for potentially dangerous characters
        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(invalid("User name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate star rating
    pub fn validate_rating(rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(invalid(format!("Rating must be between 1 and 5, got {rating}")));
        }

        Ok(())
    }

    /// Validate review body length
    pub fn validate_review_text(&self, text: &str) -> Result<()> {
        let length = text.trim().chars().count();
        if length < self.min_review_length {
            return Err(invalid(format!(
                "Review text too short ({length} characters, min {})",
                self.min_review_length
            )));
        }

        Ok(())
    }

    /// Validate product name
    pub fn validate_product_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(invalid("Product name cannot be empty"));
        }

        if name.chars().count() > 200 {
            return Err(invalid("Product name too long (max 200 characters)"));
        }

        Ok(())
    }

    /// Validate product category
    pub fn validate_category(category: &str) -> Result<()> {
        if category.trim().is_empty() {
            return Err(invalid("Category cannot be empty"));
        }

        Ok(())
    }

    /// Validate a product creation payload
    pub fn validate_new_product(product: &NewProduct) -> Result<()> {
        Self::validate_product_name(&product.name)?;
        Self::validate_category(&product.category)
    }

    /// Validate a partial product update
    pub fn validate_product_update(update: &ProductUpdate) -> Result<()> {
        if let Some(name) = &update.name {
            Self::validate_product_name(name)?;
        }
        if let Some(category) = &update.category {
            Self::validate_category(category)?;
        }

        Ok(())
    }

    /// Validate a review creation payload
    pub fn validate_new_review(&self, review: &NewReview) -> Result<()> {
        Self::validate_user_name(&review.user_name)?;
        Self::validate_rating(review.rating)?;
        self.validate_review_text(&review.review_text)
    }

    /// Validate a partial review update
    pub fn validate_review_update(&self, update: &ReviewUpdate) -> Result<()> {
        if let Some(rating) = update.rating {
            Self::validate_rating(rating)?;
        }
        if let Some(text) = &update.review_text {
            self.validate_review_text(text)?;
        }

        Ok(())
    }

    /// Resolve optional page/limit parameters into a checked page selection
    pub fn page(&self, page: Option<u32>, limit: Option<u32>) -> Result<Page> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(self.default_page_size);

        if page == 0 {
            return Err(invalid("Page must be at least 1"));
        }

        if limit == 0 || limit > self.max_page_size {
            return Err(invalid(format!(
                "Limit must be between 1 and {}",
                self.max_page_size
            )));
        }

        Ok(Page::new(page, limit))
    }

    /// Parse an optional sentiment filter
    pub fn parse_sentiment_filter(filter: Option<&str>) -> Result<Option<SentimentLabel>> {
        filter
            .map(|value| value.parse::<SentimentLabel>().map_err(invalid))
            .transpose()
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(InputValidator::validate_rating(0).is_err());
        assert!(InputValidator::validate_rating(1).is_ok());
        assert!(InputValidator::validate_rating(5).is_ok());
        assert!(InputValidator::validate_rating(6).is_err());
    }

    #[test]
    fn test_page_defaults() {
        let validator = InputValidator::default();
        assert_eq!(validator.page(None, None).unwrap(), Page::new(1, 10));
        assert!(validator.page(Some(0), None).is_err());
        assert!(validator.page(None, Some(101)).is_err());
    }
}
