//! Tests for input validation and sanitization

use review_sentiment::config::ApiConfig;
use review_sentiment::models::{
    NewProduct, NewReview, Page, ProductUpdate, ReviewUpdate, SentimentLabel,
};
use review_sentiment::validation::InputValidator;
use review_sentiment::ReviewError;

fn new_review(user_name: &str, rating: u8, text: &str) -> NewReview {
    NewReview {
        user_name: user_name.to_string(),
        rating,
        review_text: text.to_string(),
    }
}

#[test]
fn test_valid_user_names() {
    assert!(InputValidator::validate_user_name("alice").is_ok());
    assert!(InputValidator::validate_user_name("José García").is_ok());
    assert!(InputValidator::validate_user_name(&"x".repeat(100)).is_ok());
}

#[test]
fn test_invalid_user_names() {
    assert!(InputValidator::validate_user_name("").is_err());
    assert!(InputValidator::validate_user_name("   ").is_err());
    assert!(InputValidator::validate_user_name(&"x".repeat(101)).is_err());
    assert!(InputValidator::validate_user_name("bob\nsmith").is_err());
    assert!(InputValidator::validate_user_name("null\0byte").is_err());
}

#[test]
fn test_rating_range() {
    for rating in 1..=5 {
        assert!(InputValidator::validate_rating(rating).is_ok(), "rating {rating}");
    }
    assert!(InputValidator::validate_rating(0).is_err());
    assert!(InputValidator::validate_rating(6).is_err());
    assert!(InputValidator::validate_rating(u8::MAX).is_err());
}

#[test]
fn test_review_text_length_counts_characters() {
    let validator = InputValidator::default();

    assert!(validator.validate_review_text("exactly 10").is_ok());
    assert!(validator.validate_review_text("too short").is_err());
    // Surrounding whitespace does not count
    assert!(validator.validate_review_text("   short    ").is_err());
    // Ten multi-byte characters are enough
    assert!(validator.validate_review_text("éééééééééé").is_ok());
}

#[test]
fn test_min_review_length_from_config() {
    let validator = InputValidator::from_config(&ApiConfig {
        default_page_size: 5,
        max_page_size: 20,
        min_review_length: 3,
    });

    assert!(validator.validate_review_text("ok!").is_ok());
    assert_eq!(validator.page(None, None).expect("default page"), Page::new(1, 5));
    assert!(validator.page(None, Some(21)).is_err());
}

#[test]
fn test_new_review_validation() {
    let validator = InputValidator::default();

    assert!(validator
        .validate_new_review(&new_review("alice", 4, "Works as described"))
        .is_ok());

    let err = validator
        .validate_new_review(&new_review("alice", 0, "Works as described"))
        .expect_err("bad rating");
    assert!(matches!(err, ReviewError::Validation(_)));

    assert!(validator
        .validate_new_review(&new_review("", 4, "Works as described"))
        .is_err());
    assert!(validator.validate_new_review(&new_review("alice", 4, "meh")).is_err());
}

#[test]
fn test_review_update_validation() {
    let validator = InputValidator::default();

    assert!(validator.validate_review_update(&ReviewUpdate::default()).is_ok());
    assert!(validator
        .validate_review_update(&ReviewUpdate {
            rating: Some(9),
            review_text: None,
        })
        .is_err());
    assert!(validator
        .validate_review_update(&ReviewUpdate {
            rating: None,
            review_text: Some("short".to_string()),
        })
        .is_err());
}

#[test]
fn test_product_validation() {
    let valid = NewProduct {
        name: "Desk Lamp".to_string(),
        description: None,
        category: "home".to_string(),
    };
    assert!(InputValidator::validate_new_product(&valid).is_ok());

    let long_name = NewProduct {
        name: "n".repeat(201),
        ..valid.clone()
    };
    assert!(InputValidator::validate_new_product(&long_name).is_err());

    let no_category = NewProduct {
        category: " ".to_string(),
        ..valid
    };
    assert!(InputValidator::validate_new_product(&no_category).is_err());

    assert!(InputValidator::validate_product_update(&ProductUpdate::default()).is_ok());
    assert!(InputValidator::validate_product_update(&ProductUpdate {
        name: Some(String::new()),
        ..ProductUpdate::default()
    })
    .is_err());
}

#[test]
fn test_page_resolution() {
    let validator = InputValidator::default();

    assert_eq!(validator.page(None, None).expect("page"), Page::new(1, 10));
    assert_eq!(validator.page(Some(3), Some(25)).expect("page"), Page::new(3, 25));
    assert_eq!(validator.page(Some(3), Some(25)).expect("page").offset(), 50);
    assert!(validator.page(Some(0), None).is_err());
    assert!(validator.page(None, Some(0)).is_err());
    assert!(validator.page(None, Some(101)).is_err());
}

#[test]
fn test_sentiment_filter_parsing() {
    assert_eq!(InputValidator::parse_sentiment_filter(None).expect("none"), None);
    assert_eq!(
        InputValidator::parse_sentiment_filter(Some("positive")).expect("positive"),
        Some(SentimentLabel::Positive)
    );
    assert_eq!(
        InputValidator::parse_sentiment_filter(Some(" Negative ")).expect("negative"),
        Some(SentimentLabel::Negative)
    );
    assert!(InputValidator::parse_sentiment_filter(Some("mixed")).is_err());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  hello  "), "hello");
    assert_eq!(InputValidator::sanitize_text("a\u{0}b\u{7}c"), "abc");
    assert_eq!(InputValidator::sanitize_text("line one\nline two"), "line one\nline two");
}
