use review_sentiment::db::Database;
use review_sentiment::models::{
    NewProduct, Page, ProductUpdate, ReviewChanges, ReviewRecord, SentimentLabel, SentimentVerdict,
};
use tempfile::TempDir;

fn test_database() -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let db = Database::new(&db_url).expect("Failed to create database");
    (temp_dir, db)
}

fn new_product(name: &str, category: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: Some(format!("{name} description")),
        category: category.to_string(),
    }
}

fn record(product_id: i64, text: &str, score: f64, label: SentimentLabel) -> ReviewRecord {
    ReviewRecord {
        product_id,
        user_name: "tester".to_string(),
        rating: 4,
        review_text: text.to_string(),
        verdict: SentimentVerdict { score, label },
    }
}

#[test]
fn test_database_creation_and_initialization() {
    let (_dir, db) = test_database();

    // Test that we can get a connection
    let _conn = db.get_connection().expect("Failed to get database connection");
}

#[test]
fn test_migrations_are_idempotent() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", temp_dir.path().join("nested/dir/test.db").display());

    let first = Database::new(&db_url).expect("Failed to create database");
    let product = first.insert_product(&new_product("Kettle", "kitchen")).expect("insert");
    drop(first);

    let reopened = Database::new(&db_url).expect("Failed to reopen database");
    let found = reopened.get_product(product.id).expect("query").expect("exists");
    assert_eq!(found.name, product.name);
    assert_eq!(found.category, product.category);
}

#[test]
fn test_product_crud() {
    let (_dir, db) = test_database();

    let product = db.insert_product(&new_product("Headphones", "audio")).expect("insert");
    assert!(product.id > 0);
    assert_eq!(product.name, "Headphones");

    let retrieved = db.get_product(product.id).expect("query");
    assert_eq!(retrieved.as_ref().map(|p| p.category.as_str()), Some("audio"));

    let update = ProductUpdate {
        name: Some("Wireless Headphones".to_string()),
        ..ProductUpdate::default()
    };
    let updated = db.update_product(product.id, &update).expect("update").expect("exists");
    assert_eq!(updated.name, "Wireless Headphones");
    assert_eq!(updated.category, "audio");
    assert_eq!(updated.description, product.description);

    assert!(db.delete_product(product.id).expect("delete"));
    assert!(db.get_product(product.id).expect("query").is_none());
    assert!(!db.delete_product(product.id).expect("second delete"));
}

#[test]
fn test_update_missing_product() {
    let (_dir, db) = test_database();

    let update = ProductUpdate {
        category: Some("misc".to_string()),
        ..ProductUpdate::default()
    };
    assert!(db.update_product(999, &update).expect("update").is_none());
}

#[test]
fn test_list_products_pagination_and_category() {
    let (_dir, db) = test_database();

    for i in 0..5 {
        let category = if i % 2 == 0 { "audio" } else { "video" };
        db.insert_product(&new_product(&format!("Product {i}"), category))
            .expect("insert");
    }

    let first_page = db.list_products(None, Page::new(1, 2)).expect("list");
    let names: Vec<_> = first_page.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Product 0", "Product 1"]);

    let last_page = db.list_products(None, Page::new(3, 2)).expect("list");
    assert_eq!(last_page.len(), 1);
    assert_eq!(last_page[0].name, "Product 4");

    assert!(db.list_products(None, Page::new(4, 2)).expect("list").is_empty());

    let audio = db.list_products(Some("audio"), Page::new(1, 10)).expect("list");
    assert_eq!(audio.len(), 3);
    assert!(audio.iter().all(|p| p.category == "audio"));
}

#[test]
fn test_review_persists_verdict() {
    let (_dir, db) = test_database();
    let product = db.insert_product(&new_product("Lamp", "home")).expect("insert");

    let review = db
        .insert_review(&record(product.id, "Bright and sturdy", 0.91, SentimentLabel::Positive))
        .expect("insert review");

    let stored = db.get_review(review.id).expect("query").expect("exists");
    assert_eq!(stored.sentiment_label, SentimentLabel::Positive);
    assert!((stored.sentiment_score - 0.91).abs() < 1e-12);
    assert_eq!(stored.verdict().label, SentimentLabel::Positive);
    assert!(stored.updated_at.is_none());
}

#[test]
fn test_review_requires_existing_product() {
    let (_dir, db) = test_database();

    let result = db.insert_review(&record(42, "Orphan review text", 0.0, SentimentLabel::Neutral));
    assert!(result.is_err());
}

#[test]
fn test_reviews_in_insertion_order_and_filtered() {
    let (_dir, db) = test_database();
    let product = db.insert_product(&new_product("Chair", "furniture")).expect("insert");
    let other = db.insert_product(&new_product("Desk", "furniture")).expect("insert");

    let rows = [
        ("Comfortable enough", 0.7, SentimentLabel::Positive),
        ("Wobbly legs", -0.6, SentimentLabel::Negative),
        ("It is a chair", 0.0, SentimentLabel::Neutral),
        ("Love the color", 0.95, SentimentLabel::Positive),
    ];
    for (text, score, label) in rows {
        db.insert_review(&record(product.id, text, score, label)).expect("insert review");
    }
    db.insert_review(&record(other.id, "Not this product", 0.5, SentimentLabel::Positive))
        .expect("insert review");

    let all = db.reviews_for_product(product.id).expect("reviews");
    let texts: Vec<_> = all.iter().map(|r| r.review_text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["Comfortable enough", "Wobbly legs", "It is a chair", "Love the color"]
    );

    let positive = db
        .list_reviews(product.id, Some(SentimentLabel::Positive), Page::new(1, 10))
        .expect("list");
    assert_eq!(positive.len(), 2);
    assert!(positive.iter().all(|r| r.sentiment_label == SentimentLabel::Positive));

    let second_page = db.list_reviews(product.id, None, Page::new(2, 3)).expect("list");
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].review_text, "Love the color");

    let (count, average) = db.review_stats(product.id).expect("stats");
    assert_eq!(count, 4);
    assert_eq!(average, Some(4.0));
}

#[test]
fn test_review_stats_without_reviews() {
    let (_dir, db) = test_database();
    let product = db.insert_product(&new_product("Rug", "home")).expect("insert");

    assert_eq!(db.review_stats(product.id).expect("stats"), (0, None));
}

#[test]
fn test_update_review_changes() {
    let (_dir, db) = test_database();
    let product = db.insert_product(&new_product("Mug", "kitchen")).expect("insert");
    let review = db
        .insert_review(&record(product.id, "Keeps coffee hot", 0.8, SentimentLabel::Positive))
        .expect("insert review");

    let rating_only = ReviewChanges {
        rating: Some(2),
        text: None,
    };
    let updated = db.update_review(review.id, &rating_only).expect("update").expect("exists");
    assert_eq!(updated.rating, 2);
    assert_eq!(updated.verdict(), review.verdict());
    assert!(updated.updated_at.is_some());

    let new_verdict = SentimentVerdict {
        score: -0.9,
        label: SentimentLabel::Negative,
    };
    let text_change = ReviewChanges {
        rating: None,
        text: Some(("Handle snapped off".to_string(), new_verdict)),
    };
    let updated = db.update_review(review.id, &text_change).expect("update").expect("exists");
    assert_eq!(updated.review_text, "Handle snapped off");
    assert_eq!(updated.verdict(), new_verdict);
    assert_eq!(updated.rating, 2);

    assert!(db
        .update_review(999, &rating_only)
        .expect("update")
        .is_none());
}

#[test]
fn test_delete_product_cascades_to_reviews() {
    let (_dir, db) = test_database();
    let product = db.insert_product(&new_product("Blender", "kitchen")).expect("insert");
    let review = db
        .insert_review(&record(product.id, "Too loud for mornings", -0.4, SentimentLabel::Negative))
        .expect("insert review");

    assert!(db.delete_product(product.id).expect("delete"));

    assert!(db.get_review(review.id).expect("query").is_none());
    assert!(db.reviews_for_product(product.id).expect("reviews").is_empty());
}

#[test]
fn test_delete_review() {
    let (_dir, db) = test_database();
    let product = db.insert_product(&new_product("Pen", "office")).expect("insert");
    let review = db
        .insert_review(&record(product.id, "Writes smoothly", 0.6, SentimentLabel::Positive))
        .expect("insert review");

    assert!(db.delete_review(review.id).expect("delete"));
    assert!(!db.delete_review(review.id).expect("second delete"));
}
