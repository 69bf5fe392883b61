use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use review_sentiment::config::AppConfig;
use review_sentiment::db::Database;
use review_sentiment::logging::init_logging;
use review_sentiment::models::{NewProduct, NewReview, ProductUpdate, ReviewUpdate};
use review_sentiment::repository::SqliteReviewRepository;
use review_sentiment::sentiment::SentimentClassifier;
use review_sentiment::service::ReviewService;
use review_sentiment::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extra configuration file layered over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage products
    Product {
        #[command(subcommand)]
        command: ProductCommand,
    },
    /// Manage reviews
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
    /// Classify a piece of text without storing it
    Analyze {
        /// Text to classify
        #[arg(short, long)]
        text: String,
    },
}

#[derive(Subcommand)]
enum ProductCommand {
    /// Create a product
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List products
    List {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<u32>,
        /// Products per page
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show a product with its review count and average rating
    Show {
        #[arg(short, long)]
        id: i64,
    },
    /// Update product fields
    Update {
        #[arg(short, long)]
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a product and its reviews
    Delete {
        #[arg(short, long)]
        id: i64,
    },
    /// Review analytics for a product
    Analytics {
        #[arg(short, long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// Add a review to a product
    Add {
        #[arg(short, long)]
        product_id: i64,
        #[arg(short, long)]
        user_name: String,
        /// Star rating from 1 to 5
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        text: String,
    },
    /// List a product's reviews
    List {
        #[arg(short = 'i', long)]
        product_id: i64,
        /// positive, negative or neutral
        #[arg(short, long)]
        sentiment: Option<String>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Show a review
    Show {
        #[arg(short, long)]
        id: i64,
    },
    /// Update a review's rating and/or text
    Update {
        #[arg(short, long)]
        id: i64,
        #[arg(short, long)]
        rating: Option<u8>,
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Delete a review
    Delete {
        #[arg(short, long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_with(cli.config.as_deref())?;

    // Initialize logging
    let log_file = config.logging.file_path.as_ref().map(PathBuf::from);
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        log_file.as_deref(),
        &config.logging.format,
    )?;

    info!("Starting review-sentiment");

    let service = build_service(&config).await?;

    match cli.command {
        Commands::Product { command } => run_product_command(&service, command).await?,
        Commands::Review { command } => run_review_command(&service, command).await?,
        Commands::Analyze { text } => emit(&service.analyze_text(&text).await?)?,
    }

    Ok(())
}

/// Open storage and load the classifier once for the whole process
async fn build_service(config: &AppConfig) -> Result<ReviewService> {
    let mut database_config = config.database.clone();
    database_config.url = config.get_database_url();
    let database = Database::from_config(&database_config).context("Failed to open database")?;

    let sentiment_config = config.sentiment.clone();
    let classifier = tokio::task::spawn_blocking(move || SentimentClassifier::load(&sentiment_config))
        .await
        .context("Sentiment model loader did not complete")?;
    info!(backend = ?classifier.backend_name(), "Classifier ready");

    Ok(ReviewService::new(
        Arc::new(SqliteReviewRepository::new(database)),
        classifier,
        InputValidator::from_config(&config.api),
    ))
}

async fn run_product_command(service: &ReviewService, command: ProductCommand) -> Result<()> {
    match command {
        ProductCommand::Add {
            name,
            category,
            description,
        } => emit(
            &service
                .create_product(NewProduct {
                    name,
                    description,
                    category,
                })
                .await?,
        ),
        ProductCommand::List {
            category,
            page,
            limit,
        } => emit(&service.list_products(category, page, limit).await?),
        ProductCommand::Show { id } => emit(&service.get_product(id).await?),
        ProductCommand::Update {
            id,
            name,
            category,
            description,
        } => emit(
            &service
                .update_product(
                    id,
                    ProductUpdate {
                        name,
                        description,
                        category,
                    },
                )
                .await?,
        ),
        ProductCommand::Delete { id } => {
            service.delete_product(id).await?;
            info!(product_id = id, "Deleted");
            Ok(())
        }
        ProductCommand::Analytics { id } => emit(&service.product_analytics(id).await?),
    }
}

async fn run_review_command(service: &ReviewService, command: ReviewCommand) -> Result<()> {
    match command {
        ReviewCommand::Add {
            product_id,
            user_name,
            rating,
            text,
        } => emit(
            &service
                .create_review(
                    product_id,
                    NewReview {
                        user_name,
                        rating,
                        review_text: text,
                    },
                )
                .await?,
        ),
        ReviewCommand::List {
            product_id,
            sentiment,
            page,
            limit,
        } => {
            let sentiment = InputValidator::parse_sentiment_filter(sentiment.as_deref())?;
            emit(&service.list_reviews(product_id, sentiment, page, limit).await?)
        }
        ReviewCommand::Show { id } => emit(&service.get_review(id).await?),
        ReviewCommand::Update { id, rating, text } => emit(
            &service
                .update_review(
                    id,
                    ReviewUpdate {
                        rating,
                        review_text: text,
                    },
                )
                .await?,
        ),
        ReviewCommand::Delete { id } => {
            service.delete_review(id).await?;
            info!(review_id = id, "Deleted");
            Ok(())
        }
    }
}

/// Write a command result to stdout as pretty JSON
#[allow(clippy::print_stdout)]
fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
