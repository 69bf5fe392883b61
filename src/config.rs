use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite location and pool sizing
    pub database: DatabaseConfig,
    /// Log level, format and optional file sink
    pub logging: LoggingConfig,
    /// Classifier backend and inference limits
    pub sentiment: SentimentConfig,
    /// Pagination and review input limits
    pub api: ApiConfig,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path, with or without a `sqlite:` prefix. `DATABASE_URL` overrides it.
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long a caller waits for a pooled connection
    pub connection_timeout_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive such as `info` or `review_sentiment=debug`. `RUST_LOG` overrides it.
    pub level: String,
    /// Daily rolling JSON log file, in addition to stderr
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

/// Which inference backend the classifier tries to load at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Built-in weighted word lexicon
    Lexicon,
    /// Pretrained DistilBERT SST-2 model (requires the `advanced-nlp` feature)
    Transformer,
    /// No backend: every review is recorded as neutral
    Disabled,
}

/// Classifier settings, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Backend to load
    pub backend: BackendKind,
    /// Characters of review text handed to the model
    pub max_text_length: usize,
    /// Per-review inference limit; exceeding it yields the neutral verdict
    pub inference_timeout_secs: u64,
}

/// Limits applied to incoming requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Page size when the caller gives none
    pub default_page_size: u32,
    /// Largest page size accepted
    pub max_page_size: u32,
    /// Shortest review text accepted, in characters
    pub min_review_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/reviews.db".to_string(),
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            sentiment: SentimentConfig {
                backend: BackendKind::Lexicon,
                max_text_length: 2000,
                inference_timeout_secs: 30,
            },
            api: ApiConfig {
                default_page_size: 10,
                max_page_size: 100,
                min_review_length: 10,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load configuration, layering an explicit file over the default search path
    pub fn load_with(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| anyhow::anyhow!("Failed to build default configuration: {}", e))?;

        let mut builder = Config::builder()
            // Start with default values
            .add_source(defaults)
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // Add environment variables with prefix, e.g. REVIEW_SENTIMENT__DATABASE__URL
            .add_source(Environment::with_prefix("REVIEW_SENTIMENT").prefix_separator("__").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate database config
        if self.database.url.trim().is_empty() {
            return Err(anyhow::anyhow!("database url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("max_connections must be greater than 0"));
        }
        if self.database.connection_timeout_secs == 0 {
            return Err(anyhow::anyhow!("connection_timeout_secs must be greater than 0"));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate sentiment config
        if self.sentiment.max_text_length == 0 {
            return Err(anyhow::anyhow!("max_text_length must be greater than 0"));
        }
        if self.sentiment.inference_timeout_secs == 0 {
            return Err(anyhow::anyhow!("inference_timeout_secs must be greater than 0"));
        }

        // Validate API config
        if self.api.max_page_size == 0 {
            return Err(anyhow::anyhow!("max_page_size must be greater than 0"));
        }
        if self.api.default_page_size == 0 || self.api.default_page_size > self.api.max_page_size {
            return Err(anyhow::anyhow!(
                "default_page_size must be between 1 and max_page_size ({})",
                self.api.max_page_size
            ));
        }
        if self.api.min_review_length == 0 {
            return Err(anyhow::anyhow!("min_review_length must be greater than 0"));
        }

        Ok(())
    }

    /// Get database URL from environment or config
    #[must_use]
    pub fn get_database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.database.url.clone())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}
