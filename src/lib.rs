//! quiz-harvest: an incremental quiz question harvester
//!
//! This crate scrapes quiz questions (text, answer, image, video reference,
//! tags and quiz provenance) from a paginated trivia site, stores them in
//! SQLite without ever storing a question number twice, and exports stored
//! categories into Anki-importable flat files.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod storage;

use thiserror::Error;

/// Main error type for quiz-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Login rejected with HTTP status {status}")]
    LoginRejected { status: u16 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Malformed question row on {url}: {message}")]
    RowStructure { url: String, message: String },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Page locator error: {0}")]
    Locator(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for quiz-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_category, locate_question, CrawlPlan, CrawlReport, LocateOutcome};
pub use site::{PageBound, PageRange, SiteUrls};
pub use storage::{resolve_or_create, RecordStore, ReferenceKey, SqliteStorage};
