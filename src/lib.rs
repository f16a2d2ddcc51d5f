//! Docs-Indexer: a polite documentation and code-example indexer
//!
//! This crate crawls a documentation site and a fixed set of GitHub
//! repositories, stores the extracted records as JSON, and serves them
//! through an in-memory full-text index.

pub mod config;
pub mod crawler;
pub mod github;
pub mod output;
pub mod search;
pub mod service;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Docs-Indexer operations
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL is outside the allowed crawl scope: {url}")]
    ScopeViolation { url: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("Query error: {0}")]
    Query(#[from] service::QueryError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

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

/// Outcome of a failed page or file fetch
///
/// Fetch errors are never fatal on their own; the crawl engine counts them
/// and only the consecutive-failure breaker turns them into a stop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {code} for {url}")]
    HttpStatus { url: String, code: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Result type alias for Docs-Indexer operations
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use search::SearchIndex;
pub use state::CorpusState;
pub use storage::{GitHubExample, GitHubMeta, IndexMeta, IndexedPage};
pub use url::{normalize, ScopeFilter};
