//! Configuration module for Docs-Indexer
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing file yields a usable configuration.
//!
//! # Example
//!
//! ```no_run
//! use docs_indexer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("indexer.toml")).unwrap();
//! println!("Crawler will index at most {} pages", config.docs.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, DocsConfig, GitHubConfig, RepositoryEntry, StorageConfig, UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
pub(crate) use validation::validate_docs_config;
