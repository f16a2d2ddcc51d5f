//! Storage module for persisting corpus data
//!
//! This module handles durable persistence of the two corpora:
//! - Documentation pages plus their crawl metadata
//! - GitHub code examples plus their walk metadata
//!
//! Each corpus is written as a pair of pretty-printed JSON files.

mod json;
mod schema;
mod traits;

pub use json::JsonStore;
pub use schema::CorpusFiles;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Store for crawled documentation pages
pub type DocsStore = JsonStore<IndexedPage, IndexMeta>;

/// Store for indexed code examples
pub type ExamplesStore = JsonStore<GitHubExample, GitHubMeta>;

/// Derives the stable short identifier of a page from its canonical URL
///
/// The first 16 hex characters of the URL's SHA-256 digest.
pub fn page_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..8])
}

/// One crawled documentation page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPage {
    pub id: String,
    pub url: String,
    pub title: String,
    pub headings: Vec<String>,
    pub text: String,
    pub code_blocks: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Metadata describing a completed or in-progress documentation crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    pub start_url: String,
    pub max_pages: usize,
    pub delay_ms: u64,
    pub indexed_count: usize,
    pub visited_count: usize,
    pub failed_count: usize,
    pub last_refresh: DateTime<Utc>,
    pub allowed_host: String,
    pub allowed_path_prefixes: Vec<String>,
    #[serde(default)]
    pub in_progress: bool,
}

/// Whether an indexed file lives in an example directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExampleKind {
    Example,
    CodeFile,
}

/// One indexed source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubExample {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ExampleKind,
    pub title: String,
    pub file_path: String,
    pub repo_name: String,
    pub repo_url: String,
    pub file_url: String,
    pub language: String,
    pub content: String,
    pub content_preview: String,
    pub related_classes: Vec<String>,
    pub related_methods: Vec<String>,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
}

/// Aggregate metadata for the code example corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubMeta {
    pub total_examples: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub repositories: BTreeMap<String, usize>,
}
