//! Refresh orchestration
//!
//! A refresh runs the crawl or walk, persists the result, builds a new
//! index, and only then swaps the snapshot. Queries keep the old snapshot
//! until the swap.

use crate::config::{validate_docs_config, Config, DocsConfig, GitHubConfig};
use crate::crawler::{build_index_meta, merge_pages, Coordinator};
use crate::github::RepositoryWalker;
use crate::state::{CorpusState, DocsCorpus, ExamplesCorpus};
use crate::storage::{CorpusFiles, DocsStore, ExamplesStore, Storage};
use crate::url::extract_domain;
use crate::{ConfigError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Per-run overrides for a documentation refresh
#[derive(Debug, Clone, Default)]
pub struct DocsRefreshRequest {
    pub start_url: Option<String>,
    pub max_pages: Option<usize>,
    pub delay_ms: Option<u64>,

    /// Merge onto the stored corpus instead of replacing it
    pub resume: bool,
}

/// What a documentation refresh did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsRefreshReport {
    pub start_url: String,
    /// Pages fetched by this run
    pub new_pages: usize,
    /// Pages in the corpus after merging
    pub total_pages: usize,
    pub visited: usize,
    pub failures: usize,
    pub stop_reason: String,
    pub frontier_remaining: usize,
}

/// Per-run overrides for a code example refresh
#[derive(Debug, Clone, Default)]
pub struct ExamplesRefreshRequest {
    pub max_files: Option<usize>,
    pub token: Option<String>,
    pub delay_ms: Option<u64>,
}

/// What a code example refresh did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplesRefreshReport {
    pub total_examples: usize,
    pub failures: usize,
    pub repositories: BTreeMap<String, usize>,
}

/// Applies request overrides to the configured crawl parameters
///
/// A start URL on a different host moves the allowed host with it. The
/// result is validated like a loaded configuration.
pub fn apply_docs_overrides(
    config: &DocsConfig,
    request: &DocsRefreshRequest,
) -> std::result::Result<DocsConfig, ConfigError> {
    let mut docs = config.clone();

    if let Some(start_url) = &request.start_url {
        let parsed = Url::parse(start_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", start_url, e))
        })?;
        if let Some(host) = extract_domain(&parsed) {
            if !host.eq_ignore_ascii_case(&docs.allowed_host) {
                tracing::info!("Start URL moves allowed host to {}", host);
                docs.allowed_host = host;
            }
        }
        docs.start_url = start_url.clone();
    }
    if let Some(max_pages) = request.max_pages {
        docs.max_pages = max_pages;
    }
    if let Some(delay_ms) = request.delay_ms {
        docs.delay_ms = delay_ms;
    }

    validate_docs_config(&docs)?;
    Ok(docs)
}

/// Applies request overrides to the configured walk parameters
pub fn apply_github_overrides(
    config: &GitHubConfig,
    request: &ExamplesRefreshRequest,
) -> GitHubConfig {
    let mut github = config.clone();
    if let Some(max_files) = request.max_files {
        github.max_files = max_files;
    }
    if let Some(token) = request.token.as_ref().filter(|t| !t.is_empty()) {
        github.token = Some(token.clone());
    }
    if let Some(delay_ms) = request.delay_ms {
        github.file_delay_ms = delay_ms;
    }
    github
}

pub fn docs_store(data_dir: &Path) -> DocsStore {
    DocsStore::new(CorpusFiles::docs(data_dir))
}

pub fn examples_store(data_dir: &Path) -> ExamplesStore {
    ExamplesStore::new(CorpusFiles::github(data_dir))
}

/// Crawls the documentation site and replaces the docs snapshot
///
/// # Returns
///
/// * `Ok(DocsRefreshReport)` - The new corpus is saved and live
/// * `Err(IndexerError)` - Bad overrides, out-of-scope start URL, or a
///   failed save; the live snapshot is unchanged
pub async fn refresh_docs(
    config: &Config,
    state: &CorpusState,
    request: &DocsRefreshRequest,
) -> Result<DocsRefreshReport> {
    let docs = apply_docs_overrides(&config.docs, request)?;
    let store = docs_store(Path::new(&config.storage.data_dir));

    let existing = if request.resume {
        let (pages, _) = store.load();
        tracing::info!("Continuing from {} stored pages", pages.len());
        pages
    } else {
        Vec::new()
    };

    let coordinator = Coordinator::from_config(docs.clone(), &config.user_agent)?
        .with_checkpoint(store.clone())
        .with_resume_base(existing.clone());
    let outcome = coordinator.run().await?;

    let new_pages = outcome.pages.len();
    let pages = merge_pages(existing, outcome.pages);
    let meta = build_index_meta(
        &docs,
        pages.len(),
        outcome.visited,
        outcome.failures,
        false,
    );
    store.save(&pages, &meta)?;

    let report = DocsRefreshReport {
        start_url: docs.start_url.clone(),
        new_pages,
        total_pages: pages.len(),
        visited: outcome.visited,
        failures: outcome.failures,
        stop_reason: outcome.stop_reason.as_str().to_string(),
        frontier_remaining: outcome.frontier_remaining,
    };

    state.replace_docs(DocsCorpus::build(pages, Some(meta))?);
    tracing::info!("Documentation index now holds {} pages", report.total_pages);
    Ok(report)
}

/// Walks the configured repositories and replaces the examples snapshot
pub async fn refresh_examples(
    config: &Config,
    state: &CorpusState,
    request: &ExamplesRefreshRequest,
) -> Result<ExamplesRefreshReport> {
    let github = apply_github_overrides(&config.github, request);
    if github.repositories.is_empty() {
        tracing::warn!("No repositories configured; the example corpus will be empty");
    }

    let walker = RepositoryWalker::from_config(&config.user_agent, github)?;
    let outcome = walker.run().await;
    let meta = outcome.meta();

    let store = examples_store(Path::new(&config.storage.data_dir));
    store.save(&outcome.examples, &meta)?;

    let report = ExamplesRefreshReport {
        total_examples: outcome.examples.len(),
        failures: outcome.failures,
        repositories: outcome.per_repository,
    };

    state.replace_examples(ExamplesCorpus::build(outcome.examples, Some(meta))?);
    tracing::info!("Example index now holds {} files", report.total_examples);
    Ok(report)
}
