//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop, including:
//! - Seeding the frontier with the canonical start URL
//! - Visited-set and scope checks before every fetch
//! - Fetching, extracting, and queueing discovered links
//! - The consecutive-failure circuit breaker
//! - Periodic checkpoints and rate limiting
//!
//! Exactly one fetch is in flight at a time; the breaker and the delay
//! both depend on observing outcomes in order.

use crate::config::{DocsConfig, UserAgentConfig};
use crate::crawler::{ContentExtractor, FetchOutcome, Fetcher, RawPage};
use crate::state::{CrawlState, StopReason};
use crate::storage::{page_id, DocsStore, IndexMeta, IndexedPage, Storage};
use crate::url::{normalize, ScopeFilter};
use crate::{IndexerError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use url::Url;

/// Result of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Pages fetched during this run, in fetch order
    pub pages: Vec<IndexedPage>,

    /// Number of distinct canonical URLs popped and marked visited
    pub visited: usize,

    /// Total failed fetches
    pub failures: usize,

    pub stop_reason: StopReason,

    /// URLs still queued when the crawl stopped
    pub frontier_remaining: usize,
}

/// Checkpoint target plus pages a resumed crawl started from
#[derive(Debug, Clone)]
struct Checkpoint {
    store: DocsStore,
    base: Vec<IndexedPage>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: DocsConfig,
    fetcher: Fetcher,
    extractor: ContentExtractor,
    checkpoint: Option<Checkpoint>,
}

impl Coordinator {
    /// Creates a coordinator around an existing fetcher
    ///
    /// The scope filter and boilerplate selectors come from `config`.
    pub fn new(config: DocsConfig, fetcher: Fetcher) -> Self {
        let extractor = ContentExtractor::new(
            ScopeFilter::from_config(&config),
            &config.boilerplate_selectors,
        );

        Self {
            config,
            fetcher,
            extractor,
            checkpoint: None,
        }
    }

    /// Creates a coordinator with a fetcher built from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(IndexerError)` - The HTTP client could not be built
    pub fn from_config(config: DocsConfig, user_agent: &UserAgentConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let fetcher = Fetcher::from_config(user_agent, timeout)?;
        Ok(Self::new(config, fetcher))
    }

    /// Enables periodic checkpoints into `store`
    pub fn with_checkpoint(mut self, store: DocsStore) -> Self {
        let base = self.checkpoint.take().map(|c| c.base).unwrap_or_default();
        self.checkpoint = Some(Checkpoint { store, base });
        self
    }

    /// Pages a resumed crawl is merged onto when checkpointing
    ///
    /// Has no effect unless a checkpoint store is set.
    pub fn with_resume_base(mut self, pages: Vec<IndexedPage>) -> Self {
        if let Some(checkpoint) = self.checkpoint.as_mut() {
            checkpoint.base = pages;
        }
        self
    }

    /// The crawl parameters in effect
    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Runs the breadth-first crawl to one of its terminal states
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The crawl stopped normally
    /// * `Err(IndexerError::ScopeViolation)` - The start URL is out of scope
    pub async fn run(&self) -> Result<CrawlOutcome> {
        let scope = self.extractor.scope();
        let start_url = normalize(&self.config.start_url);
        if !scope.is_allowed(&start_url) {
            return Err(IndexerError::ScopeViolation { url: start_url });
        }

        tracing::info!(
            "Starting crawl at {} (max {} pages, {}ms delay)",
            start_url,
            self.config.max_pages,
            self.config.delay_ms
        );

        let mut state = CrawlState::new(&start_url);
        let delay = Duration::from_millis(self.config.delay_ms);
        let timer = Instant::now();

        let stop_reason = loop {
            if state.results.len() >= self.config.max_pages {
                break StopReason::MaxPagesReached;
            }
            let Some(next) = state.frontier.pop() else {
                break StopReason::FrontierExhausted;
            };

            let url = normalize(&next);
            if !state.mark_visited(&url) {
                tracing::debug!("Already visited {}", url);
                continue;
            }
            if !scope.is_allowed(&url) {
                tracing::debug!("Out of scope {}", url);
                continue;
            }

            match self.fetcher.fetch_in_scope(&url, scope).await {
                Err(e) => {
                    tracing::warn!("Fetch failed: {}", e);
                    if state.record_failure(self.config.max_consecutive_failures) {
                        tracing::error!(
                            "Stopping crawl after {} consecutive failures",
                            state.consecutive_failures
                        );
                        break StopReason::CircuitBreakerTripped;
                    }
                }
                Ok(FetchOutcome::LeftScope { target }) => {
                    tracing::warn!("Redirect from {} leaves scope: {}", url, target);
                }
                Ok(FetchOutcome::Page(raw)) => match scope.admit(&raw.final_url) {
                    None => {
                        tracing::warn!("Redirect from {} leaves scope: {}", url, raw.final_url);
                    }
                    Some(final_url) if final_url != url && !state.mark_visited(&final_url) => {
                        tracing::debug!("Redirect from {} lands on visited {}", url, final_url);
                    }
                    Some(final_url) => {
                        self.index_page(&mut state, final_url, raw, &timer)?;
                    }
                },
            }

            let ending =
                state.frontier.is_empty() || state.results.len() >= self.config.max_pages;
            if !delay.is_zero() && !ending {
                tokio::time::sleep(delay).await;
            }
        };

        tracing::info!(
            "Crawl finished ({}): {} pages, {} visited, {} failures in {:?}",
            stop_reason.as_str(),
            state.results.len(),
            state.visited.len(),
            state.failure_count,
            timer.elapsed()
        );

        Ok(CrawlOutcome {
            visited: state.visited.len(),
            failures: state.failure_count,
            frontier_remaining: state.frontier.len(),
            pages: state.results,
            stop_reason,
        })
    }

    /// Stores a fetched page under its post-redirect URL and queues its links
    fn index_page(
        &self,
        state: &mut CrawlState,
        url: String,
        raw: RawPage,
        timer: &Instant,
    ) -> Result<()> {
        let base = Url::parse(&url)?;
        let parsed = self.extractor.extract(&raw.body, &base);
        let page = IndexedPage {
            id: page_id(&url),
            url: url.clone(),
            title: parsed.title,
            headings: parsed.headings,
            text: parsed.text,
            code_blocks: parsed.code_blocks,
            fetched_at: Utc::now(),
        };
        let queued = state.record_success(page, parsed.links);
        tracing::debug!(
            "Indexed {} (HTTP {}, {} new links)",
            url,
            raw.status_code,
            queued
        );

        let indexed = state.results.len();
        if indexed % 10 == 0 {
            let rate = indexed as f64 / timer.elapsed().as_secs_f64().max(0.001);
            tracing::info!(
                "Progress: {} pages indexed, {} in frontier, {:.2} pages/sec",
                indexed,
                state.frontier.len(),
                rate
            );
        }
        if indexed % self.config.checkpoint_interval == 0 {
            self.write_checkpoint(state);
        }
        Ok(())
    }

    /// Persists the pages so far with an in-progress meta
    ///
    /// A failed checkpoint is logged and the crawl carries on.
    fn write_checkpoint(&self, state: &CrawlState) {
        let Some(checkpoint) = &self.checkpoint else {
            return;
        };

        let pages = merge_pages(checkpoint.base.clone(), state.results.clone());
        let meta = build_index_meta(
            &self.config,
            pages.len(),
            state.visited.len(),
            state.failure_count,
            true,
        );

        match checkpoint.store.save(&pages, &meta) {
            Ok(()) => tracing::info!("Checkpoint saved: {} pages", pages.len()),
            Err(e) => tracing::warn!("Checkpoint failed: {}", e),
        }
    }
}

/// Builds the crawl metadata record for the given counts
pub fn build_index_meta(
    config: &DocsConfig,
    indexed_count: usize,
    visited_count: usize,
    failed_count: usize,
    in_progress: bool,
) -> IndexMeta {
    IndexMeta {
        start_url: config.start_url.clone(),
        max_pages: config.max_pages,
        delay_ms: config.delay_ms,
        indexed_count,
        visited_count,
        failed_count,
        last_refresh: Utc::now(),
        allowed_host: config.allowed_host.clone(),
        allowed_path_prefixes: config.allowed_path_prefixes.clone(),
        in_progress,
    }
}

/// Unions two page sets by URL
///
/// Existing pages keep their position and content; fresh pages whose URL is
/// not already present are appended in order.
pub fn merge_pages(existing: Vec<IndexedPage>, fresh: Vec<IndexedPage>) -> Vec<IndexedPage> {
    let mut seen: HashSet<String> = existing.iter().map(|p| p.url.clone()).collect();
    let mut merged = existing;

    for page in fresh {
        if seen.insert(page.url.clone()) {
            merged.push(page);
        }
    }

    merged
}
