use crate::crawler::Frontier;
use crate::storage::IndexedPage;
use crate::url::normalize;
use std::collections::HashSet;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No URLs left to visit
    FrontierExhausted,
    /// The configured page limit was reached
    MaxPagesReached,
    /// Too many consecutive fetch failures
    CircuitBreakerTripped,
}

impl StopReason {
    /// Short label used in logs and tool payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrontierExhausted => "frontier-exhausted",
            Self::MaxPagesReached => "max-pages-reached",
            Self::CircuitBreakerTripped => "circuit-breaker-tripped",
        }
    }
}

/// Mutable state of one breadth-first crawl
///
/// Owned by exactly one crawl; nothing else reads or writes it while the
/// crawl runs.
#[derive(Debug, Clone)]
pub struct CrawlState {
    pub frontier: Frontier,
    pub visited: HashSet<String>,
    pub results: Vec<IndexedPage>,
    pub failure_count: usize,
    pub consecutive_failures: u32,
}

impl CrawlState {
    /// Creates the initial state: only the normalized start URL is queued
    pub fn new(start_url: &str) -> Self {
        Self {
            frontier: Frontier::new([normalize(start_url)]),
            visited: HashSet::new(),
            results: Vec::new(),
            failure_count: 0,
            consecutive_failures: 0,
        }
    }

    /// Marks a canonical URL visited
    ///
    /// # Returns
    ///
    /// `false` if it had already been visited
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Counts a failed fetch
    ///
    /// # Returns
    ///
    /// `true` once the consecutive failure count reaches `threshold`
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.failure_count += 1;
        self.consecutive_failures += 1;
        self.consecutive_failures >= threshold
    }

    /// Stores a fetched page and queues its unvisited links
    ///
    /// # Returns
    ///
    /// The number of links newly queued
    pub fn record_success(&mut self, page: IndexedPage, links: Vec<String>) -> usize {
        self.consecutive_failures = 0;

        let mut queued = 0;
        for link in links {
            if !self.visited.contains(&link) && self.frontier.push(link) {
                queued += 1;
            }
        }

        self.results.push(page);
        queued
    }
}
