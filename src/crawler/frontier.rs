//! Frontier queue for breadth-first traversal
//!
//! URLs are served strictly first-in first-out. A URL already waiting in
//! the queue is not queued a second time; whether it was already visited
//! is the crawl state's concern.

use std::collections::{HashSet, VecDeque};

/// FIFO queue of canonical URLs awaiting a fetch
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    pending: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding the given URLs in order
    pub fn new(initial: impl IntoIterator<Item = String>) -> Self {
        let mut frontier = Self::default();
        for url in initial {
            frontier.push(url);
        }
        frontier
    }

    /// Appends a URL unless it is already waiting
    ///
    /// # Returns
    ///
    /// `true` if the URL was added
    pub fn push(&mut self, url: String) -> bool {
        if self.pending.contains(&url) {
            return false;
        }
        self.pending.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the oldest URL
    pub fn pop(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.pending.remove(&url);
        Some(url)
    }

    /// Returns the number of URLs waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns whether a URL is waiting
    pub fn contains(&self, url: &str) -> bool {
        self.pending.contains(url)
    }
}
