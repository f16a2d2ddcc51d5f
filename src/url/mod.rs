//! URL scope module for Docs-Indexer
//!
//! This module provides URL normalization and the host + path-prefix
//! allowlist that decides which URLs may be crawled, stored, or served.
//! Every URL that enters the frontier, gets stored, or is re-checked at
//! query time goes through [`normalize`] and then [`ScopeFilter::is_allowed`].

mod domain;
mod normalize;

use crate::config::DocsConfig;
use ::url::Url;

pub use domain::extract_domain;
pub use normalize::normalize;

/// Host and path-prefix allowlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    allowed_host: String,
    allowed_prefixes: Vec<String>,
}

impl ScopeFilter {
    /// Creates a filter for a single host and a set of path prefixes
    pub fn new(allowed_host: impl Into<String>, allowed_prefixes: Vec<String>) -> Self {
        Self {
            allowed_host: allowed_host.into().to_lowercase(),
            allowed_prefixes,
        }
    }

    /// Builds the filter described by the docs crawl configuration
    pub fn from_config(config: &DocsConfig) -> Self {
        Self::new(
            config.allowed_host.clone(),
            config.allowed_path_prefixes.clone(),
        )
    }

    /// The configured host
    pub fn allowed_host(&self) -> &str {
        &self.allowed_host
    }

    /// The configured path prefixes
    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// Returns true iff the URL's host equals the allowed host and its path
    /// starts with one of the allowed prefixes
    ///
    /// A path equal to a prefix without its trailing slash also matches, so
    /// the canonical form of a prefix URL stays in scope. Any parse failure
    /// yields false.
    ///
    /// # Examples
    ///
    /// ```
    /// use docs_indexer::url::ScopeFilter;
    ///
    /// let scope = ScopeFilter::new("docs.example.com", vec!["/Product/".to_string()]);
    /// assert!(scope.is_allowed("https://docs.example.com/Product/page2"));
    /// assert!(!scope.is_allowed("https://docs.example.com/Other/page3"));
    /// assert!(!scope.is_allowed("https://other.example.com/Product/page4"));
    /// ```
    pub fn is_allowed(&self, url_str: &str) -> bool {
        let url = match Url::parse(url_str) {
            Ok(url) => url,
            Err(_) => return false,
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match extract_domain(&url) {
            Some(host) if host == self.allowed_host => {}
            _ => return false,
        }

        let path = url.path();
        self.allowed_prefixes.iter().any(|prefix| {
            path.starts_with(prefix.as_str())
                || (prefix.len() > 1 && path == prefix.trim_end_matches('/'))
        })
    }

    /// Normalizes a URL and returns it only if it is in scope
    pub fn admit(&self, url_str: &str) -> Option<String> {
        let canonical = normalize(url_str);
        self.is_allowed(&canonical).then_some(canonical)
    }
}
