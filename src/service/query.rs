//! Query service
//!
//! Answers the two read operations against whatever snapshot is live when
//! the call starts. A refresh that lands mid-query does not affect it.

use crate::crawler::collapse_whitespace;
use crate::github::truncate_chars;
use crate::search::SearchError;
use crate::state::CorpusState;
use crate::storage::{GitHubExample, IndexMeta, IndexedPage};
use crate::url::ScopeFilter;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Appended to page text cut at `max_chars`
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Summaries returned next to the top page
const SUMMARY_COUNT: usize = 3;

/// Code blocks returned with the top page
const MAX_CODE_BLOCKS: usize = 5;

/// Expected and unexpected query failures
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No index loaded; run a refresh first")]
    NoIndex,

    #[error("No results for '{query}'")]
    NoResults { query: String },

    #[error("Stored URL is outside the allowed scope: {url}")]
    ScopeViolation { url: String },

    #[error("Search hit {id} has no stored record; rebuild the index")]
    InternalInconsistency { id: String },

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

/// One line of the ranked result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub title: String,
    pub url: String,
    pub score: f32,
}

/// The best matching page and its neighbours in the ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopResult {
    pub title: String,
    pub url: String,
    pub headings: Vec<String>,

    /// Body text, cut to the requested length
    pub text: String,
    pub truncated: bool,
    pub score: f32,
    pub top_results: Vec<ResultSummary>,

    /// Empty unless code was requested
    pub code_blocks: Vec<String>,
}

/// One code example match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleMatch {
    pub score: f32,
    pub example: GitHubExample,
}

/// Read-side operations over the live corpora
#[derive(Debug, Clone)]
pub struct QueryService {
    state: Arc<CorpusState>,
    fallback_scope: ScopeFilter,
}

impl QueryService {
    /// `fallback_scope` applies when the docs corpus has no stored metadata
    pub fn new(state: Arc<CorpusState>, fallback_scope: ScopeFilter) -> Self {
        Self {
            state,
            fallback_scope,
        }
    }

    pub fn state(&self) -> &Arc<CorpusState> {
        &self.state
    }

    /// Resolves the best page for `query`
    ///
    /// The page URL is checked against the scope the corpus was crawled
    /// with before anything is returned.
    pub fn open_top_result(
        &self,
        query: &str,
        include_code: bool,
        max_chars: usize,
    ) -> Result<TopResult, QueryError> {
        let corpus = self.state.docs();
        if corpus.is_empty() {
            return Err(QueryError::NoIndex);
        }

        let hits = corpus.index().search(query, SUMMARY_COUNT)?;
        let Some(top) = hits.first() else {
            return Err(QueryError::NoResults {
                query: query.to_string(),
            });
        };

        let page = corpus
            .get(&top.id)
            .ok_or_else(|| QueryError::InternalInconsistency { id: top.id.clone() })?;

        let scope = scope_for(corpus.meta(), &self.fallback_scope);
        if !scope.is_allowed(&page.url) {
            tracing::warn!("Stored page {} is outside {:?}", page.url, scope);
            return Err(QueryError::ScopeViolation {
                url: page.url.clone(),
            });
        }

        let top_results = hits
            .iter()
            .filter_map(|hit| match corpus.get(&hit.id) {
                Some(page) => Some(summary(page, hit.score)),
                None => {
                    tracing::warn!("Search hit {} has no stored record", hit.id);
                    None
                }
            })
            .collect();

        let (text, truncated) = truncate_text(&page.text, max_chars);
        let code_blocks = if include_code {
            page.code_blocks.iter().take(MAX_CODE_BLOCKS).cloned().collect()
        } else {
            Vec::new()
        };

        Ok(TopResult {
            title: page.title.clone(),
            url: page.url.clone(),
            headings: page.headings.clone(),
            text,
            truncated,
            score: top.score,
            top_results,
            code_blocks,
        })
    }

    /// Ranks code examples, optionally restricted to one language tag
    ///
    /// At most `max_results` matches are returned; a limit of zero always
    /// yields `QueryError::NoResults`.
    pub fn search_examples(
        &self,
        query: &str,
        language: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<ExampleMatch>, QueryError> {
        let corpus = self.state.examples();
        if corpus.is_empty() {
            return Err(QueryError::NoIndex);
        }

        let language = language.map(str::trim).filter(|l| !l.is_empty());
        let hits = corpus.index().search(query, corpus.len())?;

        let mut matches = Vec::new();
        for hit in hits {
            if matches.len() >= max_results {
                break;
            }
            let example = corpus
                .get(&hit.id)
                .ok_or_else(|| QueryError::InternalInconsistency { id: hit.id.clone() })?;
            if language.is_some_and(|l| example.language != l) {
                continue;
            }
            matches.push(ExampleMatch {
                score: hit.score,
                example: example.clone(),
            });
        }

        if matches.is_empty() {
            return Err(QueryError::NoResults {
                query: query.to_string(),
            });
        }
        Ok(matches)
    }
}

/// The scope recorded with the corpus, else the configured one
fn scope_for(meta: Option<&IndexMeta>, fallback: &ScopeFilter) -> ScopeFilter {
    match meta {
        Some(meta) if !meta.allowed_host.is_empty() => ScopeFilter::new(
            meta.allowed_host.clone(),
            meta.allowed_path_prefixes.clone(),
        ),
        _ => fallback.clone(),
    }
}

fn summary(page: &IndexedPage, score: f32) -> ResultSummary {
    let title = collapse_whitespace(&page.title);
    ResultSummary {
        title: if title.is_empty() { page.url.clone() } else { title },
        url: page.url.clone(),
        score,
    }
}

/// Cuts `text` to `max_chars` characters and appends the marker if cut
fn truncate_text(text: &str, max_chars: usize) -> (String, bool) {
    let cut = truncate_chars(text, max_chars);
    if cut.len() == text.len() {
        (text.to_string(), false)
    } else {
        (format!("{}{}", cut, TRUNCATION_MARKER), true)
    }
}
