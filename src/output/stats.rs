//! Corpus statistics
//!
//! This module provides functionality for summarising the loaded corpora
//! and displaying the summary.

use crate::state::CorpusState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Documentation corpus summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsStatistics {
    /// Pages currently loaded
    pub page_count: usize,

    pub last_refresh: Option<DateTime<Utc>>,
    pub start_url: Option<String>,
    pub max_pages: Option<usize>,
    pub visited_count: Option<usize>,
    pub failed_count: Option<usize>,
    pub allowed_host: Option<String>,
    pub allowed_path_prefixes: Vec<String>,

    /// The stored corpus is a checkpoint of an unfinished crawl
    pub in_progress: bool,
}

/// Code example corpus summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplesStatistics {
    pub example_count: usize,
    pub last_refresh: Option<DateTime<Utc>>,

    /// Examples per `owner/repo`
    pub repositories: BTreeMap<String, usize>,

    /// Examples per language tag
    pub languages: BTreeMap<String, usize>,
}

/// Summary of both corpora
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStatistics {
    pub docs: DocsStatistics,
    pub examples: ExamplesStatistics,
}

/// Summarises the current snapshots
pub fn load_statistics(state: &CorpusState) -> CorpusStatistics {
    let docs = state.docs();
    let examples = state.examples();

    let meta = docs.meta();
    let docs_stats = DocsStatistics {
        page_count: docs.len(),
        last_refresh: meta.map(|m| m.last_refresh),
        start_url: meta.map(|m| m.start_url.clone()),
        max_pages: meta.map(|m| m.max_pages),
        visited_count: meta.map(|m| m.visited_count),
        failed_count: meta.map(|m| m.failed_count),
        allowed_host: meta.map(|m| m.allowed_host.clone()),
        allowed_path_prefixes: meta
            .map(|m| m.allowed_path_prefixes.clone())
            .unwrap_or_default(),
        in_progress: meta.is_some_and(|m| m.in_progress),
    };

    let mut languages = BTreeMap::new();
    for example in examples.records() {
        *languages.entry(example.language.clone()).or_insert(0) += 1;
    }

    let examples_meta = examples.meta();
    let examples_stats = ExamplesStatistics {
        example_count: examples.len(),
        last_refresh: examples_meta.and_then(|m| m.last_refresh),
        repositories: examples_meta
            .map(|m| m.repositories.clone())
            .unwrap_or_default(),
        languages,
    };

    CorpusStatistics {
        docs: docs_stats,
        examples: examples_stats,
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    let docs = &stats.docs;
    println!("Documentation:");
    println!("  Pages indexed: {}", docs.page_count);
    println!("  Last refresh: {}", format_time(docs.last_refresh));
    if let Some(start_url) = &docs.start_url {
        println!("  Start URL: {}", start_url);
    }
    if let Some(host) = &docs.allowed_host {
        println!("  Scope: {} {:?}", host, docs.allowed_path_prefixes);
    }
    if let (Some(visited), Some(failed)) = (docs.visited_count, docs.failed_count) {
        println!("  Visited: {}, failed: {}", visited, failed);
    }
    if docs.in_progress {
        println!("  Note: stored corpus is an unfinished crawl checkpoint");
    }
    println!();

    let examples = &stats.examples;
    println!("Code examples:");
    println!("  Examples indexed: {}", examples.example_count);
    println!("  Last refresh: {}", format_time(examples.last_refresh));
    if !examples.repositories.is_empty() {
        println!("  Repositories:");
        for (repo, count) in &examples.repositories {
            println!("    {}: {}", repo, count);
        }
    }
    if !examples.languages.is_empty() {
        println!("  Languages:");
        let mut counts: Vec<_> = examples.languages.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (language, count) in counts {
            println!("    {}: {}", language, count);
        }
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}
