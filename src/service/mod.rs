//! Service module
//!
//! This module ties the corpora to their callers:
//! - `query`: search operations over the live snapshots
//! - `refresh`: crawl or walk, persist, reindex, swap
//! - `tools`: the named tool surface and its stdio loop

mod query;
mod refresh;
mod tools;

pub use query::{ExampleMatch, QueryError, QueryService, ResultSummary, TopResult, TRUNCATION_MARKER};
pub use refresh::{
    apply_docs_overrides, apply_github_overrides, docs_store, examples_store, refresh_docs,
    refresh_examples, DocsRefreshReport, DocsRefreshRequest, ExamplesRefreshReport,
    ExamplesRefreshRequest,
};
pub use tools::{ToolContent, ToolRequest, ToolResponse, ToolServer, TOOL_NAMES};
