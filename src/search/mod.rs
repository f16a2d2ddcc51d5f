//! Search module
//!
//! Full-text ranking over a corpus held in memory. Documentation pages and
//! code examples each get their own index with their own field weights.

mod index;
mod schema;

pub use index::{SearchHit, SearchIndex};
pub use schema::{FieldSpec, Indexable};

use thiserror::Error;

/// Errors raised while building or querying an index
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;
