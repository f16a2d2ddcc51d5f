//! Loaded corpora and their search indexes
//!
//! A corpus snapshot is immutable once built. Refreshes build a complete new
//! snapshot and swap it in; readers holding the old `Arc` keep a consistent
//! view until they drop it.

use crate::search::{Indexable, SearchIndex, SearchResult};
use crate::storage::{
    DocsStore, ExamplesStore, GitHubExample, GitHubMeta, IndexMeta, IndexedPage, Storage,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Records, metadata, and the index built over them
#[derive(Debug)]
pub struct Corpus<R, M> {
    records: Vec<R>,
    meta: Option<M>,
    index: SearchIndex<R>,
    positions: HashMap<String, usize>,
}

/// Snapshot of the documentation corpus
pub type DocsCorpus = Corpus<IndexedPage, IndexMeta>;

/// Snapshot of the code example corpus
pub type ExamplesCorpus = Corpus<GitHubExample, GitHubMeta>;

impl<R: Indexable, M> Corpus<R, M> {
    /// Indexes `records` and wraps them with their metadata
    pub fn build(records: Vec<R>, meta: Option<M>) -> SearchResult<Self> {
        let index = SearchIndex::build(&records)?;

        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            positions.entry(record.id().to_string()).or_insert(position);
        }

        Ok(Self {
            records,
            meta,
            index,
            positions,
        })
    }

    pub fn empty() -> SearchResult<Self> {
        Self::build(Vec::new(), None)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    pub fn index(&self) -> &SearchIndex<R> {
        &self.index
    }

    /// Looks a record up by id
    pub fn get(&self, id: &str) -> Option<&R> {
        self.positions.get(id).and_then(|&i| self.records.get(i))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The two live corpora shared between query handling and refreshes
#[derive(Debug)]
pub struct CorpusState {
    docs: RwLock<Arc<DocsCorpus>>,
    examples: RwLock<Arc<ExamplesCorpus>>,
}

impl CorpusState {
    pub fn new(docs: DocsCorpus, examples: ExamplesCorpus) -> Self {
        Self {
            docs: RwLock::new(Arc::new(docs)),
            examples: RwLock::new(Arc::new(examples)),
        }
    }

    /// State with nothing loaded
    pub fn empty() -> SearchResult<Self> {
        Ok(Self::new(DocsCorpus::empty()?, ExamplesCorpus::empty()?))
    }

    /// Loads both corpora from disk and indexes them
    ///
    /// Missing or malformed files yield empty corpora.
    pub fn load(docs_store: &DocsStore, examples_store: &ExamplesStore) -> SearchResult<Self> {
        let (pages, docs_meta) = docs_store.load();
        let (examples, examples_meta) = examples_store.load();
        tracing::info!(
            "Loaded {} pages and {} examples from disk",
            pages.len(),
            examples.len()
        );

        Ok(Self::new(
            DocsCorpus::build(pages, docs_meta)?,
            ExamplesCorpus::build(examples, examples_meta)?,
        ))
    }

    /// Current documentation snapshot
    pub fn docs(&self) -> Arc<DocsCorpus> {
        Arc::clone(&self.docs.read())
    }

    /// Current code example snapshot
    pub fn examples(&self) -> Arc<ExamplesCorpus> {
        Arc::clone(&self.examples.read())
    }

    /// Swaps in a new documentation snapshot
    pub fn replace_docs(&self, corpus: DocsCorpus) {
        *self.docs.write() = Arc::new(corpus);
    }

    /// Swaps in a new code example snapshot
    pub fn replace_examples(&self, corpus: ExamplesCorpus) {
        *self.examples.write() = Arc::new(corpus);
    }
}
