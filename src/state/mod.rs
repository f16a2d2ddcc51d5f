//! State module
//!
//! # Components
//!
//! - `CrawlState`: frontier, visited set, results, and failure counters of
//!   one documentation crawl
//! - `CorpusState`: the live documentation and code example snapshots that
//!   queries read and refreshes replace

mod corpus;
mod crawl_state;

pub use corpus::{Corpus, CorpusState, DocsCorpus, ExamplesCorpus};
pub use crawl_state::{CrawlState, StopReason};
