//! Output module for reporting corpus status
//!
//! This module handles:
//! - Summarising the loaded corpora
//! - Printing the summary for the `--stats` command

pub mod stats;

pub use stats::{
    load_statistics, print_statistics, CorpusStatistics, DocsStatistics, ExamplesStatistics,
};
