//! Crawler module for documentation page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a bounded timeout
//! - HTML content and link extraction
//! - The FIFO frontier
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{build_index_meta, merge_pages, Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, RawPage};
pub(crate) use fetcher::classify_transport;
pub use frontier::Frontier;
pub use parser::{collapse_whitespace, ContentExtractor, ParsedPage};
pub use crate::state::StopReason;
