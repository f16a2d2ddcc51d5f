//! GitHub module for collecting code examples
//!
//! This module contains:
//! - A contents API client
//! - The repository walker
//! - Name, description, and language extraction for fetched files

mod client;
mod metadata;
mod walker;

pub use client::{ContentEntry, EntryKind, GitHubClient};
pub use metadata::{
    build_example, classify_kind, extract_description, extract_member_names,
    extract_type_names, language_for_path, truncate_bytes, truncate_chars,
};
pub use walker::{RepositoryWalker, WalkOutcome};
