//! Storage traits and error types
//!
//! This module defines the trait interface for corpus stores and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for corpus store implementations
///
/// A store holds one record collection and its single metadata object.
/// Loading never fails: missing or malformed files read as an empty
/// corpus so a corrupt checkpoint cannot block a restart.
pub trait Storage {
    /// Record type of the collection
    type Record;

    /// Metadata type describing the collection
    type Meta;

    /// Writes records and metadata, creating the storage location if needed
    fn save(&self, records: &[Self::Record], meta: &Self::Meta) -> StorageResult<()>;

    /// Reads records and metadata
    ///
    /// # Returns
    ///
    /// The stored records (empty if absent or unreadable) and the metadata
    /// (None if absent or unreadable)
    fn load(&self) -> (Vec<Self::Record>, Option<Self::Meta>);
}
