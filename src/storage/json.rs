//! JSON file storage implementation
//!
//! This module provides a file-based implementation of the Storage trait.

use crate::storage::schema::CorpusFiles;
use crate::storage::traits::{Storage, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::Path;

/// JSON storage backend for one corpus
///
/// Writes go straight through `std::fs::write`; a process killed mid-write
/// can leave a truncated file, which the next `load` treats as empty.
pub struct JsonStore<R, M> {
    files: CorpusFiles,
    _marker: PhantomData<fn() -> (R, M)>,
}

impl<R, M> JsonStore<R, M> {
    /// Creates a store over an explicit pair of files
    pub fn new(files: CorpusFiles) -> Self {
        Self {
            files,
            _marker: PhantomData,
        }
    }

    /// Paths this store reads and writes
    pub fn files(&self) -> &CorpusFiles {
        &self.files
    }
}

impl<R, M> Clone for JsonStore<R, M> {
    fn clone(&self) -> Self {
        Self::new(self.files.clone())
    }
}

impl<R, M> std::fmt::Debug for JsonStore<R, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("files", &self.files)
            .finish()
    }
}

impl<R, M> Storage for JsonStore<R, M>
where
    R: Serialize + DeserializeOwned,
    M: Serialize + DeserializeOwned,
{
    type Record = R;
    type Meta = M;

    fn save(&self, records: &[R], meta: &M) -> StorageResult<()> {
        for path in [&self.files.records, &self.files.meta] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(&self.files.records, serde_json::to_vec_pretty(records)?)?;
        std::fs::write(&self.files.meta, serde_json::to_vec_pretty(meta)?)?;

        tracing::debug!(
            "Saved {} records to {}",
            records.len(),
            self.files.records.display()
        );
        Ok(())
    }

    fn load(&self) -> (Vec<R>, Option<M>) {
        let records = read_json::<Vec<R>>(&self.files.records).unwrap_or_default();
        let meta = read_json::<M>(&self.files.meta);
        (records, meta)
    }
}

/// Reads and parses one JSON file, logging instead of failing
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No stored data at {}", path.display());
            return None;
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                "Malformed stored data at {}, treating as empty: {}",
                path.display(),
                e
            );
            None
        }
    }
}
