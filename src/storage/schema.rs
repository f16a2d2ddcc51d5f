//! On-disk layout of the corpus files

use std::path::{Path, PathBuf};

/// Paths of one corpus's record file and metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFiles {
    pub records: PathBuf,
    pub meta: PathBuf,
}

impl CorpusFiles {
    /// `docs-pages.json` / `docs-meta.json` under `data_dir`
    pub fn docs(data_dir: &Path) -> Self {
        Self {
            records: data_dir.join("docs-pages.json"),
            meta: data_dir.join("docs-meta.json"),
        }
    }

    /// `github-examples.json` / `github-meta.json` under `data_dir`
    pub fn github(data_dir: &Path) -> Self {
        Self {
            records: data_dir.join("github-examples.json"),
            meta: data_dir.join("github-meta.json"),
        }
    }
}
