//! Repository file walker
//!
//! Walks each configured repository with an explicit work list of
//! `(path, depth)` pairs instead of recursion, one request at a time.
//! The file cap is global across repositories.

use crate::config::{GitHubConfig, RepositoryEntry, UserAgentConfig};
use crate::github::client::{ContentEntry, EntryKind, GitHubClient};
use crate::github::metadata::{build_example, truncate_bytes};
use crate::storage::{GitHubExample, GitHubMeta};
use crate::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Result of one walk over all repositories
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    pub examples: Vec<GitHubExample>,

    /// Examples collected per `owner/repo`
    pub per_repository: BTreeMap<String, usize>,

    /// Listings and file fetches that failed
    pub failures: usize,
}

impl WalkOutcome {
    /// Metadata record describing this walk
    pub fn meta(&self) -> GitHubMeta {
        GitHubMeta {
            total_examples: self.examples.len(),
            last_refresh: Some(Utc::now()),
            repositories: self.per_repository.clone(),
        }
    }
}

/// Walks repositories and collects source files as examples
pub struct RepositoryWalker {
    client: GitHubClient,
    config: GitHubConfig,
}

impl RepositoryWalker {
    pub fn new(client: GitHubClient, config: GitHubConfig) -> Self {
        Self { client, config }
    }

    /// Builds a walker and its API client from configuration
    pub fn from_config(user_agent: &UserAgentConfig, config: GitHubConfig) -> Result<Self> {
        let client = GitHubClient::from_config(user_agent, &config)?;
        Ok(Self::new(client, config))
    }

    /// Walks every configured repository until done or the file cap is hit
    ///
    /// Individual listing and fetch failures are logged and skipped.
    pub async fn run(&self) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let timer = Instant::now();

        tracing::info!(
            "Walking {} repositories (max {} files, authenticated: {})",
            self.config.repositories.len(),
            self.config.max_files,
            self.client.is_authenticated()
        );

        let mut first_walk = true;
        'repos: for repo in &self.config.repositories {
            outcome.per_repository.entry(repo.full_name()).or_insert(0);

            for base_path in &repo.base_paths {
                if outcome.examples.len() >= self.config.max_files {
                    break 'repos;
                }
                if !first_walk {
                    pause(self.config.repo_delay_ms).await;
                }
                first_walk = false;

                self.walk_base_path(repo, base_path, &mut outcome).await;
            }
        }

        tracing::info!(
            "Walk finished: {} examples, {} failures in {:?}",
            outcome.examples.len(),
            outcome.failures,
            timer.elapsed()
        );
        outcome
    }

    /// Walks one base path of one repository down to the configured depth
    ///
    /// Every listing after the first waits `repo_delay_ms`.
    async fn walk_base_path(
        &self,
        repo: &RepositoryEntry,
        base_path: &str,
        outcome: &mut WalkOutcome,
    ) {
        let name = repo.full_name();
        tracing::debug!("Walking {}/{}", name, base_path);

        let mut work: Vec<(String, usize)> = vec![(base_path.to_string(), 0)];
        let mut first_listing = true;

        while let Some((path, depth)) = work.pop() {
            if outcome.examples.len() >= self.config.max_files {
                return;
            }
            if !first_listing {
                pause(self.config.repo_delay_ms).await;
            }
            first_listing = false;

            let entries = match self.client.list_directory(&repo.owner, &repo.repo, &path).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Listing failed: {}", e);
                    outcome.failures += 1;
                    continue;
                }
            };

            let mut subdirectories = Vec::new();
            for entry in entries {
                match entry.kind {
                    EntryKind::Dir => {
                        if depth < self.config.max_depth && !self.is_skipped_dir(&entry.name) {
                            subdirectories.push((entry.path, depth + 1));
                        }
                    }
                    EntryKind::File => {
                        if outcome.examples.len() >= self.config.max_files {
                            return;
                        }
                        if !self.wants_file(&entry) {
                            continue;
                        }
                        if let Some(example) = self.collect_file(repo, &entry, outcome).await {
                            *outcome.per_repository.entry(name.clone()).or_insert(0) += 1;
                            outcome.examples.push(example);
                        }
                    }
                    EntryKind::Other => {}
                }
            }

            // Reversed so directories are walked in listing order
            work.extend(subdirectories.into_iter().rev());
        }
    }

    /// Fetches one file and turns it into an example
    ///
    /// Returns `None` if the fetch fails or the file is too short.
    async fn collect_file(
        &self,
        repo: &RepositoryEntry,
        entry: &ContentEntry,
        outcome: &mut WalkOutcome,
    ) -> Option<GitHubExample> {
        let download_url = entry.download_url.as_deref()?;

        let fetched = self.client.fetch_raw(download_url).await;
        pause(self.config.file_delay_ms).await;

        let content = match fetched {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("File fetch failed: {}", e);
                outcome.failures += 1;
                return None;
            }
        };

        if content.len() < self.config.min_content_length {
            tracing::debug!("Skipping short file {} ({} bytes)", entry.path, content.len());
            return None;
        }

        let content = truncate_bytes(&content, self.config.max_content_size).to_string();
        Some(build_example(
            repo,
            &entry.path,
            entry.html_url.as_deref(),
            content,
        ))
    }

    fn is_skipped_dir(&self, name: &str) -> bool {
        self.config.skip_dirs.iter().any(|skip| skip == name)
    }

    /// Extension and listed-size checks, made before any download
    fn wants_file(&self, entry: &ContentEntry) -> bool {
        let Some((_, extension)) = entry.name.rsplit_once('.') else {
            return false;
        };
        let extension = extension.to_ascii_lowercase();
        if !self.config.extensions.iter().any(|e| *e == extension) {
            return false;
        }
        if entry.size > self.config.max_file_size {
            tracing::debug!("Skipping large file {} ({} bytes)", entry.path, entry.size);
            return false;
        }
        true
    }
}

async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
