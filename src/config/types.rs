use serde::Deserialize;

/// Main configuration structure for Docs-Indexer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub docs: DocsConfig,
    pub github: GitHubConfig,
    pub storage: StorageConfig,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "DocsIndexer".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/docs-indexer/docs-indexer".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the identifying header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Documentation crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DocsConfig {
    /// Where the breadth-first traversal starts
    pub start_url: String,

    /// The only host pages may be fetched from
    pub allowed_host: String,

    /// Path prefixes a URL must start with to be crawled
    pub allowed_path_prefixes: Vec<String>,

    /// Stop once this many pages have been indexed
    pub max_pages: usize,

    /// Pause between fetches (milliseconds)
    pub delay_ms: u64,

    /// Persist in-progress results every this many successful pages
    pub checkpoint_interval: usize,

    /// Consecutive fetch failures that terminate the crawl
    pub max_consecutive_failures: u32,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// CSS selectors stripped from body text in addition to the fixed set
    pub boilerplate_selectors: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            start_url: "https://docs.example.com/Product/".to_string(),
            allowed_host: "docs.example.com".to_string(),
            allowed_path_prefixes: vec!["/Product/".to_string()],
            max_pages: 500,
            delay_ms: 500,
            checkpoint_interval: 50,
            max_consecutive_failures: 10,
            request_timeout_secs: 30,
            boilerplate_selectors: vec![
                ".sidebar".to_string(),
                ".breadcrumb".to_string(),
                ".breadcrumbs".to_string(),
                ".toc".to_string(),
                ".table-of-contents".to_string(),
                ".navigation".to_string(),
                ".feedback".to_string(),
                ".cookie-banner".to_string(),
            ],
        }
    }
}

/// Repository walk configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// REST API root used for directory listings
    pub api_base_url: String,

    /// Optional bearer token
    pub token: Option<String>,

    /// Stop once this many examples have been collected
    pub max_files: usize,

    /// Maximum directory depth below each base path
    pub max_depth: usize,

    /// Pause between file fetches (milliseconds)
    pub file_delay_ms: u64,

    /// Pause between directory listings, base paths and repositories (milliseconds)
    pub repo_delay_ms: u64,

    /// Files shorter than this (bytes) are discarded
    pub min_content_length: usize,

    /// Stored content is truncated to this many bytes
    pub max_content_size: usize,

    /// Listed files larger than this (bytes) are never fetched
    pub max_file_size: u64,

    /// File extensions (without dot) that are collected
    pub extensions: Vec<String>,

    /// Directory names that are never descended into
    pub skip_dirs: Vec<String>,

    /// Repositories to walk
    pub repositories: Vec<RepositoryEntry>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            token: None,
            max_files: 200,
            max_depth: 3,
            file_delay_ms: 100,
            repo_delay_ms: 1000,
            min_content_length: 50,
            max_content_size: 50_000,
            max_file_size: 200_000,
            extensions: ["js", "ts", "jsx", "tsx", "cs", "java", "py", "html", "md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_dirs: [
                "node_modules",
                ".git",
                ".github",
                "dist",
                "build",
                "bin",
                "obj",
                "target",
                "vendor",
                "packages",
                "__pycache__",
                "coverage",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            repositories: Vec::new(),
        }
    }
}

/// A repository and the paths inside it to walk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositoryEntry {
    pub owner: String,
    pub repo: String,

    /// Directories to start from; empty string is the repository root
    #[serde(default = "default_base_paths")]
    pub base_paths: Vec<String>,
}

impl RepositoryEntry {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn default_base_paths() -> Vec<String> {
    vec![String::new()]
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory holding the four corpus JSON files
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}
