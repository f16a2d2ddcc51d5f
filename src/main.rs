//! Docs-Indexer main entry point
//!
//! This is the command-line interface for the documentation and code
//! example indexer.

use clap::{Parser, ValueEnum};
use docs_indexer::config::{load_config_with_hash, validate, Config};
use docs_indexer::output::{load_statistics, print_statistics};
use docs_indexer::service::{
    docs_store, examples_store, refresh_docs, refresh_examples, DocsRefreshRequest,
    ExamplesRefreshRequest, ToolServer,
};
use docs_indexer::CorpusState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Which corpus a refresh run rebuilds
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RefreshType {
    Docs,
    Github,
    All,
}

/// Docs-Indexer: a polite documentation and code example indexer
///
/// Crawls a documentation site within a fixed host and path scope, walks a
/// set of GitHub repositories for code examples, stores both as JSON, and
/// answers searches over them.
#[derive(Parser, Debug)]
#[command(name = "docs-indexer")]
#[command(version)]
#[command(about = "A polite documentation and code example indexer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Corpus to refresh
    #[arg(long = "type", value_enum, default_value = "all")]
    refresh_type: RefreshType,

    /// Maximum pages to crawl, or files to collect
    #[arg(long, value_name = "N")]
    max: Option<usize>,

    /// Delay between requests in milliseconds
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Documentation start URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Merge newly crawled pages onto the stored corpus
    #[arg(long = "continue")]
    resume: bool,

    /// GitHub access token
    #[arg(long, value_name = "TOKEN")]
    github_token: Option<String>,

    /// Serve the tool surface over stdin/stdout instead of refreshing
    #[arg(long, conflicts_with = "stats")]
    serve: bool,

    /// Show statistics for the stored corpora and exit
    #[arg(long, conflicts_with = "serve")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout carries protocol responses in serve mode
    setup_logging(cli.verbose, cli.quiet, cli.serve);

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if cli.serve {
        handle_serve(config).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_refresh(&cli, config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, to_stderr: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docs_indexer=info,warn"),
            1 => EnvFilter::new("docs_indexer=debug,info"),
            2 => EnvFilter::new("docs_indexer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    if to_stderr {
        builder.with_writer(std::io::stderr).with_ansi(false).init();
    } else {
        builder.init();
    }
}

/// Loads the configuration file, or validated defaults when none is given
fn load_configuration(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

fn load_state(config: &Config) -> Result<CorpusState, Box<dyn std::error::Error>> {
    let data_dir = Path::new(&config.storage.data_dir);
    Ok(CorpusState::load(
        &docs_store(data_dir),
        &examples_store(data_dir),
    )?)
}

/// Handles the --serve mode: answers tool requests until stdin closes
async fn handle_serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(load_state(&config)?);
    let server = ToolServer::new(config, state);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    server.serve(stdin, tokio::io::stdout()).await?;
    Ok(())
}

/// Handles the --stats mode: shows statistics for the stored corpora
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Data directory: {}\n", config.storage.data_dir);

    let state = load_state(config)?;
    print_statistics(&load_statistics(&state));

    Ok(())
}

/// Handles the refresh run for the selected corpora
async fn handle_refresh(cli: &Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state(&config)?;

    if matches!(cli.refresh_type, RefreshType::Docs | RefreshType::All) {
        let request = DocsRefreshRequest {
            start_url: cli.url.clone(),
            max_pages: cli.max,
            delay_ms: cli.delay,
            resume: cli.resume,
        };

        match refresh_docs(&config, &state, &request).await {
            Ok(report) => {
                tracing::info!(
                    "Documentation refresh complete: {} new pages, {} total, {} failures ({})",
                    report.new_pages,
                    report.total_pages,
                    report.failures,
                    report.stop_reason
                );
            }
            Err(e) => {
                tracing::error!("Documentation refresh failed: {}", e);
                return Err(e.into());
            }
        }
    }

    if matches!(cli.refresh_type, RefreshType::Github | RefreshType::All) {
        let request = ExamplesRefreshRequest {
            max_files: cli.max,
            token: cli.github_token.clone(),
            delay_ms: cli.delay,
        };

        match refresh_examples(&config, &state, &request).await {
            Ok(report) => {
                tracing::info!(
                    "Example refresh complete: {} examples, {} failures",
                    report.total_examples,
                    report.failures
                );
            }
            Err(e) => {
                tracing::error!("Example refresh failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
