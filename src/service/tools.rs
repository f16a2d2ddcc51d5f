//! Request/response tool surface
//!
//! Five named tools over the live corpora. Every call produces a
//! [`ToolResponse`]; failures are reported in the payload and never escape
//! as errors. [`ToolServer::serve`] runs the tools over newline-delimited
//! JSON.

use crate::config::Config;
use crate::output::load_statistics;
use crate::service::query::{QueryError, QueryService};
use crate::service::refresh::{
    refresh_docs, refresh_examples, DocsRefreshRequest, ExamplesRefreshRequest,
};
use crate::state::CorpusState;
use crate::url::ScopeFilter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Names accepted by [`ToolServer::call`]
pub const TOOL_NAMES: &[&str] = &[
    "status",
    "refresh_docs",
    "search_docs",
    "refresh_examples",
    "search_examples",
];

const DEFAULT_MAX_CHARS: usize = 5000;
const DEFAULT_MAX_RESULTS: usize = 5;

/// One block of response content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Payload returned for every tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Pretty JSON of `value` as a text block
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("Failed to encode response: {}", e)),
        }
    }

    /// First text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| c.text.as_str())
    }
}

/// One line of input to [`ToolServer::serve`]
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RefreshDocsArgs {
    start_url: Option<String>,
    max_pages: Option<usize>,
    delay: Option<u64>,
    #[serde(rename = "continue")]
    resume: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchDocsArgs {
    query: String,
    #[serde(default = "default_true")]
    include_code: bool,
    #[serde(default = "default_max_chars")]
    max_chars: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RefreshExamplesArgs {
    max_files: Option<usize>,
    token: Option<String>,
    delay: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchExamplesArgs {
    query: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Dispatches tool calls against shared corpus state
pub struct ToolServer {
    config: Config,
    state: Arc<CorpusState>,
    query: QueryService,
}

impl ToolServer {
    pub fn new(config: Config, state: Arc<CorpusState>) -> Self {
        let query = QueryService::new(Arc::clone(&state), ScopeFilter::from_config(&config.docs));
        Self {
            config,
            state,
            query,
        }
    }

    pub fn query(&self) -> &QueryService {
        &self.query
    }

    /// Runs one tool
    pub async fn call(&self, tool: &str, arguments: Value) -> ToolResponse {
        tracing::debug!("Tool call: {}", tool);

        match tool {
            "status" => ToolResponse::json(&load_statistics(&self.state)),
            "refresh_docs" => match parse_args::<RefreshDocsArgs>(tool, arguments) {
                Ok(args) => {
                    let request = DocsRefreshRequest {
                        start_url: args.start_url,
                        max_pages: args.max_pages,
                        delay_ms: args.delay,
                        resume: args.resume,
                    };
                    match refresh_docs(&self.config, &self.state, &request).await {
                        Ok(report) => ToolResponse::json(&report),
                        Err(e) => ToolResponse::error(format!("Documentation refresh failed: {}", e)),
                    }
                }
                Err(response) => response,
            },
            "search_docs" => match parse_args::<SearchDocsArgs>(tool, arguments) {
                Ok(args) => query_response(self.query.open_top_result(
                    &args.query,
                    args.include_code,
                    args.max_chars,
                )),
                Err(response) => response,
            },
            "refresh_examples" => match parse_args::<RefreshExamplesArgs>(tool, arguments) {
                Ok(args) => {
                    let request = ExamplesRefreshRequest {
                        max_files: args.max_files,
                        token: args.token,
                        delay_ms: args.delay,
                    };
                    match refresh_examples(&self.config, &self.state, &request).await {
                        Ok(report) => ToolResponse::json(&report),
                        Err(e) => ToolResponse::error(format!("Example refresh failed: {}", e)),
                    }
                }
                Err(response) => response,
            },
            "search_examples" => match parse_args::<SearchExamplesArgs>(tool, arguments) {
                Ok(args) => query_response(self.query.search_examples(
                    &args.query,
                    args.language.as_deref(),
                    args.max_results,
                )),
                Err(response) => response,
            },
            other => ToolResponse::error(format!(
                "Unknown tool '{}'. Available tools: {}",
                other,
                TOOL_NAMES.join(", ")
            )),
        }
    }

    /// Parses and runs one request line
    pub async fn handle_line(&self, line: &str) -> ToolResponse {
        match serde_json::from_str::<ToolRequest>(line) {
            Ok(request) => self.call(&request.tool, request.arguments).await,
            Err(e) => ToolResponse::error(format!("Invalid request: {}", e)),
        }
    }

    /// Answers one response line per request line until input ends
    ///
    /// Blank lines are ignored.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("Serving tools: {}", TOOL_NAMES.join(", "));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line).await;
            let mut encoded = serde_json::to_string(&response).map_err(std::io::Error::other)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }

        tracing::info!("Input closed, stopping");
        Ok(())
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolResponse> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };

    serde_json::from_value(arguments)
        .map_err(|e| ToolResponse::error(format!("Invalid arguments for {}: {}", tool, e)))
}

/// Maps a query outcome onto a payload
///
/// An empty corpus or an empty result is an answer, not a failure.
fn query_response<T: Serialize>(result: Result<T, QueryError>) -> ToolResponse {
    match result {
        Ok(value) => ToolResponse::json(&value),
        Err(e @ (QueryError::NoIndex | QueryError::NoResults { .. })) => {
            ToolResponse::text(e.to_string())
        }
        Err(e) => ToolResponse::error(e.to_string()),
    }
}
