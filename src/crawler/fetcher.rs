//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the identifying header set
//! - GET requests to fetch page content within a bounded timeout
//! - Following redirects hop by hop, stopping at the first hop outside scope
//! - Error classification into HTTP status and transport failures
//!
//! There is no retry at this layer; the crawl engine's failure counting
//! decides what a failure means.

use crate::config::UserAgentConfig;
use crate::url::{normalize, ScopeFilter};
use crate::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use url::Url;

/// Longest redirect chain followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Body and final location of a successful fetch
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Result of a scope-checked fetch
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The page was reached without leaving scope
    Page(RawPage),

    /// A redirect pointed outside scope; the target was never requested
    LeftScope {
        /// The out-of-scope redirect target
        target: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Bound on the whole request, connect included
///
/// # Example
///
/// ```no_run
/// use docs_indexer::config::UserAgentConfig;
/// use docs_indexer::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    client_builder(config, timeout).build()
}

fn client_builder(config: &UserAgentConfig, timeout: Duration) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
}

/// Page fetcher bound to one client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with the identifying headers and timeout
    ///
    /// The client does not follow redirects on its own; [`Fetcher::fetch`]
    /// follows them so every hop can be vetted.
    pub fn from_config(
        config: &UserAgentConfig,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = client_builder(config, timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self::new(client))
    }

    /// Issues one GET request, following redirects
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Ok(RawPage)` |
    /// | Redirect chain longer than 10 hops | `FetchError::Transport` |
    /// | Any other status | `FetchError::HttpStatus` |
    /// | Connect failure, timeout, unreadable body | `FetchError::Transport` |
    pub async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        match self.follow(url, None).await? {
            FetchOutcome::Page(page) => Ok(page),
            FetchOutcome::LeftScope { target } => Err(FetchError::Transport {
                url: url.to_string(),
                message: format!("Redirected to {}", target),
            }),
        }
    }

    /// Like [`Fetcher::fetch`], but stops before requesting a redirect
    /// target that `scope` rejects
    pub async fn fetch_in_scope(
        &self,
        url: &str,
        scope: &ScopeFilter,
    ) -> Result<FetchOutcome, FetchError> {
        self.follow(url, Some(scope)).await
    }

    async fn follow(
        &self,
        url: &str,
        scope: Option<&ScopeFilter>,
    ) -> Result<FetchOutcome, FetchError> {
        let mut current = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(&current)
                .send()
                .await
                .map_err(|e| classify_transport(&current, &e))?;

            let status = response.status();
            if status.is_redirection() {
                let Some(target) = redirect_target(&response) else {
                    return Err(FetchError::HttpStatus {
                        url: current,
                        code: status.as_u16(),
                    });
                };
                if scope.is_some_and(|scope| !scope.is_allowed(&normalize(&target))) {
                    return Ok(FetchOutcome::LeftScope { target });
                }
                tracing::debug!("Redirect {} -> {}", current, target);
                current = target;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    url: current,
                    code: status.as_u16(),
                });
            }

            let final_url = response.url().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| classify_transport(&current, &e))?;

            return Ok(FetchOutcome::Page(RawPage {
                final_url,
                status_code: status.as_u16(),
                body,
            }));
        }

        Err(FetchError::Transport {
            url: url.to_string(),
            message: format!("More than {} redirects", MAX_REDIRECTS),
        })
    }
}

/// Absolute target of a redirect response, resolved against its URL
fn redirect_target(response: &Response) -> Option<String> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    let base: &Url = response.url();
    base.join(location).ok().map(|target| target.to_string())
}

/// Maps a reqwest error onto the transport variant with a readable message
pub(crate) fn classify_transport(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}
