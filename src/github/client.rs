//! GitHub REST client
//!
//! Two calls are needed: the contents listing of one directory and the raw
//! body of one file.

use crate::config::{GitHubConfig, UserAgentConfig};
use crate::crawler::{build_http_client, classify_transport};
use crate::FetchError;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

/// Per-request timeout for API and raw content calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a contents listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Client for the repository contents API
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(client: Client, api_base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Builds a client with the identifying headers and the configured token
    pub fn from_config(
        user_agent: &UserAgentConfig,
        config: &GitHubConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, REQUEST_TIMEOUT)?;
        Ok(Self::new(
            client,
            config.api_base_url.clone(),
            config.token.clone(),
        ))
    }

    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Lists one directory of a repository
    ///
    /// An empty `path` lists the repository root.
    pub async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<ContentEntry>, FetchError> {
        let path = path.trim_matches('/');
        let url = if path.is_empty() {
            format!("{}/repos/{}/{}/contents", self.api_base_url, owner, repo)
        } else {
            format!(
                "{}/repos/{}/{}/contents/{}",
                self.api_base_url, owner, repo, path
            )
        };

        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| classify_transport(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url,
                code: status.as_u16(),
            });
        }

        response
            .json::<Vec<ContentEntry>>()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                message: format!("Unexpected listing format: {}", e),
            })
    }

    /// Downloads the raw body of one file
    pub async fn fetch_raw(&self, download_url: &str) -> Result<String, FetchError> {
        let response = self
            .authorize(self.client.get(download_url))
            .send()
            .await
            .map_err(|e| classify_transport(download_url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: download_url.to_string(),
                code: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport(download_url, &e))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }
}
