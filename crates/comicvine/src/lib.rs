//! Comic Vine catalog adapter.
//!
//! Implements the [`gateway::CatalogService`] trait over the Comic Vine HTTP
//! API. Other catalog providers would be added as new `impl` blocks in their
//! own crates without any changes to the `gateway` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL layout, API-key attachment, client identity,
//! timeouts, and classification of upstream failures live here. The
//! [`gateway`] crate sees only [`gateway::CatalogService`] and
//! [`gateway::CatalogError`].
//!
//! ## Upstream contract
//!
//! | Operation | Request |
//! |-----------|---------|
//! | search | `GET {base}/search/?api_key&format=json&query&resources&limit&offset` |
//! | detail | `GET {base}/{kind}/{prefix}-{id}/?api_key&format=json` |
//!
//! Every call is made once, with no retry, and carries the fixed
//! `User-Agent` [`USER_AGENT`].

use std::time::Duration;

use async_trait::async_trait;
use gateway::{
    ApiKey, CatalogError, CatalogRecord, CatalogSearch, CatalogService, ResourceKey, SearchPage,
};
use thiserror::Error;
use tracing::{debug, instrument};

mod wire;

use wire::Envelope;

/// Production Comic Vine API root.
pub const DEFAULT_BASE_URL: &str = "https://comicvine.gamespot.com/api";

/// Client identity sent to the catalog on every call.
pub const USER_AGENT: &str = "ComicUniverseSearchEngine";

/// Upper bound on one upstream call, from connect to last body byte.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport settings for [`ComicVineClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// API root, without a trailing slash (one is tolerated).
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: REQUEST_TIMEOUT,
            user_agent: USER_AGENT.to_owned(),
        }
    }
}

/// Errors constructing a [`ComicVineClient`]. Startup-fatal.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The base URL is not an absolute `http`/`https` URL.
    #[error("invalid catalog base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be created (e.g. TLS backend).
    #[error("failed to build HTTP client")]
    Http(#[source] reqwest::Error),
}

/// [`CatalogService`] backed by the Comic Vine HTTP API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ComicVineClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl ComicVineClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// [`ClientBuildError`] if the base URL is unusable or the HTTP client
    /// cannot be initialised.
    pub fn new(api_key: ApiKey, options: ClientOptions) -> Result<Self, ClientBuildError> {
        let base_url = options.base_url.trim_end_matches('/').to_owned();
        match reqwest::Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ClientBuildError::InvalidBaseUrl(options.base_url)),
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(ClientBuildError::Http)?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Sends a GET with the API key and JSON format attached, and decodes the
    /// response envelope.
    async fn get(
        &self,
        url: String,
        extra: &[(&str, &str)],
        numeric: &[(&str, u64)],
    ) -> Result<Envelope, CatalogError> {
        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.expose()), ("format", "json")])
            .query(extra)
            .query(numeric)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        debug!(status = status.as_u16(), "catalog responded");
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let envelope: Envelope = response.json().await.map_err(classify)?;
        envelope.check_status()?;
        Ok(envelope)
    }
}

#[async_trait]
impl CatalogService for ComicVineClient {
    #[instrument(
        skip_all,
        name = "comicvine.search",
        fields(resources = %query.resources, offset = query.offset)
    )]
    async fn search(&self, query: &CatalogSearch) -> Result<SearchPage, CatalogError> {
        let envelope = self
            .get(
                self.endpoint("search/"),
                &[
                    ("query", query.query.as_str()),
                    ("resources", query.resources.as_str()),
                ],
                &[("limit", u64::from(query.limit)), ("offset", query.offset)],
            )
            .await?;
        envelope.into_search_page()
    }

    #[instrument(skip_all, name = "comicvine.fetch", fields(key = %key))]
    async fn fetch(&self, key: &ResourceKey) -> Result<CatalogRecord, CatalogError> {
        let envelope = self
            .get(self.endpoint(&format!("{}/{key}/", key.kind)), &[], &[])
            .await?;
        envelope.into_record()
    }
}

/// Maps a transport-level failure onto the port's error type.
///
/// The request URL carries the API key in its query string, so it is stripped
/// before any text is captured.
fn classify(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        return CatalogError::Timeout;
    }
    let decode = err.is_decode();
    let detail = describe(&err.without_url());
    if decode {
        CatalogError::Malformed(detail)
    } else {
        CatalogError::Transport(detail)
    }
}

/// Renders an error and its source chain on one line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
