//! Port definition for the upstream catalog service.
//!
//! The gateway depends only on [`CatalogService`]; the HTTP adapter lives in
//! the `comicvine` crate and test doubles implement the trait directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::identifiers::ResourceKey;
use crate::types::{CatalogRecord, CatalogSearch, SearchPage};

/// Read-only access to the third-party catalog.
///
/// Implementations make exactly one upstream call per method invocation and
/// never retry. The API key and request timeout are the implementation's
/// concern.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Runs a text search with a resource-type filter and pagination.
    async fn search(&self, query: &CatalogSearch) -> Result<SearchPage, CatalogError>;

    /// Fetches one detail record by its namespaced key.
    async fn fetch(&self, key: &ResourceKey) -> Result<CatalogRecord, CatalogError>;
}

/// Why an upstream call failed.
///
/// Logged server-side only. Implementations must ensure none of the text held
/// here contains the API key or the full request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The call did not complete within the configured timeout.
    #[error("catalog request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("catalog transport failure: {0}")]
    Transport(String),

    /// The catalog answered with a non-success HTTP status.
    #[error("catalog returned HTTP {0}")]
    Status(u16),

    /// The catalog answered 2xx but reported an application-level error.
    #[error("catalog rejected the request (status_code {code}): {message}")]
    Rejected {
        /// Catalog-specific status code.
        code: i64,
        /// Catalog-supplied error text.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}
