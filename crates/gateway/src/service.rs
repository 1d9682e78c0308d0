//! The query gateway: validate, translate, call, map.
//!
//! Each operation is a single linear pipeline with early validation exits.
//! No state is kept between calls; two identical requests produce two
//! upstream calls.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::catalog::{CatalogError, CatalogService};
use crate::errors::{GatewayError, Operation};
use crate::identifiers::{ResourceId, ResourceKey, ResourceKind, PAGE_SIZE};
use crate::types::{CatalogRecord, SearchParams, SearchRequest, SearchResponse};

/// Stateless request transformer in front of a [`CatalogService`].
///
/// Cloning is cheap; clones share the same catalog client.
#[derive(Clone)]
pub struct QueryGateway {
    catalog: Arc<dyn CatalogService>,
}

impl QueryGateway {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Searches the catalog.
    ///
    /// # Errors
    ///
    /// Validation errors for bad `query`, `type` or `page` (no upstream call is
    /// made), or [`GatewayError::UpstreamUnavailable`].
    #[instrument(skip_all, name = "gateway.search")]
    pub async fn search(&self, params: SearchParams) -> Result<SearchResponse, GatewayError> {
        let request = SearchRequest::from_params(params).inspect_err(log_rejection)?;
        let upstream = request.to_catalog_search();
        debug!(
            resources = %upstream.resources,
            offset = upstream.offset,
            "searching catalog"
        );

        let page = self
            .catalog
            .search(&upstream)
            .await
            .map_err(|e| upstream_failure(Operation::Search, e))?;

        let total = page.total.unwrap_or_else(|| {
            warn!("catalog search response has no total count; reporting 0");
            0
        });

        Ok(SearchResponse {
            results: page.results,
            total,
            page: request.page.get(),
            limit: PAGE_SIZE,
        })
    }

    /// Looks up one character by identifier.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidId`] or [`GatewayError::UpstreamUnavailable`].
    pub async fn character(&self, raw_id: &str) -> Result<CatalogRecord, GatewayError> {
        self.detail(ResourceKind::Character, raw_id).await
    }

    /// Looks up one issue by identifier.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidId`] or [`GatewayError::UpstreamUnavailable`].
    pub async fn issue(&self, raw_id: &str) -> Result<CatalogRecord, GatewayError> {
        self.detail(ResourceKind::Issue, raw_id).await
    }

    #[instrument(skip(self), name = "gateway.detail")]
    async fn detail(&self, kind: ResourceKind, raw_id: &str) -> Result<CatalogRecord, GatewayError> {
        let id = ResourceId::parse(raw_id)
            .ok_or(GatewayError::InvalidId)
            .inspect_err(log_rejection)?;
        let key = ResourceKey::new(kind, id);
        debug!(%key, "fetching catalog record");

        self.catalog
            .fetch(&key)
            .await
            .map_err(|e| upstream_failure(operation_for(kind), e))
    }
}

fn operation_for(kind: ResourceKind) -> Operation {
    match kind {
        ResourceKind::Character => Operation::Character,
        ResourceKind::Issue => Operation::Issue,
    }
}

fn log_rejection(err: &GatewayError) {
    debug!(reason = %err, "request rejected");
}

fn upstream_failure(operation: Operation, cause: CatalogError) -> GatewayError {
    error!(%operation, error = %cause, "catalog call failed");
    GatewayError::UpstreamUnavailable { operation }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
