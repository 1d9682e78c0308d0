//! Query gateway domain for Comic Universe.
//!
//! This crate contains the request/response types, validation rules,
//! pagination arithmetic, error taxonomy, configuration struct, and the
//! [`CatalogService`] port used to reach the upstream catalog. Infrastructure
//! crates implement the port; they never add gateway rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; `comicvine` defines *how* to reach the catalog
//! and `server` defines how clients reach the gateway.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Positive-integer newtypes (`PageNumber`, `ResourceId`) and catalog keys |
//! | [`types`] | Search parameters, validated requests, upstream and client payloads |
//! | [`errors`] | Per-request and startup error types |
//! | [`config`] | Process-wide configuration and the API key wrapper |
//! | [`catalog`] | The `CatalogService` port and its error type |
//! | [`service`] | `QueryGateway`, the validate → translate → call → map pipeline |

pub mod catalog;
pub mod config;
pub mod errors;
pub mod identifiers;
pub mod service;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use catalog::{CatalogError, CatalogService};
pub use config::{ApiKey, GatewayConfig, DEFAULT_ALLOWED_ORIGIN};
pub use errors::{ConfigError, GatewayError, Operation, QueryProblem};
pub use identifiers::{PageNumber, ResourceId, ResourceKey, ResourceKind, PAGE_SIZE};
pub use service::QueryGateway;
pub use types::{
    CatalogRecord, CatalogSearch, Param, ResourceType, SearchPage, SearchParams, SearchQuery,
    SearchRequest, SearchResponse, MAX_QUERY_CHARS,
};
