//! Error taxonomy for the query gateway.
//!
//! [`GatewayError`] covers every per-request outcome other than success. Its
//! `Display` text is the exact client-facing message; nothing upstream-specific
//! ever flows into it. Upstream failure detail lives in
//! [`crate::catalog::CatalogError`] and is logged, not returned.
//!
//! [`ConfigError`] covers conditions detected once at process start. They are
//! fatal and never surface per request.

use thiserror::Error;

use crate::types::ResourceType;

/// Why a search query was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryProblem {
    /// Absent, repeated, or empty after trimming.
    Missing,
    /// Longer than [`crate::types::MAX_QUERY_CHARS`] characters.
    TooLong,
}

/// The gateway operation a failure belongs to.
///
/// Only used to choose the client-facing upstream failure message and to label
/// log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Search,
    Character,
    Issue,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Character => "character",
            Self::Issue => "issue",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Per-request errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::QueryGateway`] operations.
///
/// Validation variants are produced before any upstream call. Callers cannot
/// distinguish a timeout from a bad status or a malformed payload: all of them
/// become [`GatewayError::UpstreamUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The search text is missing, blank, or too long.
    #[error("{}", query_message(.0))]
    InvalidQuery(QueryProblem),

    /// The resource type is outside the allowed set.
    #[error("Invalid type. Allowed: {}", ResourceType::allowed_list())]
    InvalidResourceType,

    /// The page is not a positive integer.
    #[error("page must be a positive integer")]
    InvalidPage,

    /// The detail identifier is not a positive integer.
    #[error("id must be a positive integer")]
    InvalidId,

    /// The catalog service could not be reached or returned an unusable reply.
    #[error("{}", upstream_message(.operation))]
    UpstreamUnavailable {
        /// Which operation failed.
        operation: Operation,
    },
}

fn query_message(problem: &QueryProblem) -> &'static str {
    match problem {
        QueryProblem::Missing => "query is required",
        QueryProblem::TooLong => "query is too long (max 200 chars)",
    }
}

fn upstream_message(operation: &Operation) -> &'static str {
    match operation {
        Operation::Search => "Failed to fetch from Comic Vine",
        Operation::Character => "Failed to fetch character",
        Operation::Issue => "Failed to fetch issue",
    }
}

impl GatewayError {
    /// Returns `true` for errors caused by client input.
    ///
    /// These are expected traffic and are not logged as failures.
    pub fn is_client_error(self) -> bool {
        !matches!(self, Self::UpstreamUnavailable { .. })
    }
}

// ---------------------------------------------------------------------------
// Startup errors
// ---------------------------------------------------------------------------

/// Configuration problems detected at process start.
///
/// The gateway never starts with an invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No catalog API key was provided, or it was empty.
    #[error("catalog API key is not set (COMIC_VINE_API_KEY)")]
    MissingApiKey,

    /// The allowed client origin is not a usable origin string.
    #[error("invalid allowed origin '{origin}': {reason}")]
    InvalidOrigin {
        /// The rejected value.
        origin: String,
        /// Why it was rejected.
        reason: String,
    },
}
