//! Request and response value types for the query gateway.
//!
//! Inbound types ([`SearchParams`]) carry raw client text; validated types
//! ([`SearchRequest`]) carry invariants that hold by construction. Upstream
//! payloads ([`CatalogRecord`], search results) are opaque JSON and are never
//! inspected beyond the fields named here.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{GatewayError, QueryProblem};
use crate::identifiers::{PageNumber, PAGE_SIZE};

/// Maximum accepted length of the raw search text, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Resource types
// ---------------------------------------------------------------------------

/// The closed set of entity categories a search may be filtered to.
///
/// Passed through to the catalog as-is under its wire name. Anything outside
/// this set is rejected before any upstream call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Comic characters. The default when no type is given.
    #[default]
    Character,
    /// Individual comic issues.
    Issue,
    /// Volumes (series runs).
    Volume,
    /// Story arcs spanning several issues.
    StoryArc,
}

impl ResourceType {
    /// Every accepted resource type, in the order they are listed to clients.
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Character,
        ResourceType::Issue,
        ResourceType::Volume,
        ResourceType::StoryArc,
    ];

    /// Returns the wire name used both inbound and upstream.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Issue => "issue",
            Self::Volume => "volume",
            Self::StoryArc => "story_arc",
        }
    }

    /// Comma-separated list of every wire name, for client-facing messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ResourceType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(GatewayError::InvalidResourceType)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Inbound parameters
// ---------------------------------------------------------------------------

/// One raw query-string parameter as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Param {
    /// The parameter was not sent.
    #[default]
    Absent,
    /// The parameter was sent exactly once.
    Single(String),
    /// The parameter was sent more than once. Never collapsed to one value.
    Repeated,
}

impl Param {
    fn push(&mut self, value: String) {
        *self = match self {
            Self::Absent => Self::Single(value),
            Self::Single(_) | Self::Repeated => Self::Repeated,
        };
    }
}

/// Raw search parameters exactly as they arrived on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Free-text search (`query`).
    pub query: Param,
    /// Resource-type selector (`type`).
    pub resource_type: Param,
    /// One-based page number (`page`).
    pub page: Param,
}

impl SearchParams {
    /// Collects decoded `(key, value)` pairs. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "query" => &mut params.query,
                "type" => &mut params.resource_type,
                "page" => &mut params.page,
                _ => continue,
            };
            slot.push(value.into());
        }
        params
    }
}

/// Search text that is non-empty after trimming. Holds the trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct SearchQuery(String);

impl TryFrom<String> for SearchQuery {
    type Error = GatewayError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl SearchQuery {
    /// Validates raw client text.
    ///
    /// The length limit applies to the text as sent; emptiness is judged after
    /// trimming.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::InvalidQuery(QueryProblem::Missing));
        }
        if raw.chars().count() > MAX_QUERY_CHARS {
            return Err(GatewayError::InvalidQuery(QueryProblem::TooLong));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the trimmed search text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fully validated search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: SearchQuery,
    pub resource_type: ResourceType,
    pub page: PageNumber,
}

impl SearchRequest {
    /// Validates raw parameters: query first, then type, then page.
    ///
    /// Absent `type` defaults to [`ResourceType::Character`] and absent `page`
    /// to the first page. A present-but-empty value is not absent.
    pub fn from_params(params: SearchParams) -> Result<Self, GatewayError> {
        let query = match &params.query {
            Param::Single(raw) => SearchQuery::parse(raw)?,
            Param::Absent | Param::Repeated => {
                return Err(GatewayError::InvalidQuery(QueryProblem::Missing))
            }
        };

        let resource_type = match &params.resource_type {
            Param::Absent => ResourceType::default(),
            Param::Single(raw) => raw.parse()?,
            Param::Repeated => return Err(GatewayError::InvalidResourceType),
        };

        let page = match &params.page {
            Param::Absent => PageNumber::default(),
            Param::Single(raw) => PageNumber::parse(raw).ok_or(GatewayError::InvalidPage)?,
            Param::Repeated => return Err(GatewayError::InvalidPage),
        };

        Ok(Self {
            query,
            resource_type,
            page,
        })
    }

    /// Translates this request into the upstream query.
    pub fn to_catalog_search(&self) -> CatalogSearch {
        CatalogSearch {
            query: self.query.as_str().to_owned(),
            resources: self.resource_type,
            limit: PAGE_SIZE,
            offset: self.page.offset(),
        }
    }
}

// ---------------------------------------------------------------------------
// Upstream query and results
// ---------------------------------------------------------------------------

/// A search as sent to the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSearch {
    /// Trimmed search text.
    pub query: String,
    /// Resource-type filter, passed through untranslated.
    pub resources: ResourceType,
    /// Page size; always [`PAGE_SIZE`].
    pub limit: u32,
    /// Zero-based offset of the first result.
    pub offset: u64,
}

/// One page of search results as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    /// Result items, passed through without inspection.
    pub results: Vec<Value>,
    /// Total number of matches across all pages, if the catalog reported it.
    pub total: Option<u64>,
}

/// A single catalog detail record, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRecord(Value);

impl CatalogRecord {
    /// Wraps an upstream JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the record, returning the wrapped JSON value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Client-facing response
// ---------------------------------------------------------------------------

/// The body returned to clients for a successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Value>,
    pub total: u64,
    /// The requested page, echoed back.
    pub page: u32,
    /// Always [`PAGE_SIZE`].
    pub limit: u32,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
