//! Route handlers. Each one hands raw client text to the gateway.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use gateway::{GatewayError, SearchParams, SearchResponse};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{error_response, ApiError};
use crate::AppState;

/// Liveness probe.
pub(crate) async fn status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/search`
///
/// Parameters are collected as raw pairs so that repeated keys reach the
/// gateway's validation instead of being silently merged. An undecodable
/// query string is treated as carrying no parameters.
pub(crate) async fn search(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_else(|rejection| {
        debug!(%rejection, "unparseable search query string");
        Vec::new()
    });
    let response = state.gateway.search(SearchParams::from_pairs(pairs)).await?;
    Ok(Json(response))
}

/// `GET /api/characters/{id}`
pub(crate) async fn character(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| GatewayError::InvalidId)?;
    let record = state.gateway.character(&id).await?;
    Ok(Json(record.into_inner()))
}

/// `GET /api/issues/{id}`
pub(crate) async fn issue(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| GatewayError::InvalidId)?;
    let record = state.gateway.issue(&id).await?;
    Ok(Json(record.into_inner()))
}

pub(crate) async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
