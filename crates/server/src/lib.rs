//! Comic Universe inbound HTTP surface.
//!
//! Exposes the [`gateway::QueryGateway`] operations over HTTP and wraps them in
//! the middleware stack every response passes through.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Routing, extractor handling, status-code mapping, and
//! cross-cutting HTTP concerns live here. No gateway rules are added; handlers
//! forward raw client text to the gateway and map its result.
//!
//! ## Routes
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `GET /` | `200 {"status":"ok"}` | |
//! | `GET /api/search?query&type&page` | `200 {results,total,page,limit}` | `400`, `502` |
//! | `GET /api/characters/{id}` | `200 <record>` | `400`, `502` |
//! | `GET /api/issues/{id}` | `200 <record>` | `400`, `502` |
//!
//! Every error body is `{"error": "<message>"}`.
//!
//! ## Middleware order (outermost first)
//!
//! request tracing → panic catch → security headers → CORS → per-IP rate
//! limit → body limit → trailing-slash trim → router
//!
//! A trailing slash is ignored: `/api/characters/1234/` is `/api/characters/1234`.

use std::num::NonZeroU32;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};
use gateway::{GatewayConfig, QueryGateway};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

mod error;
mod middleware;
mod routes;

pub use error::ApiError;
pub use middleware::ClientRateLimiter;

/// Largest accepted request body. The API is read-only, so anything bigger is abuse.
pub const DEFAULT_BODY_LIMIT: usize = 1024;

/// Errors building the router. Startup-fatal.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The allowed origin cannot be sent as a header value.
    #[error("allowed origin '{0}' is not a valid header value")]
    InvalidOrigin(String),

    /// The rate-limit window is too short for the request budget.
    #[error("rate limit of {max_requests} requests per {window:?} is not representable")]
    InvalidRateLimit {
        max_requests: NonZeroU32,
        window: Duration,
    },
}

const DEFAULT_MAX_REQUESTS: NonZeroU32 = match NonZeroU32::new(100) {
    Some(n) => n,
    None => panic!("default request budget must be non-zero"),
};

/// Per-client request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window (also the burst size).
    pub max_requests: NonZeroU32,
    pub window: Duration,
}

impl Default for RateLimit {
    /// 100 requests per 15 minutes.
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Settings for the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The single browser origin allowed by CORS.
    pub allowed_origin: String,
    pub rate_limit: RateLimit,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl ServerConfig {
    /// Default HTTP settings for the given gateway configuration.
    pub fn from_gateway(config: &GatewayConfig) -> Self {
        Self {
            allowed_origin: config.allowed_origin().to_owned(),
            rate_limit: RateLimit::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) gateway: QueryGateway,
}

/// Builds the full application: routes plus middleware stack.
///
/// # Errors
///
/// [`ServerError`] if the origin or rate limit cannot be turned into a layer.
pub fn build_router(gateway: QueryGateway, config: &ServerConfig) -> Result<Router, ServerError> {
    let origin = HeaderValue::from_str(&config.allowed_origin)
        .map_err(|_| ServerError::InvalidOrigin(config.allowed_origin.clone()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::HEAD]);

    let limiter = ClientRateLimiter::new(config.rate_limit)?;

    let app_routes = Router::new()
        .route("/", get(routes::status))
        .route("/api/search", get(routes::search))
        .route("/api/characters/{id}", get(routes::character))
        .route("/api/issues/{id}", get(routes::issue))
        .fallback(routes::not_found)
        .with_state(AppState { gateway });

    // Router layers run after route matching, so the path is trimmed by a
    // service sitting in front of the routes instead.
    let router = Router::new()
        .fallback_service(NormalizePath::trim_trailing_slash(app_routes))
        .layer(RequestBodyLimitLayer::new(config.body_limit))
        .layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit,
        ))
        .layer(cors);

    let router = security_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(name, value))
        });

    Ok(router
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        ))
}

/// Response headers applied to every response unless a handler set them.
fn security_headers() -> [(HeaderName, HeaderValue); 6] {
    [
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'"),
        ),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
    ]
}
