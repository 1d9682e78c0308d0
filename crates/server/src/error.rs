//! Mapping of gateway outcomes onto HTTP responses.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway::GatewayError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// The body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

/// Builds a `{"error": message}` response with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// A [`GatewayError`] on its way to the client.
///
/// Validation errors become `400`, upstream failures `502`. The body is the
/// error's client-facing message and nothing else.
#[derive(Debug)]
pub struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.0.to_string())
    }
}

/// Converts a handler panic into a generic `500`. The payload is logged only.
pub(crate) fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    error!(panic = %detail, "request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

#[cfg(test)]
mod tests {
    use gateway::{Operation, QueryProblem};

    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        for err in [
            GatewayError::InvalidQuery(QueryProblem::Missing),
            GatewayError::InvalidResourceType,
            GatewayError::InvalidPage,
            GatewayError::InvalidId,
        ] {
            assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn upstream_errors_are_bad_gateway() {
        let err = ApiError::from(GatewayError::UpstreamUnavailable {
            operation: Operation::Issue,
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn panic_response_hides_the_payload() {
        let response = panic_response(Box::new("secret internals"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
