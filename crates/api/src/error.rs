//! API error types with HTTP response mapping.
//!
//! Domain failures never surface as 5xx: authorization failures answer 403,
//! login failures 401, and everything else 400 with the endpoint's message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, ErrorKind};
use serde::Serialize;

pub const INVALID_REQUEST: &str = "Неверный запрос";
pub const ACCESS_DENIED: &str = "Доступ запрещен";
pub const INVALID_CREDENTIALS: &str = "Неверные учетные данные";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be decoded; the detail is only logged.
    BadRequest(String),
    /// A domain operation failed; `message` is the endpoint's client-facing text.
    Domain {
        source: DomainError,
        message: &'static str,
    },
    /// Login failed.
    Unauthorized(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(detail) => {
                tracing::debug!(%detail, "rejected malformed request");
                (StatusCode::BAD_REQUEST, INVALID_REQUEST)
            }
            ApiError::Domain { source, message } => {
                tracing::warn!(error = %source, "domain operation failed");
                match source.kind() {
                    ErrorKind::Authorization => (StatusCode::FORBIDDEN, ACCESS_DENIED),
                    _ => (StatusCode::BAD_REQUEST, message),
                }
            }
            ApiError::Unauthorized(source) => {
                tracing::warn!(error = %source, "login failed");
                (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS)
            }
        };

        let body = ErrorResponse {
            message: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Attaches an endpoint's client-facing message to a domain result.
pub trait RespondWith<T> {
    fn respond_with(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> RespondWith<T> for Result<T, DomainError> {
    fn respond_with(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::Domain { source, message })
    }
}
