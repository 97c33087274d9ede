use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response;

/// Generic message returned for failures that have no safe user-facing text.
pub const GENERIC_ERROR_MESSAGE: &str = "Error al procesar la solicitud";

/// Closed set of domain errors. Handlers are the only place these are turned
/// into HTTP responses; everything below them stays protocol-agnostic.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// No row exists for the requested id.
    #[error("{0}")]
    NotFound(String),

    /// Missing or malformed credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Over quota for the current window. The message carries the reset time.
    #[error("{0}")]
    RateLimited(String),

    /// Any persistence failure. The message is a wrapped, safe description;
    /// the raw driver error only ever reaches the log.
    #[error("{0}")]
    Database(String),

    /// Unclassified failure. Rendered as a generic message, never leaked.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) => response::bad_request(&msg),
            AppError::NotFound(msg) => response::not_found(&msg),
            AppError::Unauthorized(msg) => response::unauthorized(&msg),
            AppError::Forbidden(msg) => response::forbidden(&msg),
            AppError::RateLimited(msg) => response::too_many_requests(&msg),
            AppError::Database(msg) => response::server_error(&msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "unclassified failure");
                response::server_error(GENERIC_ERROR_MESSAGE)
            }
        }
    }
}
