//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use shop::ShopError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The caller is not authenticated.
    Unauthorized(String),
    /// The caller lacks the required role.
    Forbidden(String),
    /// The request lost to a concurrent writer or an illegal transition.
    Conflict(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        match &err {
            ShopError::AuthenticationRequired => ApiError::Unauthorized(err.to_string()),
            ShopError::StaffRequired => ApiError::Forbidden(err.to_string()),
            ShopError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ShopError::Order(order_err) => match order_err {
                OrderError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
                OrderError::MissingTargetStatus | OrderError::UnknownStatus(_) => {
                    ApiError::BadRequest(err.to_string())
                }
            },
            ShopError::Store(store_err) => match store_err {
                StoreError::TransitionConflict { .. } => ApiError::Conflict(err.to_string()),
                StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
                _ => ApiError::Internal(err.to_string()),
            },
        }
    }
}
