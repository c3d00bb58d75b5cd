use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use vitae_core::identity::IdentityError;
use vitae_core::store::StoreError;
use vitae_core::validate::ValidationError;

/// API error type mapped onto the JSON error shape the front end expects.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "methodNotAllowed",
                "Method not allowed".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", (*msg).to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Store(err) => match err {
                StoreError::NotFound { collection, id } => (
                    StatusCode::NOT_FOUND,
                    "notFound",
                    format!("{id} not found in {collection}"),
                ),
                StoreError::Conflict { field, .. } => (
                    StatusCode::CONFLICT,
                    "conflict",
                    format!("duplicate value for {field}"),
                ),
                err => {
                    tracing::error!("Store error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internalError",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        if status.is_client_error() {
            tracing::debug!(status = status.as_u16(), "request rejected: {message}");
        }

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken => ApiError::Unauthorized("invalid token"),
            IdentityError::UnknownUser(who) => ApiError::NotFound(format!("no account for {who}")),
            IdentityError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
