pub mod claims;
pub mod health;
pub mod intake;
pub mod stories;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router};
use serde_json::{Map, Value};

use vitae_core::validate::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// Assemble the full router with all route groups. Method mismatches on
/// known paths answer 405 as JSON instead of axum's empty default, before
/// any body is read.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(intake::routes())
        .merge(stories::routes())
        .merge(claims::routes())
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Unwrap the JSON body extractor: any parse failure or non-object
/// payload is the same 400 to the caller.
pub(crate) fn json_object(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, ApiError> {
    let Json(value) = body.map_err(|_| ApiError::from(ValidationError::InvalidBody))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::InvalidBody.into()),
    }
}
