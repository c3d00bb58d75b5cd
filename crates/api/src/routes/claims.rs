//! Admin-claim grants, gated by the deployment's shared secret.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use vitae_core::validate::{required_str, validate_email};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::json_object;

const REQUIRED: &str = "email, secretKey";

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/claims", post(set_admin_claim))
}

/// POST /v1/admin/claims: grant the `admin` claim to an account.
///
/// Authorization here is the shared secret, not a bearer token: this is
/// the bootstrap path that mints the first admin. The claim lands in the
/// user directory and is embedded in tokens at the next sign-in.
async fn set_admin_claim(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_object(body)?;
    let email = required_str(&body, "email", REQUIRED)?;
    let secret_key = required_str(&body, "secretKey", REQUIRED)?;
    validate_email(&email)?;

    if secret_key != state.config().admin_secret {
        return Err(ApiError::Unauthorized("invalid admin secret"));
    }

    let uid = state.identity().uid_for_email(&email).await?;
    state.identity().grant_admin(&uid).await?;

    tracing::info!(%uid, "admin claim granted");

    Ok(Json(json!({
        "success": true,
        "message": "Admin claim set. The user must sign in again for it to take effect.",
        "uid": uid,
    })))
}
