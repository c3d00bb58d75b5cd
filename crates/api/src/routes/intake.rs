//! Public intake endpoints backing the landing-page forms.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use vitae_core::store::{collections, fields_of, StoreError};
use vitae_core::submission::{RequestMeta, StoryIntake, WaitlistSubmission};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::json_object;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/waitlist", post(waitlist_submit))
        .route("/v1/story-intake", post(story_intake_submit))
}

/// POST /v1/waitlist: join the launch waitlist.
async fn waitlist_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_object(body)?;
    let submission = WaitlistSubmission::parse(&body)?;
    let record = submission.into_record(request_meta(&headers), Utc::now());
    let fields = fields_of(&record)?;

    let id = if state.config().waitlist_dedup {
        match state
            .store()
            .add_unique(collections::WAITLIST, "email", fields)
            .await
        {
            Ok(id) => id,
            Err(StoreError::Conflict { .. }) => {
                return Err(ApiError::Conflict("email already registered".to_string()));
            }
            Err(err) => return Err(err.into()),
        }
    } else {
        state.store().add(collections::WAITLIST, fields).await?
    };

    tracing::info!(%id, "waitlist submission stored");

    Ok(Json(json!({
        "success": true,
        "message": "Successfully joined the waitlist!",
        "id": id,
    })))
}

/// POST /v1/story-intake: ask to start a life-story project.
async fn story_intake_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_object(body)?;
    let intake = StoryIntake::parse(&body)?;
    let record = intake.into_record(request_meta(&headers), Utc::now());
    let fields = fields_of(&record)?;

    let id = state.store().add(collections::STORY_INTAKE, fields).await?;

    tracing::info!(%id, "story intake stored");

    Ok(Json(json!({
        "success": true,
        "message": "Thank you for starting your story journey! We'll contact you within 24 hours.",
        "id": id,
    })))
}

/// Envelope metadata stored alongside a submission. The deployment sits
/// behind a proxy, so the client address comes from `x-forwarded-for`.
fn request_meta(headers: &HeaderMap) -> RequestMeta {
    RequestMeta {
        user_agent: header_str(headers, "user-agent"),
        ip: header_str(headers, "x-forwarded-for"),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
