//! Admin-only management of curated customer stories.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use vitae_core::store::{collections, fields_of, DocumentQuery, StoreError};
use vitae_core::story::{NewStory, StoryAnswers};

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::json_object;

/// Listing cap for the admin panel.
const STORY_LIST_LIMIT: i64 = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/stories", post(create_story).get(list_stories))
        .route("/v1/admin/stories/answers", post(update_story_answers))
}

/// POST /v1/admin/stories: create a story shell for an interview.
async fn create_story(
    State(state): State<AppState>,
    admin: AdminUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_object(body)?;
    let story = NewStory::parse(&body)?.into_story(&admin.email, &admin.uid, Utc::now());
    let fields = fields_of(&story)?;

    let story_id = state
        .store()
        .add(collections::CUSTOMER_STORIES, fields)
        .await?;

    tracing::info!(%story_id, created_by = %admin.email, "customer story created");

    Ok(Json(json!({
        "success": true,
        "message": "Customer story created",
        "storyId": story_id,
    })))
}

/// POST /v1/admin/stories/answers: record interview answers and mark the
/// story completed.
async fn update_story_answers(
    State(state): State<AppState>,
    admin: AdminUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let body = json_object(body)?;
    let update = StoryAnswers::parse(&body)?;
    let story_id = update.story_id.clone();

    if state
        .store()
        .get(collections::CUSTOMER_STORIES, &story_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!("story {story_id} not found")));
    }

    let completion = update.into_changes(&admin.email, &admin.uid, Utc::now());
    let changes = fields_of(&completion)?;

    match state
        .store()
        .update(collections::CUSTOMER_STORIES, &story_id, changes)
        .await
    {
        Ok(()) => {}
        Err(StoreError::NotFound { .. }) => {
            return Err(ApiError::NotFound(format!("story {story_id} not found")));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(%story_id, updated_by = %admin.email, "story answers recorded");

    Ok(Json(json!({
        "success": true,
        "message": "Story answers updated",
    })))
}

/// GET /v1/admin/stories: newest stories for the admin panel.
async fn list_stories(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Value>> {
    let docs = state
        .store()
        .query(
            collections::CUSTOMER_STORIES,
            DocumentQuery::new()
                .order_desc("createdAt")
                .limit(STORY_LIST_LIMIT),
        )
        .await?;

    let stories: Vec<Value> = docs.into_iter().map(|doc| doc.into_value()).collect();

    Ok(Json(json!({
        "success": true,
        "stories": stories,
    })))
}
