//! Bearer-token admin check for the story-management routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::{Authorization, Bearer};
use axum_extra::headers::HeaderMapExt;

use vitae_core::identity::IdentityError;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified identity of an admin caller, available to handlers as an
/// extractor argument. Extraction fails with 401 before the handler body
/// runs, so no validation or store access happens for rejected callers.
/// Missing header, bad token, and missing claim are indistinguishable by
/// status.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub uid: String,
    pub email: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(ApiError::Unauthorized("missing bearer token"))?;

        let token = bearer.token();
        if token.trim().is_empty() {
            return Err(ApiError::Unauthorized("missing bearer token"));
        }

        let identity = state.identity().verify(token).await.map_err(|err| {
            if !matches!(err, IdentityError::InvalidToken) {
                tracing::error!("identity verification failed: {err}");
            }
            ApiError::Unauthorized("invalid token")
        })?;

        if !identity.admin {
            return Err(ApiError::Unauthorized("admin access required"));
        }

        Ok(AdminUser {
            uid: identity.uid,
            email: identity.email,
        })
    }
}
