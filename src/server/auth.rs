//! Bearer token authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::error::ApiError;
use super::AppState;
use crate::models::AuthUser;

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            warn!("Missing or invalid Authorization header");
            return Err(ApiError::Unauthorized("Missing credentials"));
        };

        match state.token_repo.resolve(token).await? {
            Some(user) => Ok(user),
            None => {
                warn!("Rejected unknown bearer token");
                Err(ApiError::Unauthorized("Invalid token"))
            }
        }
    }
}
