//! Invite code endpoints.
//!
//! Validation and marking are unauthenticated: they are called during
//! signup, before the new user has a token.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::super::error::ApiError;
use super::super::AppState;
use super::required_text;
use crate::models::{AuthUser, MarkUsed};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteRequest {
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteResponse {
    pub invite_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeRequest {
    pub invite_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateInviteResponse {
    pub restaurant_id: String,
}

/// Create an invite for the caller's restaurant.
pub async fn create_invite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateInviteRequest>,
) -> Result<Json<CreateInviteResponse>, ApiError> {
    let restaurant_id = required_text(req.restaurant_id.as_deref(), "restaurantId")?;

    if !user.can_invite_to(restaurant_id) {
        return Err(ApiError::Forbidden(
            "You cannot create invites for this restaurant".to_string(),
        ));
    }

    let invite = state
        .invite_repo
        .create(restaurant_id, &user.user_id)
        .await?;
    info!("User {} created invite for {}", user.user_id, restaurant_id);

    Ok(Json(CreateInviteResponse {
        invite_code: invite.code,
    }))
}

/// Check an invite and return the restaurant it belongs to.
pub async fn validate_invite(
    State(state): State<AppState>,
    Json(req): Json<InviteCodeRequest>,
) -> Result<Json<ValidateInviteResponse>, ApiError> {
    let code = required_text(req.invite_code.as_deref(), "inviteCode")?;

    let invite = state
        .invite_repo
        .get(code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid invite code".to_string()))?;

    if invite.used {
        return Err(ApiError::BadRequest(
            "Invite code has already been used".to_string(),
        ));
    }

    Ok(Json(ValidateInviteResponse {
        restaurant_id: invite.restaurant_id,
    }))
}

/// Mark an invite as used. Repeating the call is harmless.
///
/// Responses are plain text.
pub async fn mark_invite_used(
    State(state): State<AppState>,
    Json(req): Json<InviteCodeRequest>,
) -> impl IntoResponse {
    let Some(code) = req
        .invite_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    else {
        return (StatusCode::BAD_REQUEST, "inviteCode is required");
    };

    match state.invite_repo.mark_used(code).await {
        Ok(MarkUsed::Marked) => {
            info!("Invite {} marked as used", code);
            (StatusCode::OK, "Invite code marked as used")
        }
        Ok(MarkUsed::AlreadyUsed) => (StatusCode::OK, "Invite code was already used"),
        Ok(MarkUsed::NotFound) => (StatusCode::NOT_FOUND, "Invite code not found"),
        Err(e) => {
            error!("Failed to mark invite {} used: {}", code, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
