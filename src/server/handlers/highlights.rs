//! Highlight and note endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::super::error::ApiError;
use super::super::AppState;
use super::{owned_document, required_text};
use crate::models::{group_by_page, AuthUser, Highlight, HighlightGroup};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHighlightRequest {
    pub document_id: Option<String>,
    pub text: Option<String>,
    pub page: Option<i32>,
    pub note: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightsQuery {
    pub document_id: Option<String>,
    pub page: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHighlightRequest {
    /// New note; null or empty clears it.
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupedHighlightsResponse {
    pub pages: Vec<HighlightGroup>,
}

pub async fn create_highlight(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateHighlightRequest>,
) -> Result<(StatusCode, Json<Highlight>), ApiError> {
    let document_id = required_text(req.document_id.as_deref(), "documentId")?;
    let text = required_text(req.text.as_deref(), "text")?;
    let doc = owned_document(&state, document_id, &user).await?;

    let highlight = Highlight::new(
        doc.id,
        user.user_id,
        req.page,
        text.to_string(),
        req.note,
        req.color,
    );
    state.highlight_repo.create(&highlight).await?;

    Ok((StatusCode::CREATED, Json(highlight)))
}

/// The caller's highlights on a document, optionally for one page.
pub async fn list_highlights(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HighlightsQuery>,
) -> Result<Json<Vec<Highlight>>, ApiError> {
    let document_id = required_text(params.document_id.as_deref(), "documentId")?;
    let doc = owned_document(&state, document_id, &user).await?;
    let highlights = state
        .highlight_repo
        .list(&doc.id, &user.user_id, params.page)
        .await?;
    Ok(Json(highlights))
}

pub async fn grouped_highlights(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HighlightsQuery>,
) -> Result<Json<GroupedHighlightsResponse>, ApiError> {
    let document_id = required_text(params.document_id.as_deref(), "documentId")?;
    let doc = owned_document(&state, document_id, &user).await?;
    let highlights = state
        .highlight_repo
        .list(&doc.id, &user.user_id, None)
        .await?;
    Ok(Json(GroupedHighlightsResponse {
        pages: group_by_page(highlights),
    }))
}

/// Load a highlight the caller owns.
async fn owned_highlight(
    state: &AppState,
    id: &str,
    user: &AuthUser,
) -> Result<Highlight, ApiError> {
    let highlight = state
        .highlight_repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Highlight"))?;
    if highlight.owner_id != user.user_id {
        return Err(ApiError::Forbidden(
            "You do not have access to this highlight".to_string(),
        ));
    }
    Ok(highlight)
}

pub async fn update_highlight(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateHighlightRequest>,
) -> Result<Json<Highlight>, ApiError> {
    owned_highlight(&state, &id, &user).await?;
    let updated = state
        .highlight_repo
        .update_note(&id, req.note.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("Highlight"))?;
    Ok(Json(updated))
}

pub async fn delete_highlight(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    owned_highlight(&state, &id, &user).await?;
    state.highlight_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
