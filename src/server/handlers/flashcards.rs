//! Flashcard generation.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::super::error::ApiError;
use super::super::AppState;
use super::owned_document;
use crate::models::{AuthUser, Flashcard, FlashcardSet};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFlashcardsRequest {
    pub text: Option<String>,
    pub count: Option<usize>,
    /// Use this document's text when `text` is absent, and save the set
    /// against it.
    pub document_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateFlashcardsResponse {
    pub flashcards: Vec<Flashcard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_id: Option<String>,
}

pub async fn generate_flashcards(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<GenerateFlashcardsRequest>,
) -> Result<Json<GenerateFlashcardsResponse>, ApiError> {
    let doc = match req.document_id.as_deref() {
        Some(id) => Some(owned_document(&state, id, &user).await?),
        None => None,
    };

    let text = match (req.text.as_deref(), doc.as_ref()) {
        (Some(text), _) if !text.trim().is_empty() => text,
        (_, Some(doc)) => doc.extracted_text.as_deref().unwrap_or_default(),
        _ => "",
    };
    let flashcards = state.assistant.generate_flashcards(text, req.count).await?;

    let set_id = match doc {
        Some(doc) => {
            let set = FlashcardSet::new(user.user_id, Some(doc.id), flashcards.clone());
            state.flashcard_repo.save(&set).await?;
            Some(set.id)
        }
        None => None,
    };

    Ok(Json(GenerateFlashcardsResponse { flashcards, set_id }))
}

/// Saved flashcard sets for a document.
pub async fn list_flashcard_sets(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<FlashcardSet>>, ApiError> {
    let doc = owned_document(&state, &id, &user).await?;
    Ok(Json(
        state
            .flashcard_repo
            .list_for_document(&doc.id, &user.user_id)
            .await?,
    ))
}
