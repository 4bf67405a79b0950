//! HTTP request handlers.

mod documents;
mod flashcards;
mod health;
mod highlights;
mod invites;
mod quizzes;
mod results;

pub use documents::{delete_document, get_document, list_documents, upload_document};
pub use flashcards::{generate_flashcards, list_flashcard_sets};
pub use health::health;
pub use highlights::{
    create_highlight, delete_highlight, grouped_highlights, list_highlights, update_highlight,
};
pub use invites::{create_invite, mark_invite_used, validate_invite};
pub use quizzes::{
    generate_document_quiz, generate_quiz, get_quiz, list_quizzes, quiz_results, refine_text,
    save_quiz,
};
pub use results::{my_results, save_shared_quiz_result};

use super::error::ApiError;
use super::AppState;
use crate::models::{AuthUser, Document};

/// Load a document the caller owns.
async fn owned_document(
    state: &AppState,
    id: &str,
    user: &AuthUser,
) -> Result<Document, ApiError> {
    let doc = state
        .doc_repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Document"))?;

    if doc.owner_id != user.user_id {
        return Err(ApiError::Forbidden(
            "You do not have access to this document".to_string(),
        ));
    }
    Ok(doc)
}

/// Trimmed, non-empty text from an optional request field.
fn required_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}
