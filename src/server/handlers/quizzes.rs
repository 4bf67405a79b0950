//! Quiz generation, storage and sharing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::super::error::ApiError;
use super::super::AppState;
use super::{owned_document, required_text};
use crate::models::{AuthUser, DocumentStatus, Question, Quiz, QuizResult};
use crate::quiz::OPTIONS_PER_QUESTION;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    #[serde(default)]
    pub text: String,
    pub refinement_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuizResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuizRequest {
    pub refinement_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    pub text: Option<String>,
    /// Refine a stored document's text and save the result back.
    pub document_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub document_id: Option<String>,
}

/// Turn study text into a multiple-choice quiz.
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<Json<GenerateQuizResponse>, ApiError> {
    let questions = state
        .assistant
        .generate_quiz(&req.text, req.refinement_text.as_deref())
        .await?;
    Ok(Json(GenerateQuizResponse { questions }))
}

/// Generate and save a quiz from an uploaded document's text.
pub async fn generate_document_quiz(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<DocumentQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    let doc = owned_document(&state, &id, &user).await?;
    let text = match (&doc.status, doc.extracted_text.as_deref()) {
        (DocumentStatus::Extracted, Some(text)) if !text.trim().is_empty() => text,
        _ => {
            return Err(ApiError::BadRequest(
                "Document has no extracted text".to_string(),
            ))
        }
    };

    let questions = state
        .assistant
        .generate_quiz(text, req.refinement_text.as_deref())
        .await?;

    let quiz = Quiz::new(user.user_id, Some(doc.id), doc.title, questions);
    state.quiz_repo.save(&quiz).await?;
    info!("Saved quiz {} with {} questions", quiz.id, quiz.questions.len());

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Ask the AI to clean up OCR text.
pub async fn refine_text(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, ApiError> {
    let doc = match req.document_id.as_deref() {
        Some(id) => Some(owned_document(&state, id, &user).await?),
        None => None,
    };

    let source = match (req.text.as_deref(), doc.as_ref()) {
        (Some(text), _) if !text.trim().is_empty() => text,
        (_, Some(doc)) => doc.extracted_text.as_deref().unwrap_or_default(),
        _ => "",
    };
    let refined = state.assistant.refine_text(source).await?;

    if let Some(doc) = doc {
        state.doc_repo.update_text(&doc.id, &refined).await?;
        info!("Stored refined text for document {}", doc.id);
    }

    Ok(Json(RefineResponse { text: refined }))
}

/// Save a quiz the client already has (e.g. one it edited).
pub async fn save_quiz(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SaveQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    let title = required_text(req.title.as_deref(), "title")?;
    if req.questions.is_empty() {
        return Err(ApiError::BadRequest("questions is required".to_string()));
    }
    for (i, q) in req.questions.iter().enumerate() {
        validate_question(q).map_err(|msg| {
            ApiError::BadRequest(format!("Question {}: {}", i + 1, msg))
        })?;
    }
    if let Some(document_id) = req.document_id.as_deref() {
        owned_document(&state, document_id, &user).await?;
    }

    let quiz = Quiz::new(user.user_id, req.document_id, title.to_string(), req.questions);
    state.quiz_repo.save(&quiz).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

fn validate_question(q: &Question) -> Result<(), &'static str> {
    if q.question.trim().is_empty() {
        return Err("question text is empty");
    }
    if q.options.len() != OPTIONS_PER_QUESTION {
        return Err("must have exactly 4 options");
    }
    if !q.options.iter().any(|o| o == &q.correct_answer) {
        return Err("correctAnswer must be one of the options");
    }
    Ok(())
}

/// The caller's saved quizzes.
pub async fn list_quizzes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Quiz>>, ApiError> {
    Ok(Json(state.quiz_repo.list_for_owner(&user.user_id).await?))
}

/// Fetch a quiz by ID. Quizzes are shareable by link, so no auth.
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>, ApiError> {
    state
        .quiz_repo
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Quiz"))
}

/// Everyone's attempts at a quiz. Owner only.
pub async fn quiz_results(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<QuizResult>>, ApiError> {
    let quiz = state
        .quiz_repo
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Quiz"))?;
    if quiz.owner_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Only the quiz owner can see its results".to_string(),
        ));
    }
    Ok(Json(state.quiz_repo.list_results(&quiz.id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], answer: &str) -> Question {
        Question {
            question: "Which?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: answer.to_string(),
        }
    }

    #[test]
    fn test_validate_question() {
        assert!(validate_question(&question(&["a", "b", "c", "d"], "c")).is_ok());
        assert!(validate_question(&question(&["a", "b", "c"], "c")).is_err());
        assert!(validate_question(&question(&["a", "b", "c", "d"], "e")).is_err());
    }
}
