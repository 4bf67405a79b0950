//! Quiz attempts and scoring.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::super::error::ApiError;
use super::super::AppState;
use super::required_text;
use crate::models::{AuthUser, QuizResult};
use crate::quiz::score_answers;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultRequest {
    pub quiz_id: Option<String>,
    /// One entry per question; null for unanswered.
    #[serde(default)]
    pub answers: Vec<Option<String>>,
    pub participant_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResultResponse {
    pub id: String,
    pub score: u32,
    pub total: u32,
}

/// Record an attempt at a quiz. The score is computed here, not trusted
/// from the client.
pub async fn save_shared_quiz_result(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SaveResultRequest>,
) -> Result<(StatusCode, Json<SaveResultResponse>), ApiError> {
    let quiz_id = required_text(req.quiz_id.as_deref(), "quizId")?;
    let quiz = state
        .quiz_repo
        .get(quiz_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Quiz"))?;

    if req.answers.len() > quiz.questions.len() {
        return Err(ApiError::BadRequest(format!(
            "Quiz has {} questions but {} answers were given",
            quiz.questions.len(),
            req.answers.len()
        )));
    }

    let (score, total) = score_answers(&quiz.questions, &req.answers);
    let result = QuizResult {
        id: uuid::Uuid::new_v4().to_string(),
        quiz_id: quiz.id.clone(),
        shared: quiz.owner_id != user.user_id,
        user_id: Some(user.user_id),
        participant_name: req
            .participant_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        answers: req.answers,
        score,
        total,
        created_at: Utc::now(),
    };
    state.quiz_repo.save_result(&result).await?;
    info!("Saved result {}/{} for quiz {}", score, total, quiz.id);

    Ok((
        StatusCode::CREATED,
        Json(SaveResultResponse {
            id: result.id,
            score,
            total,
        }),
    ))
}

/// The caller's own attempts.
pub async fn my_results(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<QuizResult>>, ApiError> {
    Ok(Json(
        state.quiz_repo.list_results_for_user(&user.user_id).await?,
    ))
}
