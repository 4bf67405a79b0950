//! Quizzes and quiz results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A multiple-choice question.
///
/// `correct_answer` is always the full text of one of `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// A saved quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub owner_id: String,
    pub document_id: Option<String>,
    pub title: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn new(
        owner_id: String,
        document_id: Option<String>,
        title: String,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            document_id,
            title,
            questions,
            created_at: Utc::now(),
        }
    }
}

/// One attempt at a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: String,
    pub quiz_id: String,
    pub user_id: Option<String>,
    pub participant_name: Option<String>,
    /// Chosen option per question; `None` for skipped questions.
    pub answers: Vec<Option<String>>,
    pub score: u32,
    pub total: u32,
    /// Whether the attempt was taken through a shared quiz link.
    pub shared: bool,
    pub created_at: DateTime<Utc>,
}
