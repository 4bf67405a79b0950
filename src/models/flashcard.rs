//! Flashcards generated from study material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single two-sided card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// A saved batch of flashcards, optionally tied to a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    pub id: String,
    pub owner_id: String,
    pub document_id: Option<String>,
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
}

impl FlashcardSet {
    pub fn new(owner_id: String, document_id: Option<String>, cards: Vec<Flashcard>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            document_id,
            cards,
            created_at: Utc::now(),
        }
    }
}
