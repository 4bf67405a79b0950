//! Uploaded study documents and their extracted text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Text extraction status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Extracted,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracted => "extracted",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "extracted" => Some(Self::Extracted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A document uploaded by a user.
///
/// The file itself lives in the uploads directory, addressed by its
/// SHA-256 hash; the row only records where it is and what was read from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub mime_type: String,
    #[serde(skip_serializing, default)]
    pub file_path: PathBuf,
    pub content_hash: String,
    pub file_size: u64,
    pub page_count: Option<u32>,
    pub extracted_text: Option<String>,
    /// Extraction method (`pdftotext`, `tesseract`, `hybrid`, `plain`).
    pub extraction_method: Option<String>,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Compute SHA-256 hash of content.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Create a new pending document for stored content.
    pub fn new(
        owner_id: String,
        title: String,
        mime_type: String,
        file_path: PathBuf,
        content: &[u8],
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            title,
            mime_type,
            file_path,
            content_hash: Self::compute_hash(content),
            file_size: content.len() as u64,
            page_count: None,
            extracted_text: None,
            extraction_method: None,
            status: DocumentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether text is available for quiz or flashcard generation.
    pub fn has_text(&self) -> bool {
        self.extracted_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Pending,
            DocumentStatus::Extracted,
            DocumentStatus::Failed,
        ] {
            assert_eq!(DocumentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(DocumentStatus::from_str("ocr_complete"), None);
    }

    #[test]
    fn test_new_document_hash() {
        let doc = Document::new(
            "user-1".to_string(),
            "Notes".to_string(),
            "text/plain".to_string(),
            PathBuf::from("ab/abcdef.txt"),
            b"hello",
        );
        assert_eq!(
            doc.content_hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(doc.file_size, 5);
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert!(!doc.has_text());
    }
}
