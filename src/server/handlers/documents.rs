//! Document upload and text extraction.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::super::error::ApiError;
use super::super::AppState;
use super::owned_document;
use crate::models::{AuthUser, Document, DocumentStatus};
use crate::ocr::is_supported;
use crate::storage::{detect_mime, remove_upload, save_upload};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub title: Option<String>,
}

/// Document listing entry, without the extracted text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub mime_type: String,
    pub file_size: u64,
    pub page_count: Option<u32>,
    pub status: DocumentStatus,
    pub has_text: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            has_text: doc.has_text(),
            id: doc.id,
            title: doc.title,
            mime_type: doc.mime_type,
            file_size: doc.file_size,
            page_count: doc.page_count,
            status: doc.status,
            created_at: doc.created_at,
        }
    }
}

/// Upload a file (raw request body) and extract its text.
///
/// Re-uploading identical content returns the existing document.
pub async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<UploadQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!(
                "Upload exceeds the {} byte limit",
                state.max_upload_bytes
            ))
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty upload".to_string()));
    }

    let declared = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let mime_type = detect_mime(&body, declared);
    if !is_supported(&mime_type) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "Unsupported file type: {}",
            mime_type
        )));
    }

    let content_hash = Document::compute_hash(&body);
    if let Some(existing) = state
        .doc_repo
        .find_by_hash(&user.user_id, &content_hash)
        .await?
    {
        info!("Upload matches existing document {}", existing.id);
        return Ok((StatusCode::OK, Json(existing)));
    }

    let stored = save_upload(&body, &mime_type, &state.uploads_dir)
        .map_err(|e| ApiError::Internal(format!("Failed to store upload: {}", e)))?;

    let title = params
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled document".to_string());
    let mut doc = Document::new(user.user_id, title, mime_type, stored.path, &body);
    if !state.doc_repo.insert(&doc).await? {
        // A concurrent upload of the same content won the insert
        let existing = state
            .doc_repo
            .find_by_hash(&doc.owner_id, &content_hash)
            .await?
            .ok_or_else(|| ApiError::Internal("Duplicate upload vanished".to_string()))?;
        info!("Upload matches existing document {}", existing.id);
        return Ok((StatusCode::OK, Json(existing)));
    }

    let extractor = state.extractor.clone();
    let path = doc.file_path.clone();
    let mime = doc.mime_type.clone();
    let extraction = tokio::task::spawn_blocking(move || extractor.extract(&path, &mime))
        .await
        .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))?;

    match extraction {
        Ok(result) => {
            info!(
                "Extracted {} chars from {} via {}",
                result.text.len(),
                doc.id,
                result.method.as_str()
            );
            doc.extracted_text = Some(result.text);
            doc.extraction_method = Some(result.method.as_str().to_string());
            doc.page_count = result.page_count;
            doc.status = DocumentStatus::Extracted;
        }
        Err(e) => {
            warn!("Text extraction failed for {}: {}", doc.id, e);
            doc.status = DocumentStatus::Failed;
        }
    }
    doc.updated_at = Utc::now();

    state
        .doc_repo
        .update_extraction(
            &doc.id,
            doc.extracted_text.as_deref(),
            doc.extraction_method.as_deref(),
            doc.page_count,
            doc.status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(doc)))
}

pub async fn list_documents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    let docs = state.doc_repo.list_for_owner(&user.user_id).await?;
    Ok(Json(docs.into_iter().map(DocumentSummary::from).collect()))
}

pub async fn get_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(owned_document(&state, &id, &user).await?))
}

/// Delete a document, its highlights and flashcards, and the stored file
/// once nothing else references it.
pub async fn delete_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let doc = owned_document(&state, &id, &user).await?;
    state.doc_repo.delete(&doc.id).await?;

    if state.doc_repo.count_by_hash(&doc.content_hash).await? == 0 {
        if let Err(e) = remove_upload(&doc.file_path) {
            warn!("Failed to remove {}: {}", doc.file_path.display(), e);
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
