//! Document repository.

use std::path::PathBuf;

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::models::{DocumentRecord, NewDocument};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{Document, DocumentStatus};
use crate::schema::{documents, flashcard_sets, highlights};

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            mime_type: record.mime_type,
            file_path: PathBuf::from(record.file_path),
            content_hash: record.content_hash,
            file_size: record.file_size.max(0) as u64,
            page_count: record.page_count.map(|p| p.max(0) as u32),
            extracted_text: record.extracted_text,
            extraction_method: record.extraction_method,
            status: DocumentStatus::from_str(&record.status).unwrap_or(DocumentStatus::Pending),
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: AsyncSqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a document.
    pub async fn save(&self, doc: &Document) -> Result<(), DieselError> {
        let file_path = doc.file_path.display().to_string();
        let created_at = doc.created_at.to_rfc3339();
        let updated_at = doc.updated_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::replace_into(documents::table)
            .values(&new_document(doc, &file_path, &created_at, &updated_at))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Insert a new upload. Returns false when the owner already has a
    /// document with the same content, leaving that one untouched.
    pub async fn insert(&self, doc: &Document) -> Result<bool, DieselError> {
        let file_path = doc.file_path.display().to_string();
        let created_at = doc.created_at.to_rfc3339();
        let updated_at = doc.updated_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        let inserted = diesel::insert_into(documents::table)
            .values(&new_document(doc, &file_path, &created_at, &updated_at))
            .on_conflict((documents::owner_id, documents::content_hash))
            .do_nothing()
            .execute(&mut conn)
            .await?;
        Ok(inserted > 0)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, DieselError> {
        let mut conn = self.pool.get().await?;
        documents::table
            .find(id)
            .select(DocumentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Document::from))
    }

    /// A user's documents, newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Document>, DieselError> {
        let mut conn = self.pool.get().await?;
        documents::table
            .filter(documents::owner_id.eq(owner_id))
            .order(documents::created_at.desc())
            .select(DocumentRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Document::from).collect())
    }

    /// Find a user's document with identical content.
    pub async fn find_by_hash(
        &self,
        owner_id: &str,
        content_hash: &str,
    ) -> Result<Option<Document>, DieselError> {
        let mut conn = self.pool.get().await?;
        documents::table
            .filter(documents::owner_id.eq(owner_id))
            .filter(documents::content_hash.eq(content_hash))
            .select(DocumentRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Document::from))
    }

    /// Record the outcome of text extraction.
    pub async fn update_extraction(
        &self,
        id: &str,
        text: Option<&str>,
        method: Option<&str>,
        page_count: Option<u32>,
        status: DocumentStatus,
    ) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();
        let updated = diesel::update(documents::table.find(id))
            .set((
                documents::extracted_text.eq(text),
                documents::extraction_method.eq(method),
                documents::page_count.eq(page_count.map(|p| p as i32)),
                documents::status.eq(status.as_str()),
                documents::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(updated > 0)
    }

    /// Replace the extracted text (e.g. after AI clean-up).
    pub async fn update_text(&self, id: &str, text: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();
        let updated = diesel::update(documents::table.find(id))
            .set((
                documents::extracted_text.eq(text),
                documents::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;
        Ok(updated > 0)
    }

    /// Delete a document along with its highlights and flashcard sets.
    ///
    /// Quizzes are kept since they may have been shared.
    pub async fn delete(&self, id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                diesel::delete(highlights::table.filter(highlights::document_id.eq(id)))
                    .execute(conn)
                    .await?;

                diesel::delete(flashcard_sets::table.filter(flashcard_sets::document_id.eq(id)))
                    .execute(conn)
                    .await?;

                let rows = diesel::delete(documents::table.find(id))
                    .execute(conn)
                    .await?;

                Ok(rows > 0)
            })
        })
        .await
    }

    /// Number of documents (any owner) referencing a stored file.
    pub async fn count_by_hash(&self, content_hash: &str) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;
        documents::table
            .filter(documents::content_hash.eq(content_hash))
            .count()
            .get_result(&mut conn)
            .await
    }
}

fn new_document<'a>(
    doc: &'a Document,
    file_path: &'a str,
    created_at: &'a str,
    updated_at: &'a str,
) -> NewDocument<'a> {
    NewDocument {
        id: &doc.id,
        owner_id: &doc.owner_id,
        title: &doc.title,
        mime_type: &doc.mime_type,
        file_path,
        content_hash: &doc.content_hash,
        file_size: doc.file_size as i64,
        page_count: doc.page_count.map(|p| p as i32),
        extracted_text: doc.extracted_text.as_deref(),
        extraction_method: doc.extraction_method.as_deref(),
        status: doc.status.as_str(),
        created_at,
        updated_at,
    }
}
