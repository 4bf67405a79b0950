//! Highlight and note repository.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;

use super::models::{HighlightRecord, NewHighlight};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::Highlight;
use crate::schema::highlights;

impl From<HighlightRecord> for Highlight {
    fn from(record: HighlightRecord) -> Self {
        Highlight {
            id: record.id,
            document_id: record.document_id,
            owner_id: record.owner_id,
            page: record.page,
            text: record.passage,
            note: record.note,
            color: record.color,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

#[derive(Clone)]
pub struct HighlightRepository {
    pool: AsyncSqlitePool,
}

impl HighlightRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, highlight: &Highlight) -> Result<(), DieselError> {
        let created_at = highlight.created_at.to_rfc3339();
        let updated_at = highlight.updated_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::insert_into(highlights::table)
            .values(&NewHighlight {
                id: &highlight.id,
                document_id: &highlight.document_id,
                owner_id: &highlight.owner_id,
                page: highlight.page,
                passage: &highlight.text,
                note: highlight.note.as_deref(),
                color: &highlight.color,
                created_at: &created_at,
                updated_at: &updated_at,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Highlight>, DieselError> {
        let mut conn = self.pool.get().await?;
        highlights::table
            .find(id)
            .select(HighlightRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Highlight::from))
    }

    /// A user's highlights on a document, optionally for one page only.
    pub async fn list(
        &self,
        document_id: &str,
        owner_id: &str,
        page: Option<i32>,
    ) -> Result<Vec<Highlight>, DieselError> {
        let mut conn = self.pool.get().await?;
        let mut query: highlights::BoxedQuery<'_, Sqlite> = highlights::table
            .filter(highlights::document_id.eq(document_id))
            .filter(highlights::owner_id.eq(owner_id))
            .into_boxed();
        if let Some(page) = page {
            query = query.filter(highlights::page.eq(page));
        }

        query
            .order((highlights::page.asc(), highlights::created_at.asc()))
            .select(HighlightRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Highlight::from).collect())
    }

    /// Set or clear the note on a highlight. Returns the updated highlight.
    pub async fn update_note(
        &self,
        id: &str,
        note: Option<&str>,
    ) -> Result<Option<Highlight>, DieselError> {
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let now = Utc::now().to_rfc3339();
        {
            let mut conn = self.pool.get().await?;
            diesel::update(highlights::table.find(id))
                .set((highlights::note.eq(note), highlights::updated_at.eq(&now)))
                .execute(&mut conn)
                .await?;
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(highlights::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}
