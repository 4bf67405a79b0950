//! Flashcard set repository.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{FlashcardSetRecord, NewFlashcardSet};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{from_json_column, to_json_column};
use crate::models::FlashcardSet;
use crate::schema::flashcard_sets;

impl From<FlashcardSetRecord> for FlashcardSet {
    fn from(record: FlashcardSetRecord) -> Self {
        FlashcardSet {
            id: record.id,
            owner_id: record.owner_id,
            document_id: record.document_id,
            cards: from_json_column(&record.cards),
            created_at: parse_datetime(&record.created_at),
        }
    }
}

#[derive(Clone)]
pub struct FlashcardRepository {
    pool: AsyncSqlitePool,
}

impl FlashcardRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, set: &FlashcardSet) -> Result<(), DieselError> {
        let cards = to_json_column(&set.cards)?;
        let created_at = set.created_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::replace_into(flashcard_sets::table)
            .values(&NewFlashcardSet {
                id: &set.id,
                owner_id: &set.owner_id,
                document_id: set.document_id.as_deref(),
                cards: &cards,
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<FlashcardSet>, DieselError> {
        let mut conn = self.pool.get().await?;
        flashcard_sets::table
            .find(id)
            .select(FlashcardSetRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(FlashcardSet::from))
    }

    /// A user's flashcard sets for a document, newest first.
    pub async fn list_for_document(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<FlashcardSet>, DieselError> {
        let mut conn = self.pool.get().await?;
        flashcard_sets::table
            .filter(flashcard_sets::document_id.eq(document_id))
            .filter(flashcard_sets::owner_id.eq(owner_id))
            .order(flashcard_sets::created_at.desc())
            .select(FlashcardSetRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(FlashcardSet::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flashcard;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_flashcard_sets() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        let repo = ctx.flashcards();

        let set = FlashcardSet::new(
            "user-1".to_string(),
            Some("doc-1".to_string()),
            vec![Flashcard {
                front: "Osmosis".to_string(),
                back: "Diffusion of water across a membrane".to_string(),
            }],
        );
        repo.save(&set).await.unwrap();

        let loaded = repo.get(&set.id).await.unwrap().unwrap();
        assert_eq!(loaded.cards, set.cards);
        assert_eq!(
            repo.list_for_document("doc-1", "user-1").await.unwrap().len(),
            1
        );
        assert!(repo
            .list_for_document("doc-1", "user-2")
            .await
            .unwrap()
            .is_empty());
    }
}
