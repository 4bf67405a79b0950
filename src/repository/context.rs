//! Database context for managing connections and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;
use tracing::info;

use super::pool::{AsyncSqlitePool, DieselError};
use super::{
    DocumentRepository, FlashcardRepository, HighlightRepository, InviteRepository,
    QuizRepository, TokenRepository,
};

/// Database context that owns the connection factory and provides repository access.
///
/// Create one context per command or server, then use it to access all
/// repositories.
///
/// # Example
/// ```ignore
/// let ctx = DbContext::from_path(&db_path);
/// ctx.init_schema().await?;
/// let invite = ctx.invites().create("restaurant-1", "user-1").await?;
/// ```
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a new database context from a file path.
    pub fn from_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Create a new database context from a `sqlite:` URL or plain path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Get the underlying connection factory.
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone())
    }

    pub fn quizzes(&self) -> QuizRepository {
        QuizRepository::new(self.pool.clone())
    }

    pub fn highlights(&self) -> HighlightRepository {
        HighlightRepository::new(self.pool.clone())
    }

    pub fn flashcards(&self) -> FlashcardRepository {
        FlashcardRepository::new(self.pool.clone())
    }

    pub fn invites(&self) -> InviteRepository {
        InviteRepository::new(self.pool.clone())
    }

    pub fn tokens(&self) -> TokenRepository {
        TokenRepository::new(self.pool.clone())
    }

    /// Initialize all database tables.
    ///
    /// This creates the necessary tables if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            -- Bearer tokens (only the hash is stored)
            CREATE TABLE IF NOT EXISTS api_tokens (
                token_hash TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                restaurant_id TEXT,
                role TEXT NOT NULL DEFAULT 'member',
                created_at TEXT NOT NULL
            );

            -- Uploaded documents
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                title TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                file_path TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                page_count INTEGER,
                extracted_text TEXT,
                extraction_method TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner_id, created_at);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_owner_hash ON documents(owner_id, content_hash);

            -- Saved quizzes (questions stored as JSON)
            CREATE TABLE IF NOT EXISTS quizzes (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                document_id TEXT,
                title TEXT NOT NULL,
                questions TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quizzes_owner ON quizzes(owner_id, created_at);

            -- Quiz attempts
            CREATE TABLE IF NOT EXISTS quiz_results (
                id TEXT PRIMARY KEY,
                quiz_id TEXT NOT NULL,
                user_id TEXT,
                participant_name TEXT,
                answers TEXT NOT NULL,
                score INTEGER NOT NULL,
                total INTEGER NOT NULL,
                shared INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quiz_results_quiz ON quiz_results(quiz_id);
            CREATE INDEX IF NOT EXISTS idx_quiz_results_user ON quiz_results(user_id);

            -- Highlights and notes
            CREATE TABLE IF NOT EXISTS highlights (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                page INTEGER,
                passage TEXT NOT NULL,
                note TEXT,
                color TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_highlights_document ON highlights(document_id, owner_id);

            -- Flashcard sets (cards stored as JSON)
            CREATE TABLE IF NOT EXISTS flashcard_sets (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                document_id TEXT,
                cards TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_flashcard_sets_document ON flashcard_sets(document_id);

            -- Single-use invite codes
            CREATE TABLE IF NOT EXISTS invite_codes (
                code TEXT PRIMARY KEY,
                restaurant_id TEXT NOT NULL,
                created_by TEXT NOT NULL,
                used INTEGER NOT NULL DEFAULT 0,
                used_at TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_invite_codes_restaurant ON invite_codes(restaurant_id);
            "#,
        )
        .await?;

        info!("Database schema ready at {}", self.pool.database_url());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        ctx.init_schema().await.unwrap();
    }
}
