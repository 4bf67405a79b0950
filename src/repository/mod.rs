//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM over SQLite. Each table has its own
//! repository; `DbContext` hands them out and owns the schema.

pub mod context;
pub mod models;
pub mod pool;
pub mod util;

mod documents;
mod flashcards;
mod highlights;
mod invites;
mod quizzes;
mod tokens;

pub use context::DbContext;
pub use documents::DocumentRepository;
pub use flashcards::FlashcardRepository;
pub use highlights::HighlightRepository;
pub use invites::InviteRepository;
pub use pool::{AsyncSqlitePool, DieselError};
pub use quizzes::QuizRepository;
pub use tokens::TokenRepository;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime column.
pub fn parse_datetime_opt(s: Option<&str>) -> Option<DateTime<Utc>> {
    s.map(parse_datetime)
}
