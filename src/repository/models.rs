//! Diesel ORM records for database tables.
//!
//! Timestamps are RFC 3339 text; list-valued fields are JSON text.

use diesel::prelude::*;

use crate::schema;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::api_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApiTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    pub restaurant_id: Option<String>,
    pub role: String,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::api_tokens)]
pub struct NewApiToken<'a> {
    pub token_hash: &'a str,
    pub user_id: &'a str,
    pub restaurant_id: Option<&'a str>,
    pub role: &'a str,
    pub created_at: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub mime_type: String,
    pub file_path: String,
    pub content_hash: String,
    pub file_size: i64,
    pub page_count: Option<i32>,
    pub extracted_text: Option<String>,
    pub extraction_method: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::documents)]
pub struct NewDocument<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub title: &'a str,
    pub mime_type: &'a str,
    pub file_path: &'a str,
    pub content_hash: &'a str,
    pub file_size: i64,
    pub page_count: Option<i32>,
    pub extracted_text: Option<&'a str>,
    pub extraction_method: Option<&'a str>,
    pub status: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::quizzes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuizRecord {
    pub id: String,
    pub owner_id: String,
    pub document_id: Option<String>,
    pub title: String,
    pub questions: String,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::quizzes)]
pub struct NewQuiz<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub document_id: Option<&'a str>,
    pub title: &'a str,
    pub questions: &'a str,
    pub created_at: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::quiz_results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuizResultRecord {
    pub id: String,
    pub quiz_id: String,
    pub user_id: Option<String>,
    pub participant_name: Option<String>,
    pub answers: String,
    pub score: i32,
    pub total: i32,
    pub shared: bool,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::quiz_results)]
pub struct NewQuizResult<'a> {
    pub id: &'a str,
    pub quiz_id: &'a str,
    pub user_id: Option<&'a str>,
    pub participant_name: Option<&'a str>,
    pub answers: &'a str,
    pub score: i32,
    pub total: i32,
    pub shared: bool,
    pub created_at: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::highlights)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HighlightRecord {
    pub id: String,
    pub document_id: String,
    pub owner_id: String,
    pub page: Option<i32>,
    pub passage: String,
    pub note: Option<String>,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::highlights)]
pub struct NewHighlight<'a> {
    pub id: &'a str,
    pub document_id: &'a str,
    pub owner_id: &'a str,
    pub page: Option<i32>,
    pub passage: &'a str,
    pub note: Option<&'a str>,
    pub color: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::flashcard_sets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FlashcardSetRecord {
    pub id: String,
    pub owner_id: String,
    pub document_id: Option<String>,
    pub cards: String,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::flashcard_sets)]
pub struct NewFlashcardSet<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub document_id: Option<&'a str>,
    pub cards: &'a str,
    pub created_at: &'a str,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::invite_codes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InviteCodeRecord {
    pub code: String,
    pub restaurant_id: String,
    pub created_by: String,
    pub used: bool,
    pub used_at: Option<String>,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::invite_codes)]
pub struct NewInviteCode<'a> {
    pub code: &'a str,
    pub restaurant_id: &'a str,
    pub created_by: &'a str,
    pub used: bool,
    pub used_at: Option<&'a str>,
    pub created_at: &'a str,
}
