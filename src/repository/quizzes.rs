//! Quiz and quiz result repository.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewQuiz, NewQuizResult, QuizRecord, QuizResultRecord};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use super::util::{from_json_column, to_json_column};
use crate::models::{Quiz, QuizResult};
use crate::schema::{quiz_results, quizzes};

impl From<QuizRecord> for Quiz {
    fn from(record: QuizRecord) -> Self {
        Quiz {
            id: record.id,
            owner_id: record.owner_id,
            document_id: record.document_id,
            title: record.title,
            questions: from_json_column(&record.questions),
            created_at: parse_datetime(&record.created_at),
        }
    }
}

impl From<QuizResultRecord> for QuizResult {
    fn from(record: QuizResultRecord) -> Self {
        QuizResult {
            id: record.id,
            quiz_id: record.quiz_id,
            user_id: record.user_id,
            participant_name: record.participant_name,
            answers: from_json_column(&record.answers),
            score: record.score.max(0) as u32,
            total: record.total.max(0) as u32,
            shared: record.shared,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

#[derive(Clone)]
pub struct QuizRepository {
    pool: AsyncSqlitePool,
}

impl QuizRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, quiz: &Quiz) -> Result<(), DieselError> {
        let questions = to_json_column(&quiz.questions)?;
        let created_at = quiz.created_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::replace_into(quizzes::table)
            .values(&NewQuiz {
                id: &quiz.id,
                owner_id: &quiz.owner_id,
                document_id: quiz.document_id.as_deref(),
                title: &quiz.title,
                questions: &questions,
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Quiz>, DieselError> {
        let mut conn = self.pool.get().await?;
        quizzes::table
            .find(id)
            .select(QuizRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Quiz::from))
    }

    /// A user's quizzes, newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Quiz>, DieselError> {
        let mut conn = self.pool.get().await?;
        quizzes::table
            .filter(quizzes::owner_id.eq(owner_id))
            .order(quizzes::created_at.desc())
            .select(QuizRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Quiz::from).collect())
    }

    pub async fn save_result(&self, result: &QuizResult) -> Result<(), DieselError> {
        let answers = to_json_column(&result.answers)?;
        let created_at = result.created_at.to_rfc3339();

        let mut conn = self.pool.get().await?;
        diesel::insert_into(quiz_results::table)
            .values(&NewQuizResult {
                id: &result.id,
                quiz_id: &result.quiz_id,
                user_id: result.user_id.as_deref(),
                participant_name: result.participant_name.as_deref(),
                answers: &answers,
                score: result.score as i32,
                total: result.total as i32,
                shared: result.shared,
                created_at: &created_at,
            })
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// All attempts at a quiz, newest first.
    pub async fn list_results(&self, quiz_id: &str) -> Result<Vec<QuizResult>, DieselError> {
        let mut conn = self.pool.get().await?;
        quiz_results::table
            .filter(quiz_results::quiz_id.eq(quiz_id))
            .order(quiz_results::created_at.desc())
            .select(QuizResultRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(QuizResult::from).collect())
    }

    /// A user's own attempts, newest first.
    pub async fn list_results_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<QuizResult>, DieselError> {
        let mut conn = self.pool.get().await?;
        quiz_results::table
            .filter(quiz_results::user_id.eq(user_id))
            .order(quiz_results::created_at.desc())
            .select(QuizResultRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(QuizResult::from).collect())
    }
}
