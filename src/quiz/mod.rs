//! Parsing of AI-generated quizzes and flashcards, and quiz scoring.
//!
//! Models are asked to answer with a fenced ```json block, but in practice
//! they wrap it in prose, forget the language tag, or skip the fence
//! entirely. Extraction tries each of those shapes in turn.

mod parse;

pub use parse::{extract_json_block, parse_flashcards, parse_quiz};

use thiserror::Error;

use crate::models::Question;

/// Number of options every question must have.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Errors that can occur while reading a model response.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("No JSON found in model response")]
    NoJson,

    #[error("Invalid JSON in model response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Model response contained no valid questions")]
    NoValidQuestions,

    #[error("Model response contained no valid flashcards")]
    NoValidFlashcards,
}

/// Score a set of answers against the questions they answer.
///
/// Returns `(score, total)`. Missing or extra answers are ignored; answers
/// are compared after trimming whitespace.
pub fn score_answers(questions: &[Question], answers: &[Option<String>]) -> (u32, u32) {
    let score = questions
        .iter()
        .zip(answers.iter())
        .filter(|(q, a)| {
            a.as_deref()
                .map(|a| a.trim() == q.correct_answer.trim())
                .unwrap_or(false)
        })
        .count();

    (score as u32, questions.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: &str) -> Question {
        Question {
            question: "Which?".to_string(),
            options: vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ],
            correct_answer: correct.to_string(),
        }
    }

    #[test]
    fn test_score_answers() {
        let questions = vec![question("A"), question("B"), question("C")];
        let answers = vec![Some("A".to_string()), Some("C".to_string()), None];
        assert_eq!(score_answers(&questions, &answers), (1, 3));
    }

    #[test]
    fn test_score_answers_short_answer_list() {
        let questions = vec![question("A"), question("B")];
        assert_eq!(score_answers(&questions, &[Some(" B ".to_string())]), (0, 2));
        assert_eq!(score_answers(&questions, &[Some(" A ".to_string())]), (1, 2));
        assert_eq!(score_answers(&questions, &[]), (0, 2));
    }
}
