//! JSON extraction and normalization of model output.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{QuizError, OPTIONS_PER_QUESTION};
use crate::models::{Flashcard, Question};

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)```").expect("valid regex"));

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("valid regex"));

/// Pull the JSON payload out of a model response.
///
/// Looks for a ```json fence, then any fence, then the outermost
/// `{...}` or `[...]` span.
pub fn extract_json_block(response: &str) -> Option<&str> {
    if let Some(caps) = JSON_FENCE.captures(response) {
        return caps.get(1).map(|m| m.as_str().trim());
    }
    if let Some(caps) = ANY_FENCE.captures(response) {
        let body = caps.get(1).map(|m| m.as_str().trim())?;
        if body.starts_with('{') || body.starts_with('[') {
            return Some(body);
        }
    }

    let start = response.find(['{', '['])?;
    let close = if response[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let end = response.rfind(close)?;
    (end > start).then(|| response[start..=end].trim())
}

/// Question as models tend to write it, before normalization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, alias = "correct_answer", alias = "answer")]
    correct_answer: Option<Value>,
}

/// Parse a quiz from a model response.
///
/// Accepts `{"questions": [...]}` or a bare array. Questions that don't have
/// exactly four options, or whose answer can't be matched to an option, are
/// dropped.
pub fn parse_quiz(response: &str) -> Result<Vec<Question>, QuizError> {
    let json = extract_json_block(response).ok_or(QuizError::NoJson)?;
    let value: Value = serde_json::from_str(json)?;

    let items = match value {
        Value::Object(mut obj) => obj.remove("questions").unwrap_or(Value::Null),
        other => other,
    };
    let raw: Vec<RawQuestion> = serde_json::from_value(items)?;
    let total = raw.len();

    let questions: Vec<Question> = raw.into_iter().filter_map(normalize_question).collect();

    if questions.len() < total {
        debug!(
            "Dropped {} malformed question(s) from model response",
            total - questions.len()
        );
    }
    if questions.is_empty() {
        return Err(QuizError::NoValidQuestions);
    }
    Ok(questions)
}

fn normalize_question(raw: RawQuestion) -> Option<Question> {
    let question = raw.question.trim().to_string();
    let options: Vec<String> = raw.options.iter().map(|o| o.trim().to_string()).collect();

    if question.is_empty()
        || options.len() != OPTIONS_PER_QUESTION
        || options.iter().any(|o| o.is_empty())
    {
        return None;
    }

    let correct_answer = resolve_answer(raw.correct_answer?, &options)?;
    Some(Question {
        question,
        options,
        correct_answer,
    })
}

/// Match an answer to one of the options.
///
/// Accepts the option text itself, a letter (`"B"`, `"b)"`), or a
/// zero-based index.
fn resolve_answer(answer: Value, options: &[String]) -> Option<String> {
    let text = match answer {
        Value::Number(n) => {
            let idx = n.as_u64()? as usize;
            return options.get(idx).cloned();
        }
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };

    if let Some(option) = options.iter().find(|o| **o == text) {
        return Some(option.clone());
    }
    if let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(&text)) {
        return Some(option.clone());
    }

    // "B", "b)", "B." -> second option
    let letter = text.trim_end_matches([')', '.', ':']);
    if letter.len() == 1 {
        let c = letter.chars().next()?.to_ascii_uppercase();
        if ('A'..='D').contains(&c) {
            return options.get((c as u8 - b'A') as usize).cloned();
        }
    }

    // "B) Paris" -> strip the label and retry
    let mut chars = text.chars();
    if let (Some(label), Some(sep)) = (chars.next(), chars.next()) {
        if label.is_ascii_alphabetic() && matches!(sep, ')' | '.' | ':') {
            let rest = chars.as_str().trim();
            return options.iter().find(|o| *o == rest).cloned();
        }
    }

    None
}

/// Parse flashcards from a model response.
///
/// Accepts `{"flashcards": [...]}` or a bare array of `{front, back}`.
pub fn parse_flashcards(response: &str) -> Result<Vec<Flashcard>, QuizError> {
    let json = extract_json_block(response).ok_or(QuizError::NoJson)?;
    let value: Value = serde_json::from_str(json)?;

    let items = match value {
        Value::Object(mut obj) => obj
            .remove("flashcards")
            .or_else(|| obj.remove("cards"))
            .unwrap_or(Value::Null),
        other => other,
    };
    let cards: Vec<Flashcard> = serde_json::from_value(items)?;

    let cards: Vec<Flashcard> = cards
        .into_iter()
        .map(|c| Flashcard {
            front: c.front.trim().to_string(),
            back: c.back.trim().to_string(),
        })
        .filter(|c| !c.front.is_empty() && !c.back.is_empty())
        .collect();

    if cards.is_empty() {
        return Err(QuizError::NoValidFlashcards);
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENCED: &str = r#"Here is your quiz:

```json
{
  "questions": [
    {
      "question": "What is the capital of France?",
      "options": ["Berlin", "Paris", "Rome", "Madrid"],
      "correctAnswer": "Paris"
    },
    {
      "question": "2 + 2 = ?",
      "options": ["3", "4", "5", "6"],
      "correctAnswer": "B"
    }
  ]
}
```

Good luck!"#;

    #[test]
    fn test_extract_json_fence() {
        let json = extract_json_block(FENCED).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_untagged_fence_and_bare_json() {
        assert_eq!(extract_json_block("```\n[1, 2]\n```"), Some("[1, 2]"));
        assert_eq!(
            extract_json_block("Sure! {\"a\": 1} hope that helps"),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn test_parse_quiz_fenced() {
        let questions = parse_quiz(FENCED).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, "Paris");
        // Letter answers are mapped to the option text
        assert_eq!(questions[1].correct_answer, "4");
        for q in &questions {
            assert_eq!(q.options.len(), OPTIONS_PER_QUESTION);
            assert!(q.options.contains(&q.correct_answer));
        }
    }

    #[test]
    fn test_parse_quiz_drops_invalid_questions() {
        let response = r#"[
            {"question": "Three options", "options": ["a", "b", "c"], "correctAnswer": "a"},
            {"question": "Answer not an option", "options": ["a", "b", "c", "d"], "correctAnswer": "z"},
            {"question": "Index answer", "options": ["a", "b", "c", "d"], "correct_answer": 2},
            {"question": "Labelled answer", "options": ["red", "green", "blue", "black"], "answer": "C) blue"}
        ]"#;
        let questions = parse_quiz(response).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_answer, "c");
        assert_eq!(questions[1].correct_answer, "blue");
    }

    #[test]
    fn test_parse_quiz_errors() {
        assert!(matches!(parse_quiz("sorry, I can't"), Err(QuizError::NoJson)));
        assert!(matches!(
            parse_quiz("```json\n{\"questions\": [}\n```"),
            Err(QuizError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_quiz(r#"{"questions": []}"#),
            Err(QuizError::NoValidQuestions)
        ));
    }

    #[test]
    fn test_parse_flashcards() {
        let response = r#"```json
{"flashcards": [
  {"front": "Mitochondria", "back": "Powerhouse of the cell"},
  {"front": " ", "back": "empty front"}
]}
```"#;
        let cards = parse_flashcards(response).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "Mitochondria");

        assert!(matches!(
            parse_flashcards("[]"),
            Err(QuizError::NoValidFlashcards)
        ));
    }
}
