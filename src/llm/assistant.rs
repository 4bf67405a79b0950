//! Study material generation on top of a text generator.

use std::sync::Arc;

use tracing::{debug, info};

use super::client::{LlmClient, LlmError, TextGenerator};
use super::config::LlmConfig;
use crate::config::QuizConfig;
use crate::models::{Flashcard, Question};
use crate::quiz::{parse_flashcards, parse_quiz};

/// Most flashcards or questions a single request may ask for.
pub const MAX_ITEMS_PER_REQUEST: usize = 50;

/// Builds study prompts, sends them, and parses the answers.
pub struct StudyAssistant {
    generator: Arc<dyn TextGenerator>,
    llm: LlmConfig,
    quiz: QuizConfig,
}

impl StudyAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>, llm: LlmConfig, quiz: QuizConfig) -> Self {
        Self {
            generator,
            llm,
            quiz,
        }
    }

    /// Build an assistant backed by the configured LLM provider.
    pub fn from_config(llm: LlmConfig, quiz: QuizConfig) -> Result<Self, LlmError> {
        let client = LlmClient::new(llm.clone())?;
        Ok(Self::new(Arc::new(client), llm, quiz))
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    pub async fn is_available(&self) -> bool {
        self.generator.is_available().await
    }

    /// Generate a multiple-choice quiz from study text.
    ///
    /// `refinement` is optional free-form guidance from the user ("focus on
    /// chapter 2", "make it harder") appended to the prompt.
    pub async fn generate_quiz(
        &self,
        text: &str,
        refinement: Option<&str>,
    ) -> Result<Vec<Question>, LlmError> {
        let content = self.prepare_content(text)?;
        let refinement = refinement
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| format!("\nAdditional instructions from the student: {}\n", r))
            .unwrap_or_default();

        let count = self.quiz.question_count.to_string();
        let prompt = fill_template(
            self.llm.get_quiz_prompt(),
            &[
                ("{count}", count.as_str()),
                ("{refinement}", refinement.as_str()),
                ("{content}", content),
            ],
        );

        info!(
            "Generating {} question quiz from {} chars with {}",
            self.quiz.question_count,
            content.len(),
            self.model_name()
        );
        let response = self.generator.generate(&prompt).await?;
        let questions = parse_quiz(&response)?;

        debug!("Model returned {} usable questions", questions.len());
        Ok(questions)
    }

    /// Generate flashcards from study text.
    pub async fn generate_flashcards(
        &self,
        text: &str,
        count: Option<usize>,
    ) -> Result<Vec<Flashcard>, LlmError> {
        let content = self.prepare_content(text)?;
        let count = count
            .unwrap_or(self.quiz.flashcard_count)
            .clamp(1, MAX_ITEMS_PER_REQUEST);

        let prompt = fill_template(
            self.llm.get_flashcard_prompt(),
            &[("{count}", count.to_string().as_str()), ("{content}", content)],
        );

        info!("Generating {} flashcards with {}", count, self.model_name());
        let response = self.generator.generate(&prompt).await?;
        let mut cards = parse_flashcards(&response)?;
        cards.truncate(count);
        Ok(cards)
    }

    /// Ask the model to clean up OCR output.
    pub async fn refine_text(&self, text: &str) -> Result<String, LlmError> {
        let content = self.prepare_content(text)?;
        let prompt = fill_template(self.llm.get_refine_prompt(), &[("{content}", content)]);

        let response = self.generator.generate(&prompt).await?;
        let refined = response.trim().to_string();
        if refined.is_empty() {
            return Err(LlmError::Parse("Empty refinement response".to_string()));
        }
        Ok(refined)
    }

    /// Reject empty input and truncate to the configured maximum.
    fn prepare_content<'a>(&self, text: &'a str) -> Result<&'a str, LlmError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyInput);
        }
        Ok(truncate_content(text, self.llm.max_content_chars))
    }
}

/// Substitute placeholders in one left-to-right pass, so text inserted for
/// one placeholder is never scanned for another.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while !rest.is_empty() {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, *key, *value)))
            .min_by_key(|(pos, _, _)| *pos);
        match next {
            Some((pos, key, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key.len()..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }
    out
}

/// Truncate content to a maximum byte length (UTF-8 safe).
pub fn truncate_content(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    // Find a valid UTF-8 boundary at or before max_chars
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
