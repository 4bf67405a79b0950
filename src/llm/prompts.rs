//! Default prompts for study material generation.

/// Default prompt for generating a multiple-choice quiz.
pub const DEFAULT_QUIZ_PROMPT: &str = r#"You are a teacher writing a multiple-choice quiz to help a student review their study material.

Write {count} questions that test understanding of the KEY CONCEPTS in the material below. Each question must have EXACTLY 4 answer options, and exactly one of them must be correct. Make the wrong options plausible.
{refinement}
Study material:
{content}

Respond with ONLY a JSON code block in this exact format:
```json
{
  "questions": [
    {
      "question": "The question text",
      "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
      "correctAnswer": "The full text of the correct option"
    }
  ]
}
```"#;

/// Default prompt for generating flashcards.
pub const DEFAULT_FLASHCARD_PROMPT: &str = r#"You are helping a student memorize their study material.

Create {count} flashcards from the material below. The front of each card is a short term, question or prompt; the back is a concise answer or definition. Cover the most important facts and concepts, and do not repeat cards.

Study material:
{content}

Respond with ONLY a JSON code block in this exact format:
```json
{
  "flashcards": [
    { "front": "Term or question", "back": "Definition or answer" }
  ]
}
```"#;

/// Default prompt for cleaning up OCR output.
pub const DEFAULT_REFINE_PROMPT: &str = r#"The following text was extracted from a scanned document with OCR and contains recognition errors.

Fix misrecognized characters, rejoin words broken across lines, remove page headers, footers and stray symbols, and restore paragraph breaks. Do NOT summarize, add, or remove content.

OCR text:
{content}

Respond with ONLY the corrected text. No preamble."#;
