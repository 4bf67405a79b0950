//! Local extraction and quiz commands.

use std::path::Path;

use console::style;

use crate::config::Config;
use crate::llm::StudyAssistant;
use crate::ocr::{ExtractionResult, TextExtractor};
use crate::storage::detect_mime;

/// Run text extraction on a blocking thread.
async fn extract_file(config: &Config, file: &Path) -> anyhow::Result<ExtractionResult> {
    let content = tokio::fs::read(file).await?;
    let guessed = mime_guess::from_path(file).first_raw();
    let mime_type = detect_mime(&content, guessed);

    let extractor = TextExtractor::new(&config.ocr);
    let path = file.to_path_buf();
    let result = tokio::task::spawn_blocking(move || extractor.extract(&path, &mime_type)).await??;
    Ok(result)
}

/// Print the text extracted from a file.
pub async fn cmd_extract(config: &Config, file: &Path) -> anyhow::Result<()> {
    let result = extract_file(config, file).await?;

    eprintln!(
        "{} {} via {}{}",
        style("✓").green(),
        file.display(),
        result.method.as_str(),
        result
            .page_count
            .map(|p| format!(" ({} pages)", p))
            .unwrap_or_default()
    );
    println!("{}", result.text.trim_end());
    Ok(())
}

/// Generate and print a quiz for a file.
pub async fn cmd_quiz(config: &Config, file: &Path, refine: Option<&str>) -> anyhow::Result<()> {
    let result = extract_file(config, file).await?;
    let assistant = StudyAssistant::from_config(config.llm.clone(), config.quiz.clone())?;

    eprintln!(
        "{} Generating quiz with {}...",
        style("→").cyan(),
        assistant.model_name()
    );
    let questions = assistant.generate_quiz(&result.text, refine).await?;

    for (i, q) in questions.iter().enumerate() {
        println!("\n{}. {}", i + 1, style(&q.question).bold());
        for (letter, option) in ('A'..='D').zip(&q.options) {
            if option == &q.correct_answer {
                println!("   {}) {}", letter, style(option).green());
            } else {
                println!("   {}) {}", letter, option);
            }
        }
    }
    Ok(())
}
