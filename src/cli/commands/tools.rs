//! Dependency check command.

use console::style;

use crate::config::Config;
use crate::llm::StudyAssistant;
use crate::ocr::TextExtractor;

/// Report which OCR tools are installed and whether the LLM answers.
pub async fn cmd_tools(config: &Config) -> anyhow::Result<()> {
    println!("{}", style("OCR tools").bold());
    for tool in TextExtractor::check_tools() {
        if tool.available {
            println!("  {} {}", style("✓").green(), tool.name);
        } else {
            println!(
                "  {} {} (install {})",
                style("✗").red(),
                tool.name,
                tool.package
            );
        }
    }

    println!("{}", style("LLM").bold());
    let assistant = StudyAssistant::from_config(config.llm.clone(), config.quiz.clone())?;
    let target = format!(
        "{} {} at {}",
        config.llm.provider.as_str(),
        assistant.model_name(),
        config.llm.endpoint
    );
    if assistant.is_available().await {
        println!("  {} {}", style("✓").green(), target);
    } else {
        println!("  {} {} (unreachable or disabled)", style("✗").red(), target);
    }
    Ok(())
}
