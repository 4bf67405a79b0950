//! Generative-AI integration.
//!
//! `LlmClient` talks to a model provider (Ollama, OpenAI-compatible, or
//! Gemini). `StudyAssistant` builds the study prompts on top of any
//! `TextGenerator` and parses what comes back.

mod assistant;
mod client;
mod config;
mod prompts;

pub use assistant::StudyAssistant;
pub use client::{LlmClient, LlmError, TextGenerator};
pub use config::{LlmConfig, LlmProvider};
