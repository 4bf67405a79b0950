//! LLM client configuration.

use serde::{Deserialize, Serialize};

use super::prompts::{DEFAULT_FLASHCARD_PROMPT, DEFAULT_QUIZ_PROMPT, DEFAULT_REFINE_PROMPT};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama API (local, default)
    #[default]
    Ollama,
    /// OpenAI-compatible API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
    /// Google Gemini generateContent API
    Gemini,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
            Self::Gemini => "gemini",
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether AI generation is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// LLM provider (ollama, openai or gemini)
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint (provider-specific defaults apply)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key for hosted providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum characters of document text to send to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Custom quiz prompt (uses {count}, {content} and {refinement} placeholders)
    #[serde(default)]
    pub quiz_prompt: Option<String>,
    /// Custom flashcard prompt (uses {count} and {content} placeholders)
    #[serde(default)]
    pub flashcard_prompt: Option<String>,
    /// Custom OCR clean-up prompt (uses the {content} placeholder)
    #[serde(default)]
    pub refine_prompt: Option<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_content_chars() -> usize {
    30000
}

/// Default endpoint for a provider.
fn provider_endpoint(provider: &str) -> Option<&'static str> {
    match provider {
        "groq" => Some("https://api.groq.com/openai"),
        "openai" => Some("https://api.openai.com"),
        "together" => Some("https://api.together.xyz"),
        "gemini" | "google" => Some("https://generativelanguage.googleapis.com"),
        _ => None,
    }
}

/// Default model for a provider, used when LLM_MODEL is not set.
fn provider_model(provider: &str) -> Option<&'static str> {
    match provider {
        "groq" => Some("llama-3.1-70b-versatile"),
        "openai" => Some("gpt-4o-mini"),
        "gemini" | "google" => Some("gemini-1.5-flash"),
        _ => None,
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    /// Base default without env overrides.
    pub fn base_default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: LlmProvider::default(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_content_chars: default_max_content_chars(),
            quiz_prompt: None,
            flashcard_prompt: None,
            refine_prompt: None,
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_ENABLED`: "true" or "false"
    /// - `LLM_PROVIDER`: "ollama" (default), "openai", "groq", "together" or "gemini"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for hosted providers
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_MAX_CONTENT_CHARS`: Max document chars to send
    ///
    /// Without `LLM_PROVIDER`, the provider is detected from `GEMINI_API_KEY`,
    /// `GROQ_API_KEY` or `OPENAI_API_KEY`, in that order.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_env_lookup(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = var("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        let explicit_endpoint = var("LLM_ENDPOINT");
        if let Some(ref endpoint) = explicit_endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(val) = var("LLM_API_KEY") {
            self.api_key = Some(val);
        }

        // Provider name used to pick endpoint/model/key defaults
        let provider_name = match var("LLM_PROVIDER") {
            Some(val) => {
                if let Some(provider) = LlmProvider::from_str(&val) {
                    self.provider = provider;
                }
                Some(val.to_lowercase())
            }
            None => {
                let detected = [
                    ("GEMINI_API_KEY", "gemini", LlmProvider::Gemini),
                    ("GROQ_API_KEY", "groq", LlmProvider::OpenAI),
                    ("OPENAI_API_KEY", "openai", LlmProvider::OpenAI),
                ]
                .into_iter()
                .find_map(|(key_var, name, provider)| {
                    var(key_var).map(|key| (key, name, provider))
                });

                match detected {
                    Some((key, name, provider)) if self.api_key.is_none() => {
                        self.api_key = Some(key);
                        self.provider = provider;
                        Some(name.to_string())
                    }
                    _ => None,
                }
            }
        };

        if let Some(ref name) = provider_name {
            if explicit_endpoint.is_none() {
                if let Some(endpoint) = provider_endpoint(name) {
                    self.endpoint = endpoint.to_string();
                }
            }
            if self.api_key.is_none() {
                self.api_key = match name.as_str() {
                    "groq" => var("GROQ_API_KEY"),
                    "openai" => var("OPENAI_API_KEY"),
                    "gemini" | "google" => var("GEMINI_API_KEY"),
                    _ => None,
                };
            }
            if let Some(model) = provider_model(name) {
                self.model = model.to_string();
            }
        }

        if let Some(val) = var("LLM_MODEL") {
            self.model = val;
        }
        if let Some(n) = var("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = n;
        }
        if let Some(t) = var("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = t;
        }
        if let Some(n) = var("LLM_MAX_CONTENT_CHARS").and_then(|v| v.parse().ok()) {
            self.max_content_chars = n;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Get the quiz prompt, using custom or default.
    pub fn get_quiz_prompt(&self) -> &str {
        self.quiz_prompt.as_deref().unwrap_or(DEFAULT_QUIZ_PROMPT)
    }

    /// Get the flashcard prompt, using custom or default.
    pub fn get_flashcard_prompt(&self) -> &str {
        self.flashcard_prompt
            .as_deref()
            .unwrap_or(DEFAULT_FLASHCARD_PROMPT)
    }

    /// Get the OCR clean-up prompt, using custom or default.
    pub fn get_refine_prompt(&self) -> &str {
        self.refine_prompt.as_deref().unwrap_or(DEFAULT_REFINE_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_base_default() {
        let config = LlmConfig::base_default();
        assert!(config.enabled);
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert!(config.quiz_prompt.is_none());
        assert!(config.get_quiz_prompt().contains("{content}"));
    }

    #[test]
    fn test_gemini_key_autodetect() {
        let config = LlmConfig::base_default().with_env_lookup(lookup(&[("GEMINI_API_KEY", "g-key")]));
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.endpoint, "https://generativelanguage.googleapis.com");
        assert_eq!(config.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_explicit_provider_wins() {
        let config = LlmConfig::base_default().with_env_lookup(lookup(&[
            ("LLM_PROVIDER", "groq"),
            ("GEMINI_API_KEY", "g-key"),
            ("GROQ_API_KEY", "gsk-key"),
            ("LLM_MODEL", "mixtral"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.api_key.as_deref(), Some("gsk-key"));
        assert_eq!(config.endpoint, "https://api.groq.com/openai");
        assert_eq!(config.model, "mixtral");
    }

    #[test]
    fn test_numeric_overrides_ignore_garbage() {
        let config = LlmConfig::base_default().with_env_lookup(lookup(&[
            ("LLM_MAX_TOKENS", "lots"),
            ("LLM_TEMPERATURE", "0.9"),
            ("LLM_ENABLED", "false"),
        ]));
        assert_eq!(config.max_tokens, default_max_tokens());
        assert!((config.temperature - 0.9).abs() < f32::EPSILON);
        assert!(!config.enabled);
    }
}
