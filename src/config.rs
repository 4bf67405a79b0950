//! Configuration management for Study Buddy.
//!
//! Settings come from, in increasing priority: built-in defaults, a config
//! file (TOML, YAML or JSON, discovered with the prefer crate or given with
//! `--config`), environment variables (including a `.env` file), and CLI
//! flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::LlmConfig;
use crate::repository::DbContext;

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "study-buddy.db";

/// Default upload size limit (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. "eng" or "eng+deu".
    #[serde(default = "default_ocr_language")]
    pub language: String,
    /// Render resolution for OCR of PDF pages.
    #[serde(default = "default_ocr_dpi")]
    pub dpi: u32,
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_ocr_dpi() -> u32 {
    300
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_ocr_language(),
            dpi: default_ocr_dpi(),
        }
    }
}

impl OcrConfig {
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(lang) = std::env::var("OCR_LANGUAGE") {
            if !lang.trim().is_empty() {
                self.language = lang;
            }
        }
        self
    }
}

/// Quiz and flashcard generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Questions per generated quiz.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Flashcards per request when the client doesn't say.
    #[serde(default = "default_flashcard_count")]
    pub flashcard_count: usize,
}

fn default_question_count() -> usize {
    10
}

fn default_flashcard_count() -> usize {
    10
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            flashcard_count: default_flashcard_count(),
        }
    }
}

impl QuizConfig {
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = std::env::var("QUIZ_QUESTION_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.question_count = n;
        }
        self
    }
}

/// Runtime settings resolved from config, environment and CLI.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database URL (overrides data_dir/database filename if set).
    pub database_url: Option<String>,
    /// Directory for uploaded files.
    pub uploads_dir: PathBuf,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

impl Settings {
    /// Create settings rooted at a data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            uploads_dir: data_dir.join("uploads"),
            data_dir,
            database_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Get the database URL, falling back to a file in the data directory.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => self
                .data_dir
                .join(DEFAULT_DATABASE_FILENAME)
                .display()
                .to_string(),
        }
    }

    /// Ensure data directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.uploads_dir)?;
        Ok(())
    }

    /// Create a database context for these settings.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }
}

/// Default data directory (`~/.local/share/study-buddy` on Linux).
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("study-buddy")
}

/// Configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (relative paths resolve against the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database URL or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Upload directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_dir: Option<String>,
    /// Largest accepted upload in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover and load the config file, or fall back to defaults.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        match prefer::load("studybuddy").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("{}; using defaults", e);
                        Self::default_with_env()
                    }
                },
                None => Self::default_with_env(),
            },
            Err(_) => Self::default_with_env(),
        }
    }

    /// Defaults with environment overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Parse config contents by file extension.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply environment overrides to the sub-configs.
    ///
    /// Values parsed from a file are kept unless the environment says otherwise.
    fn with_env_overrides(mut self) -> Self {
        self.llm = self.llm.with_env_overrides();
        self.ocr = self.ocr.with_env_overrides();
        self.quiz = self.quiz.with_env_overrides();
        self
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
    }

    /// Resolve a path string relative to a base directory.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let path = PathBuf::from(path_str);
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    }

    /// Apply file-level settings onto runtime settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            *settings = Settings {
                database_url: settings.database_url.take(),
                max_upload_bytes: settings.max_upload_bytes,
                ..Settings::with_data_dir(self.resolve_path(data_dir, base_dir))
            };
        }
        if let Some(ref url) = self.database_url {
            settings.database_url = Some(url.clone());
        }
        if let Some(ref uploads) = self.uploads_dir {
            settings.uploads_dir = self.resolve_path(uploads, base_dir);
        }
        if let Some(max) = self.max_upload_bytes {
            settings.max_upload_bytes = max;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory (--data flag).
    pub data: Option<PathBuf>,
}

/// Load settings and config, applying file, env and CLI layers in order.
pub async fn load_settings_with_options(options: LoadOptions) -> anyhow::Result<(Settings, Config)> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(anyhow::Error::msg)?,
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    let cwd = std::env::current_dir()?;
    let base_dir = config.base_dir().unwrap_or_else(|| cwd.clone());
    config.apply_to_settings(&mut settings, &base_dir);

    if let Ok(dir) = std::env::var("STUDY_BUDDY_DATA_DIR") {
        settings = Settings {
            database_url: settings.database_url.take(),
            max_upload_bytes: settings.max_upload_bytes,
            ..Settings::with_data_dir(PathBuf::from(dir))
        };
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database_url = Some(url);
    }

    if let Some(data) = options.data {
        let data = if data.is_absolute() { data } else { cwd.join(data) };
        settings = Settings {
            database_url: None,
            max_upload_bytes: settings.max_upload_bytes,
            ..Settings::with_data_dir(data)
        };
    }

    Ok((settings, config))
}
