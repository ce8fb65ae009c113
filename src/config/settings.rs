//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a hand-written `settings.toml`
//! only needs the keys the user wants to change.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// LlmProvider
// ---------------------------------------------------------------------------

/// Selects which remote correction service is called.
///
/// | Variant   | Wire format                     | Key variable        |
/// |-----------|---------------------------------|---------------------|
/// | OpenAi    | `/chat/completions`             | `OPENAI_API_KEY`    |
/// | Gemini    | OpenAI-compatible endpoint      | `GEMINI_API_KEY`    |
/// | Anthropic | Messages API (`/messages`)      | `ANTHROPIC_API_KEY` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmProvider {
    /// OpenAI, or any service speaking the OpenAI chat-completions format.
    OpenAi,
    /// Google Gemini through its OpenAI-compatible endpoint.
    Gemini,
    /// Anthropic Claude through the native Messages API.
    Anthropic,
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::OpenAi
    }
}

impl LlmProvider {
    /// Versioned API root used when `LlmConfig::base_url` is not set.
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            LlmProvider::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Model used when `LlmConfig::model` is not set.
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Gemini => "gemini-2.0-flash",
            LlmProvider::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    /// Environment variable consulted for the API key.
    pub fn default_api_key_env(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Where a user can create a key; shown in the startup guidance.
    pub fn key_console_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://platform.openai.com/api-keys",
            LlmProvider::Gemini => "https://aistudio.google.com/app/apikey",
            LlmProvider::Anthropic => "https://console.anthropic.com/settings/keys",
        }
    }

    /// Human-readable provider name for log lines.
    pub fn label(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OpenAI",
            LlmProvider::Gemini => "Gemini",
            LlmProvider::Anthropic => "Anthropic",
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the correction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to use.
    pub provider: LlmProvider,
    /// API root override (e.g. a proxy).  `None` uses the provider default.
    pub base_url: Option<String>,
    /// API key stored in the settings file.  The environment variable wins
    /// when both are present.
    pub api_key: Option<String>,
    /// Environment variable holding the key.  `None` uses the provider
    /// default (e.g. `OPENAI_API_KEY`).
    pub api_key_env: Option<String>,
    /// Model identifier.  `None` uses the provider default.
    pub model: Option<String>,
    /// Sampling temperature.  Kept low so the model does not rephrase.
    pub temperature: f32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
    /// Output tokens allowed per input word.
    pub budget_multiplier: u32,
    /// Lower bound on the output token budget for very short selections.
    pub min_output_tokens: u32,
    /// Prompt language as an ISO-639-1 code (`"en"`, `"pl"`).
    pub language: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            api_key: None,
            api_key_env: None,
            model: None,
            temperature: 0.1,
            timeout_secs: 30,
            budget_multiplier: 2,
            min_output_tokens: 16,
            language: "en".into(),
        }
    }
}

impl LlmConfig {
    /// API root with any trailing slash removed.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Configured model, or the provider default.
    pub fn effective_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Name of the environment variable that holds the API key.
    pub fn effective_api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_key_env())
    }

    /// Resolve the API key: the environment variable first, then the
    /// settings file.  Blank values count as missing.
    ///
    /// `env` is injected so callers (and tests) control the lookup.
    pub fn resolve_api_key<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        env(self.effective_api_key_env())
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey bindings, written as `"Mod+Mod+Key"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Chord that corrects the current selection.
    pub correct_key: String,
    /// Chord that shuts the program down.
    pub exit_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            correct_key: "Ctrl+Q".into(),
            exit_key: "Ctrl+Shift+Q".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionConfig
// ---------------------------------------------------------------------------

/// Timing and display settings for selection capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Milliseconds to wait after the simulated copy before reading the
    /// clipboard.  Raise this on slow systems.
    pub copy_delay_ms: u64,
    /// Number of characters of the captured text shown in the log.
    pub preview_chars: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            copy_delay_ms: 100,
            preview_chars: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use spellfix_hotkey::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Correction service settings.
    pub llm: LlmConfig,
    /// Global hotkey bindings.
    pub hotkey: HotkeyConfig,
    /// Selection capture settings.
    pub selection: SelectionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
