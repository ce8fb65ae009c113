//! Correction service clients.
//!
//! This module provides:
//! * [`LlmCorrector`] — async trait implemented by all provider backends.
//! * [`ApiCorrector`] — OpenAI-compatible chat-completions client (OpenAI,
//!   Gemini).
//! * [`AnthropicCorrector`] — Anthropic Messages API client.
//! * [`PromptBuilder`] — builds the proofreading prompt.
//! * [`output_budget`] — output token allowance derived from input length.
//! * [`LlmError`] — error variants for correction requests.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use spellfix_hotkey::config::AppConfig;
//! use spellfix_hotkey::llm::{build_corrector, output_budget};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let corrector = build_corrector(&config.llm, "sk-...".into());
//!
//!     let text = "Helo wrold, this is a tset.";
//!     let budget = output_budget(text, config.llm.budget_multiplier, config.llm.min_output_tokens);
//!     let corrected = corrector.correct(text, budget).await.unwrap();
//!     println!("{corrected}");
//! }
//! ```

pub mod anthropic;
pub mod corrector;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_server;

use std::sync::Arc;

use crate::config::{LlmConfig, LlmProvider};

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use anthropic::AnthropicCorrector;
pub use corrector::{output_budget, ApiCorrector, LlmCorrector, LlmError};
pub use prompt::PromptBuilder;

/// Instantiate the corrector for `config.provider`.
pub fn build_corrector(config: &LlmConfig, api_key: String) -> Arc<dyn LlmCorrector> {
    match config.provider {
        LlmProvider::OpenAi | LlmProvider::Gemini => {
            Arc::new(ApiCorrector::from_config(config, api_key))
        }
        LlmProvider::Anthropic => Arc::new(AnthropicCorrector::from_config(config, api_key)),
    }
}
