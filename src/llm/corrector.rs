//! Core `LlmCorrector` trait and the OpenAI-compatible `ApiCorrector`.
//!
//! `ApiCorrector` calls any `/chat/completions` endpoint that speaks the
//! OpenAI wire format: OpenAI itself and Gemini's OpenAI-compatible API.
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::prompt::PromptBuilder;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur during a correction request.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("correction request timed out")]
    Timeout,

    /// The service answered with a non-success status (bad key, quota, ...).
    #[error("service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse service response: {0}")]
    Parse(String),

    /// The service returned a response with no usable text content.
    #[error("service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// LlmCorrector trait
// ---------------------------------------------------------------------------

/// Async trait for remote spelling/grammar correction.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// behind `Arc<dyn LlmCorrector>`.
///
/// # Arguments
/// * `text`       – Selection snapshot to correct.
/// * `max_tokens` – Output budget, normally from [`output_budget`].
#[async_trait]
pub trait LlmCorrector: Send + Sync {
    async fn correct(&self, text: &str, max_tokens: u32) -> Result<String, LlmError>;
}

/// Output token budget for `text`: `multiplier` tokens per whitespace
/// separated word, never below `floor`.
///
/// ```
/// use spellfix_hotkey::llm::output_budget;
///
/// assert_eq!(output_budget("one two three", 2, 0), 6);
/// assert_eq!(output_budget("one", 2, 16), 16);
/// ```
pub fn output_budget(text: &str, multiplier: u32, floor: u32) -> u32 {
    let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
    words.saturating_mul(multiplier).max(floor)
}

/// Turn a non-success HTTP response into [`LlmError::Api`].
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::error!("llm: service error {status}: {body}");
    Err(LlmError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Pull `choices[0].message.content` out of a chat-completions reply.
pub(crate) fn extract_chat_content(json: &serde_json::Value) -> Result<String, LlmError> {
    let corrected = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(LlmError::EmptyResponse)?
        .trim()
        .to_string();

    if corrected.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(corrected)
}

// ---------------------------------------------------------------------------
// ApiCorrector
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/chat/completions` endpoint.
///
/// The API root (`base_url`) already carries the version segment, e.g.
/// `https://api.openai.com/v1`.
pub struct ApiCorrector {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    prompt_builder: PromptBuilder,
}

impl ApiCorrector {
    /// Build an `ApiCorrector` from application config and a resolved key.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &LlmConfig, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.effective_base_url(),
            model: config.effective_model(),
            api_key,
            temperature: config.temperature,
            prompt_builder: PromptBuilder::new(&config.language),
        }
    }

    /// Request body sent for `text`.
    fn request_body(&self, text: &str, max_tokens: u32) -> serde_json::Value {
        let (system_msg, user_msg) = self.prompt_builder.build_chat(text);

        serde_json::json!({
            "model":       self.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.temperature,
            "max_tokens":  max_tokens
        })
    }
}

#[async_trait]
impl LlmCorrector for ApiCorrector {
    async fn correct(&self, text: &str, max_tokens: u32) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(text, max_tokens);

        log::debug!("llm: POST {url} (max_tokens={max_tokens})");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        extract_chat_content(&json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use crate::llm::test_server::{serve_once, Reply};

    fn make_config(provider: LlmProvider) -> LlmConfig {
        LlmConfig {
            provider,
            ..LlmConfig::default()
        }
    }

    #[test]
    fn budget_is_twice_the_word_count() {
        assert_eq!(output_budget("Helo wrold, this is a tset.", 2, 0), 12);
        assert_eq!(output_budget("  spaced   out\nwords\t", 2, 0), 6);
    }

    #[test]
    fn budget_respects_floor() {
        assert_eq!(output_budget("", 2, 16), 16);
        assert_eq!(output_budget("short text", 2, 16), 16);
        assert_eq!(output_budget(&"word ".repeat(20), 2, 16), 40);
    }

    #[test]
    fn request_body_carries_budget_and_temperature() {
        let mut config = make_config(LlmProvider::OpenAi);
        config.temperature = 0.1;
        let corrector = ApiCorrector::from_config(&config, "sk-test".into());

        let body = corrector.request_body("Helo wrold", 12);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 12);
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .ends_with("Helo wrold"));
    }

    #[test]
    fn gemini_uses_openai_compatible_root() {
        let corrector = ApiCorrector::from_config(&make_config(LlmProvider::Gemini), "k".into());
        assert!(corrector.base_url.ends_with("/v1beta/openai"));
        assert_eq!(corrector.model, "gemini-2.0-flash");
    }

    #[test]
    fn extracts_and_trims_content() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Hello world.\n" } }]
        });
        assert_eq!(extract_chat_content(&json).unwrap(), "Hello world.");
    }

    #[test]
    fn missing_or_blank_content_is_empty_response() {
        let missing = serde_json::json!({ "choices": [] });
        assert!(matches!(
            extract_chat_content(&missing),
            Err(LlmError::EmptyResponse)
        ));

        let blank = serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        });
        assert!(matches!(
            extract_chat_content(&blank),
            Err(LlmError::EmptyResponse)
        ));
    }

    // -----------------------------------------------------------------------
    // Over the wire
    // -----------------------------------------------------------------------

    async fn corrector_for(reply: Reply) -> ApiCorrector {
        let mut config = make_config(LlmProvider::OpenAi);
        config.base_url = Some(serve_once(reply).await);
        config.timeout_secs = 1;
        ApiCorrector::from_config(&config, "sk-test".into())
    }

    #[tokio::test]
    async fn successful_reply_is_returned_trimmed() {
        let corrector = corrector_for(Reply::Respond {
            status: "200 OK",
            body: r#"{"choices":[{"message":{"role":"assistant","content":" Hello world.\n"}}]}"#,
        })
        .await;

        assert_eq!(corrector.correct("Helo wrold.", 16).await.unwrap(), "Hello world.");
    }

    #[tokio::test]
    async fn unauthorized_is_api_error_with_status() {
        let corrector = corrector_for(Reply::Respond {
            status: "401 Unauthorized",
            body: r#"{"error":{"message":"Incorrect API key provided"}}"#,
        })
        .await;

        match corrector.correct("Helo", 16).await {
            Err(LlmError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_parse_error() {
        let corrector = corrector_for(Reply::Respond {
            status: "200 OK",
            body: "<html>gateway</html>",
        })
        .await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn closed_connection_is_request_error() {
        let corrector = corrector_for(Reply::Hangup).await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Request(_))
        ));
    }

    #[tokio::test]
    async fn stalled_service_times_out() {
        let corrector = corrector_for(Reply::Stall).await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Timeout)
        ));
    }

    /// Verify that `ApiCorrector` is object-safe (usable as `dyn LlmCorrector`).
    #[test]
    fn corrector_is_object_safe() {
        let config = make_config(LlmProvider::OpenAi);
        let corrector: Box<dyn LlmCorrector> =
            Box::new(ApiCorrector::from_config(&config, "sk-test".into()));
        drop(corrector);
    }
}
