//! Anthropic Messages API corrector.

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::llm::corrector::{check_status, LlmCorrector, LlmError};
use crate::llm::prompt::PromptBuilder;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Calls `POST {base_url}/messages` with `x-api-key` authentication.
pub struct AnthropicCorrector {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    prompt_builder: PromptBuilder,
}

impl AnthropicCorrector {
    /// Build from application config and a resolved key.
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

    fn request_body(&self, text: &str, max_tokens: u32) -> serde_json::Value {
        let (system_msg, user_msg) = self.prompt_builder.build_chat(text);

        serde_json::json!({
            "model":       self.model,
            "system":      system_msg,
            "messages": [
                { "role": "user", "content": user_msg }
            ],
            "temperature": self.temperature,
            "max_tokens":  max_tokens
        })
    }
}

/// Concatenate every `text` block of a Messages API reply.
fn extract_message_text(json: &serde_json::Value) -> Result<String, LlmError> {
    let blocks = json["content"]
        .as_array()
        .ok_or_else(|| LlmError::Parse("missing `content` array".into()))?;

    let text: String = blocks
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl LlmCorrector for AnthropicCorrector {
    async fn correct(&self, text: &str, max_tokens: u32) -> Result<String, LlmError> {
        let url = format!("{}/messages", self.base_url);
        let body = self.request_body(text, max_tokens);

        log::debug!("llm: POST {url} (max_tokens={max_tokens})");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        extract_message_text(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use crate::llm::test_server::{serve_once, Reply};

    fn corrector() -> AnthropicCorrector {
        let config = LlmConfig {
            provider: LlmProvider::Anthropic,
            ..LlmConfig::default()
        };
        AnthropicCorrector::from_config(&config, "sk-ant-test".into())
    }

    #[test]
    fn system_prompt_is_top_level() {
        let body = corrector().request_body("Helo", 16);

        assert!(body["system"].as_str().unwrap().contains("spelling"));
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 16);
        assert_eq!(body["model"], "claude-3-5-haiku-latest");
    }

    #[test]
    fn joins_text_blocks_and_skips_others() {
        let json = serde_json::json!({
            "content": [
                { "type": "text", "text": "Hello " },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "world.\n" }
            ]
        });
        assert_eq!(extract_message_text(&json).unwrap(), "Hello world.");
    }

    #[test]
    fn missing_content_is_parse_error() {
        let json = serde_json::json!({ "type": "error" });
        assert!(matches!(extract_message_text(&json), Err(LlmError::Parse(_))));
    }

    async fn served(reply: Reply) -> AnthropicCorrector {
        let config = LlmConfig {
            provider: LlmProvider::Anthropic,
            base_url: Some(serve_once(reply).await),
            ..LlmConfig::default()
        };
        AnthropicCorrector::from_config(&config, "sk-ant-test".into())
    }

    #[tokio::test]
    async fn text_reply_is_returned() {
        let corrector = served(Reply::Respond {
            status: "200 OK",
            body: r#"{"type":"message","content":[{"type":"text","text":"Hello there."}]}"#,
        })
        .await;

        assert_eq!(corrector.correct("Helo there.", 16).await.unwrap(), "Hello there.");
    }

    #[tokio::test]
    async fn bad_key_is_api_error() {
        let corrector = served(Reply::Respond {
            status: "401 Unauthorized",
            body: r#"{"type":"error","error":{"type":"authentication_error"}}"#,
        })
        .await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Api { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn overloaded_is_api_error() {
        let corrector = served(Reply::Respond {
            status: "529 Overloaded",
            body: r#"{"type":"error","error":{"type":"overloaded_error"}}"#,
        })
        .await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Api { status: 529, .. })
        ));
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let corrector = served(Reply::Respond {
            status: "200 OK",
            body: "not json",
        })
        .await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn dropped_connection_is_request_error() {
        let corrector = served(Reply::Hangup).await;

        assert!(matches!(
            corrector.correct("Helo", 16).await,
            Err(LlmError::Request(_))
        ));
    }

    #[test]
    fn no_text_blocks_is_empty_response() {
        let json = serde_json::json!({ "content": [] });
        assert!(matches!(
            extract_message_text(&json),
            Err(LlmError::EmptyResponse)
        ));
    }
}
