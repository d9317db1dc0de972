//! # fq-ai-openai
//!
//! OpenAI-compatible implementation of the `ChatModel` port. Handles both
//! stylist calls: the vision caption (image + text parts) and the plain
//! text selection call.

use std::time::Duration;

use async_trait::async_trait;
use fq_core::traits::{ChatMessage, ChatModel, MessagePart};
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Both stylist calls are bounded; a hanging upstream must not hang the
/// whole recommendation request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Override for self-hosted OpenAI-compatible endpoints.
    pub api_base: Option<String>,
    pub model: Option<String>,
}

pub struct OpenAiChat {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiChat {
    pub fn new(config: OpenAiConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { config, client })
    }
}

/// Renders a port-level message into the OpenAI wire shape. A single text
/// part collapses to the plain string form; anything carrying an image
/// uses the structured parts format.
fn render_message(msg: &ChatMessage) -> Value {
    match msg.parts.as_slice() {
        [MessagePart::Text(text)] => json!({ "role": msg.role, "content": text }),
        parts => {
            let content: Vec<Value> = parts
                .iter()
                .map(|part| match part {
                    MessagePart::Text(text) => json!({ "type": "text", "text": text }),
                    MessagePart::ImageUrl(url) => {
                        json!({ "type": "image_url", "image_url": { "url": url } })
                    }
                })
                .collect();
            json!({ "role": msg.role, "content": content })
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn chat(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        let api_base = self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let model = self.config.model.as_deref().unwrap_or(DEFAULT_MODEL);

        let payload = json!({
            "model": model,
            "messages": messages.iter().map(render_message).collect::<Vec<_>>(),
            "temperature": 0.3,
        });

        log::debug!("chat completion call: {api_base}/chat/completions model={model}");
        let response = self
            .client
            .post(format!("{api_base}/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let data = response.json::<Value>().await?;
        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("chat response missing message content"))?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_message_collapses_to_string_content() {
        let msg = ChatMessage::text("system", "You are a virtual stylist.");
        let rendered = render_message(&msg);
        assert_eq!(rendered["role"], "system");
        assert_eq!(rendered["content"], "You are a virtual stylist.");
    }

    #[test]
    fn image_message_uses_the_parts_format() {
        let msg = ChatMessage::with_image("user", "data:image/png;base64,AAAA", "Describe this.");
        let rendered = render_message(&msg);
        let parts = rendered["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "image_url");
        assert_eq!(parts[0]["image_url"]["url"], "data:image/png;base64,AAAA");
        assert_eq!(parts[1]["type"], "text");
        assert_eq!(parts[1]["text"], "Describe this.");
    }
}
