//! OpenAI-compatible chat-completions client.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::language_model::{
    LanguageModelClient, LanguageModelResponse, LanguageModelUsage, ModelOptions,
};

pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Clone)]
pub struct OpenAiChatClient {
    model: String,
    api_key: String,
    endpoint: String,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            endpoint: OPENAI_CHAT_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Point the client at an OpenAI-compatible gateway or proxy.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_payload(&self, prompt: &str, options: &ModelOptions) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = options.system_prompt.as_deref() {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        let mut payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
        });
        if let (Some(max_tokens), Some(map)) = (options.max_tokens, payload.as_object_mut()) {
            map.insert("max_tokens".to_string(), json!(max_tokens));
        }
        payload
    }
}

fn parse_reply(body: &Value) -> Result<LanguageModelResponse> {
    let message = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("chat completion response has no choices"))?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("chat completion choice has no text content"))?;

    Ok(LanguageModelResponse {
        text: text.trim().to_string(),
        usage: parse_usage(body),
    })
}

fn parse_usage(body: &Value) -> LanguageModelUsage {
    let Some(usage) = body.get("usage") else {
        return LanguageModelUsage::default();
    };
    let field = |name: &str| usage.get(name).and_then(Value::as_u64).map(|v| v as u32);
    LanguageModelUsage {
        prompt_tokens: field("prompt_tokens"),
        completion_tokens: field("completion_tokens"),
        total_tokens: field("total_tokens"),
    }
}

#[async_trait]
impl LanguageModelClient for OpenAiChatClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &ModelOptions,
    ) -> Result<LanguageModelResponse> {
        let payload = self.request_payload(prompt, options);
        debug!(model = %self.model, "sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("chat completion returned HTTP {status}: {body}"));
        }

        let body: Value = response
            .json()
            .await
            .context("chat completion response was not JSON")?;
        parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_places_system_prompt_before_user_prompt() {
        let client = OpenAiChatClient::new("gpt-test", "key");
        let options = ModelOptions {
            temperature: 0.2,
            max_tokens: None,
            system_prompt: Some("You are a mood interpreter.".into()),
        };

        let payload = client.request_payload("I feel great", &options);
        let messages = payload["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], json!("system"));
        assert_eq!(messages[1]["role"], json!("user"));
        assert_eq!(messages[1]["content"], json!("I feel great"));
        assert_eq!(payload["model"], json!("gpt-test"));
        assert!(payload.get("max_tokens").is_none());
    }

    #[test]
    fn payload_without_system_prompt_has_only_user_message() {
        let client = OpenAiChatClient::new("gpt-test", "key");
        let payload = client.request_payload("hello", &ModelOptions::default());
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
        assert_eq!(payload["max_tokens"], json!(512));
    }

    #[test]
    fn reply_text_and_usage_are_extracted() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  calm, acoustic \n" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
        });

        let reply = parse_reply(&body).unwrap();
        assert_eq!(reply.text, "calm, acoustic");
        assert_eq!(reply.usage.prompt_tokens, Some(12));
        assert_eq!(reply.usage.total_tokens, Some(16));
    }

    #[test]
    fn reply_without_choices_is_an_error() {
        let err = parse_reply(&json!({})).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn reply_with_null_content_is_an_error() {
        let body = json!({ "choices": [{ "message": { "content": null } }] });
        assert!(parse_reply(&body).is_err());
    }
}
