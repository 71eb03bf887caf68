use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling knobs passed along with every completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            max_tokens: Some(512),
            system_prompt: None,
        }
    }
}

impl ModelOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageModelUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageModelResponse {
    pub text: String,
    pub usage: LanguageModelUsage,
}

impl LanguageModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: LanguageModelUsage::default(),
        }
    }
}

#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    async fn complete(&self, prompt: &str, options: &ModelOptions)
        -> Result<LanguageModelResponse>;
}
