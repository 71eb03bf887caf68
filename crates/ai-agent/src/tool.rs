use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name, purpose and JSON input schema of a tool the model may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: Value,
}

impl ToolDescription {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// JSON handed back to the model as the tool's observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Value,
}

impl ToolOutput {
    pub fn new(content: Value) -> Self {
        Self { content }
    }
}

/// A tool call that could not produce an observation. The conversation
/// driver reports it to the model as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool invocation failed: {0}")]
    Invocation(String),
}

#[async_trait]
pub trait AgentTool: Send + Sync {
    fn description(&self) -> &ToolDescription;
    async fn invoke(&self, args: Value) -> Result<ToolOutput, ToolError>;
}
