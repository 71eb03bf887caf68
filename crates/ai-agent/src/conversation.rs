use std::sync::Arc;

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::language_model::{LanguageModelClient, ModelOptions};
use crate::tool::AgentTool;

/// Literal marker a reply ends with when the assistant considers the exchange over.
pub const TERMINATION_MARKER: &str = "TERMINATE";

/// True when `content`, ignoring trailing whitespace, ends with [`TERMINATION_MARKER`].
pub fn is_termination_message(content: &str) -> bool {
    content.trim_end().ends_with(TERMINATION_MARKER)
}

fn strip_termination_marker(content: &str) -> String {
    let trimmed = content.trim_end();
    match trimmed.strip_suffix(TERMINATION_MARKER) {
        Some(rest) => rest.trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub system_prompt: String,
    /// Tool executions answered on the model's behalf before the exchange is cut off.
    pub max_auto_replies: usize,
    pub model_options: ModelOptions,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant. Use the listed tools when you need facts you do not have.".to_string(),
            max_auto_replies: crate::DEFAULT_MAX_AUTO_REPLIES,
            model_options: ModelOptions::with_temperature(0.4),
        }
    }
}

/// One tool execution and what was fed back to the model. Unknown tools and
/// tool errors come back as `{"error": ...}` observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
    pub observation: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConversationStep {
    Tool(ToolInvocation),
    Finish { answer: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ConversationEvent {
    ModelResponse { raw: String },
    ToolCall { name: String, args: Value },
    ToolResult { name: String, result: Value },
    ToolFailed { name: String, error: String },
    TurnLimitReached { requested_tool: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResult {
    pub final_answer: Option<String>,
    pub steps: Vec<ConversationStep>,
    pub events: Vec<ConversationEvent>,
    pub auto_replies: usize,
    /// Set when the turn bound stopped the exchange before a final answer.
    pub halted: bool,
}

/// Drives an assistant model through tool calls until it answers or the
/// auto-reply bound is exhausted.
pub struct ConversationDriver {
    model: Arc<dyn LanguageModelClient>,
    config: ConversationConfig,
    tools: IndexMap<String, Arc<dyn AgentTool>>,
}

impl ConversationDriver {
    pub fn new(model: Arc<dyn LanguageModelClient>, config: ConversationConfig) -> Self {
        Self {
            model,
            config,
            tools: IndexMap::new(),
        }
    }

    pub fn register_tool(&mut self, tool: Arc<dyn AgentTool>) {
        self.tools.insert(tool.description().name.clone(), tool);
    }

    fn build_prompt(&self, task: &str, exchanges: &[ToolInvocation]) -> String {
        let mut prompt = String::from("Available tools:\n");
        for tool in self.tools.values() {
            let description = tool.description();
            prompt.push_str(&format!(
                "- {} ({}) arguments: {}\n",
                description.name, description.description, description.input_schema
            ));
        }

        prompt.push_str("\nRequest:\n");
        prompt.push_str(task);
        prompt.push('\n');

        if !exchanges.is_empty() {
            prompt.push_str("\nTool results so far:\n");
            for exchange in exchanges {
                prompt.push_str(&format!(
                    "{}({}) -> {}\n",
                    exchange.name, exchange.arguments, exchange.observation
                ));
            }
        }

        prompt.push('\n');
        prompt.push_str(REPLY_FORMAT);
        prompt
    }

    async fn execute(&self, name: &str, args: Value) -> std::result::Result<Value, String> {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "model requested an unknown tool");
            return Err(format!("unknown tool `{name}`"));
        };
        match tool.invoke(args).await {
            Ok(output) => Ok(output.content),
            Err(err) => {
                warn!(tool = %name, error = %err, "tool call failed");
                Err(err.to_string())
            }
        }
    }

    pub async fn run(&self, task: &str) -> Result<ConversationResult> {
        let mut options = self.config.model_options.clone();
        options.system_prompt = Some(self.config.system_prompt.clone());

        let mut steps = Vec::new();
        let mut events = Vec::new();
        let mut exchanges: Vec<ToolInvocation> = Vec::new();
        let mut auto_replies = 0usize;

        loop {
            let prompt = self.build_prompt(task, &exchanges);
            let response = self.model.complete(&prompt, &options).await?;
            events.push(ConversationEvent::ModelResponse {
                raw: response.text.clone(),
            });

            let (name, args) = match interpret_reply(&response.text) {
                ModelDirective::Finish { answer } => {
                    steps.push(ConversationStep::Finish {
                        answer: answer.clone(),
                    });
                    return Ok(ConversationResult {
                        final_answer: Some(answer),
                        steps,
                        events,
                        auto_replies,
                        halted: false,
                    });
                }
                ModelDirective::Tool { name, args } => (name, args),
            };

            if auto_replies >= self.config.max_auto_replies {
                warn!(
                    tool = %name,
                    limit = self.config.max_auto_replies,
                    "auto-reply limit reached; ending conversation"
                );
                events.push(ConversationEvent::TurnLimitReached {
                    requested_tool: name,
                });
                return Ok(ConversationResult {
                    final_answer: None,
                    steps,
                    events,
                    auto_replies,
                    halted: true,
                });
            }

            auto_replies += 1;
            debug!(tool = %name, "executing tool call");
            events.push(ConversationEvent::ToolCall {
                name: name.clone(),
                args: args.clone(),
            });
            let observation = match self.execute(&name, args.clone()).await {
                Ok(result) => {
                    events.push(ConversationEvent::ToolResult {
                        name: name.clone(),
                        result: result.clone(),
                    });
                    result
                }
                Err(error) => {
                    events.push(ConversationEvent::ToolFailed {
                        name: name.clone(),
                        error: error.clone(),
                    });
                    json!({ "error": error })
                }
            };

            let exchange = ToolInvocation {
                name,
                arguments: args,
                observation,
            };
            steps.push(ConversationStep::Tool(exchange.clone()));
            exchanges.push(exchange);
        }
    }
}

/// A reply ending in the termination marker, or one that is not a JSON
/// directive, is the final answer.
fn interpret_reply(raw: &str) -> ModelDirective {
    let reply = raw.trim();
    if is_termination_message(reply) {
        return ModelDirective::Finish {
            answer: strip_termination_marker(reply),
        };
    }
    match serde_json::from_str::<ModelDirective>(strip_code_fence(reply)) {
        Ok(ModelDirective::Finish { answer }) => ModelDirective::Finish {
            answer: strip_termination_marker(&answer),
        },
        Ok(directive) => directive,
        Err(err) => {
            debug!("reply is not a JSON directive ({err}); treating it as the final answer");
            ModelDirective::Finish {
                answer: reply.to_string(),
            }
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ModelDirective {
    Tool {
        name: String,
        #[serde(default)]
        args: Value,
    },
    Finish {
        answer: String,
    },
}

const REPLY_FORMAT: &str = "Reply with one JSON object and nothing else: \
{\"type\":\"tool\",\"name\":\"<tool name>\",\"args\":{...}} to call a tool, or \
{\"type\":\"finish\",\"answer\":\"<text for the user>\"} when you can answer. \
A plain-text reply ending in TERMINATE also ends the conversation.";
