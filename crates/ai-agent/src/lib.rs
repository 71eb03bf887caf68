//! Language-model primitives shared by the agent flows.
//! The crate exposes the completion client boundary, an OpenAI-compatible
//! client, the tool trait agents call into, and a conversation driver that
//! bounds how many tool round trips a model may trigger.

pub mod conversation;
pub mod language_model;
pub mod openai;
pub mod tool;

pub use conversation::{
    is_termination_message, ConversationConfig, ConversationDriver, ConversationEvent,
    ConversationResult, ConversationStep, ToolInvocation, TERMINATION_MARKER,
};
pub use language_model::{
    LanguageModelClient, LanguageModelResponse, LanguageModelUsage, ModelOptions,
};
pub use openai::{OpenAiChatClient, DEFAULT_OPENAI_MODEL, OPENAI_CHAT_URL};
pub use tool::{AgentTool, ToolDescription, ToolError, ToolOutput};

pub const DEFAULT_MAX_AUTO_REPLIES: usize = 1;
