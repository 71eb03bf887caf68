use std::sync::Arc;

use ai_agent::LanguageModelClient;
use anyhow::Result;
use playback::{filter_links, TabOpener, TabOutcome};
use serde::Serialize;
use tracing::info;

use crate::agents::{Agent, AgentProfile};

#[derive(Debug, Clone, Serialize)]
pub struct MoodFlowReport {
    pub keywords: String,
    pub links: Vec<String>,
    pub outcomes: Vec<TabOutcome>,
}

/// Mood → keywords → song links → browser tabs.
pub struct MoodFlow {
    interpreter: Agent,
    finder: Agent,
    opener: TabOpener,
}

impl MoodFlow {
    pub fn new(model: Arc<dyn LanguageModelClient>, opener: TabOpener) -> Self {
        Self {
            interpreter: Agent::new(AgentProfile::mood_interpreter(), model.clone()),
            finder: Agent::new(AgentProfile::song_finder(), model),
            opener,
        }
    }

    pub async fn run(&self, mood: &str) -> Result<MoodFlowReport> {
        let keywords = self.interpreter.reply(mood).await?;
        println!("[Mood Keywords] {keywords}");

        let reply = self
            .finder
            .reply(&format!("Suggest songs for mood: {keywords}"))
            .await?;
        let links = filter_links(&reply);
        println!("[YouTube Links] {links:?}");
        info!(count = links.len(), "song links selected");

        let outcomes = self.opener.open_all(&links).await;
        Ok(MoodFlowReport {
            keywords,
            links,
            outcomes,
        })
    }
}
