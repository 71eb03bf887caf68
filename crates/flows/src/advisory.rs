use std::sync::{Arc, Mutex};

use ai_agent::{
    AgentTool, ConversationConfig, ConversationDriver, LanguageModelClient, ToolDescription,
    ToolError, ToolOutput, DEFAULT_MAX_AUTO_REPLIES,
};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};
use weather::{WeatherFetcher, WeatherQuery, WeatherResult};

use crate::agents::AgentProfile;

pub const DEFAULT_LOCATION: &str = "Washington DC, USA";
pub const WEATHER_TOOL_NAME: &str = "get_current_weather";

/// Exposes a [`WeatherFetcher`] to the assistant as `get_current_weather`.
/// Failed lookups are returned to the model as `{"error": ...}` payloads.
pub struct WeatherTool {
    description: ToolDescription,
    fetcher: WeatherFetcher,
    last: Mutex<Option<WeatherResult>>,
}

impl WeatherTool {
    pub fn new(fetcher: WeatherFetcher) -> Self {
        Self {
            description: ToolDescription::new(
                WEATHER_TOOL_NAME,
                "Fetch the current weather for a given location.",
                json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "The city and state/country (e.g., 'College Park, MD', 'Paris, France')."
                        }
                    },
                    "required": ["location"]
                }),
            ),
            fetcher,
            last: Mutex::new(None),
        }
    }

    /// Result of the most recent lookup, if the tool has been called.
    pub fn last_result(&self) -> Option<WeatherResult> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl AgentTool for WeatherTool {
    fn description(&self) -> &ToolDescription {
        &self.description
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput, ToolError> {
        // The location goes to the service exactly as the model wrote it.
        let Some(location) = args.get("location").and_then(Value::as_str) else {
            warn!(%args, "weather tool called without a string `location`");
            return Ok(ToolOutput::new(json!({
                "error": "missing required string argument `location`"
            })));
        };

        let result = self.fetcher.fetch(&WeatherQuery::new(location)).await;
        let output = ToolOutput::new(result.to_tool_payload());
        if let Ok(mut last) = self.last.lock() {
            *last = Some(result);
        }
        Ok(output)
    }
}

#[derive(Debug, Clone)]
pub struct AdvisoryReport {
    pub location: String,
    /// Lookup the assistant triggered, if any.
    pub weather: Option<WeatherResult>,
    pub advice: Option<String>,
    pub halted: bool,
}

/// Location → weather lookup through the assistant → clothing advice.
pub struct AdvisoryFlow {
    model: Arc<dyn LanguageModelClient>,
    fetcher: WeatherFetcher,
    profile: AgentProfile,
    max_auto_replies: usize,
}

impl AdvisoryFlow {
    pub fn new(model: Arc<dyn LanguageModelClient>, fetcher: WeatherFetcher) -> Self {
        Self {
            model,
            fetcher,
            profile: AgentProfile::weather_advisor(),
            max_auto_replies: DEFAULT_MAX_AUTO_REPLIES,
        }
    }

    pub fn with_max_auto_replies(mut self, max_auto_replies: usize) -> Self {
        self.max_auto_replies = max_auto_replies;
        self
    }

    pub async fn run(&self, location: &str) -> Result<AdvisoryReport> {
        let tool = Arc::new(WeatherTool::new(self.fetcher.clone()));
        let config = ConversationConfig {
            system_prompt: self.profile.system_prompt.clone(),
            max_auto_replies: self.max_auto_replies,
            model_options: self.profile.options.clone(),
        };
        let mut driver = ConversationDriver::new(self.model.clone(), config);
        driver.register_tool(tool.clone());

        let outcome = driver.run(&advisory_request(location)).await?;
        let weather = tool.last_result();

        let advice = match (outcome.final_answer, &weather) {
            (Some(answer), _) => Some(answer),
            (None, Some(WeatherResult::Failure { reason, .. })) => {
                warn!(%reason, "conversation ended without advice after a failed lookup");
                Some(failure_explanation(location, reason))
            }
            (None, _) => None,
        };
        info!(
            %location,
            halted = outcome.halted,
            auto_replies = outcome.auto_replies,
            "advisory conversation finished"
        );

        Ok(AdvisoryReport {
            location: location.to_string(),
            weather,
            advice,
            halted: outcome.halted,
        })
    }
}

/// Opening message sent on the user's behalf.
pub fn advisory_request(location: &str) -> String {
    format!(
        "Please get the current weather for {location}.\n\
         Based on the weather conditions, tell me what clothes I should wear today and if I need any accessories like an umbrella or sunglasses.\n\
         Also, mention any cautions I should be aware of."
    )
}

/// Stand-in answer when the lookup failed and the assistant never replied.
pub fn failure_explanation(location: &str, reason: &str) -> String {
    format!(
        "I couldn't retrieve the current weather for {location}, so I can't recommend clothing or accessories right now. Reason: {reason}"
    )
}
