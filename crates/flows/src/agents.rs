use std::sync::Arc;

use ai_agent::{LanguageModelClient, ModelOptions};
use anyhow::Result;
use tracing::debug;

/// A named assistant: its standing instructions and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub name: String,
    pub system_prompt: String,
    pub options: ModelOptions,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            options: ModelOptions::with_temperature(temperature),
        }
    }

    /// Turns a free-text mood into comma separated music keywords.
    pub fn mood_interpreter() -> Self {
        Self::new("mood_agent", MOOD_INTERPRETER_PROMPT.trim(), 0.2)
    }

    /// Turns mood keywords into YouTube links, one per line.
    pub fn song_finder() -> Self {
        Self::new("search_agent", SONG_FINDER_PROMPT.trim(), 0.2)
    }

    /// Fetches current weather through a tool and advises on clothing.
    pub fn weather_advisor() -> Self {
        Self::new("weather_assistant", WEATHER_ADVISOR_PROMPT.trim(), 0.7)
    }

    /// Options for a single completion, with this profile's instructions attached.
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            system_prompt: Some(self.system_prompt.clone()),
            ..self.options.clone()
        }
    }
}

/// A profile bound to the model client it talks through.
#[derive(Clone)]
pub struct Agent {
    profile: AgentProfile,
    model: Arc<dyn LanguageModelClient>,
}

impl Agent {
    pub fn new(profile: AgentProfile, model: Arc<dyn LanguageModelClient>) -> Self {
        Self { profile, model }
    }

    /// One completion for `message`; the reply is trimmed.
    pub async fn reply(&self, message: &str) -> Result<String> {
        debug!(agent = %self.profile.name, "requesting reply");
        let response = self
            .model
            .complete(message, &self.profile.model_options())
            .await?;
        Ok(response.text.trim().to_string())
    }
}

const MOOD_INTERPRETER_PROMPT: &str = r#"
You are a mood interpreter. Given a user's emotional state or mood, you generate a list of descriptive keywords
that can be used to search for music that matches that mood. Avoid generic responses. Output only keywords
separated by commas.
"#;

const SONG_FINDER_PROMPT: &str = r#"
You are a music recommendation assistant. Given a list of mood-related keywords, search the web and return
a list of direct YouTube links to popular songs that match those keywords. Ensure that each link is on a new line
and represents a real song on YouTube. Output only the links.
"#;

const WEATHER_ADVISOR_PROMPT: &str = r#"
You are a helpful weather advisor.
1. Your primary goal is to get the current weather for the user's specified location using the available get_current_weather function.
2. Once you have the weather data (in JSON format), analyze it carefully. Key factors are temperature, 'feels like' temperature, weather condition (rain, clouds, sun, etc.), wind speed, and humidity.
3. Based on your analysis, recommend appropriate clothing (e.g., t-shirt, sweater, jacket, coat, shorts, pants). Be specific (e.g., "light jacket", "warm coat").
4. Recommend necessary accessories (e.g., umbrella, sunglasses, hat, scarf, gloves).
5. If there are any potential hazards or notable conditions (e.g., strong wind, heavy rain, high UV index - though UV isn't in basic data), mention them as cautions.
6. Present the information clearly to the user. Start by stating the current weather conditions briefly before giving recommendations.
7. If the weather function returns an error, inform the user that you couldn't retrieve the weather data and state the error reason if available. Do not invent weather data.
8. Assume temperatures are in Celsius unless otherwise specified in the data. Wind speed is likely in meters/second.
"#;
