use std::env;
use std::sync::Arc;
use std::time::Duration;

use ai_agent::{LanguageModelClient, OpenAiChatClient, DEFAULT_OPENAI_MODEL, OPENAI_CHAT_URL};
use thiserror::Error;
use url::Url;
use weather::{WeatherFetcher, OPENWEATHER_CURRENT_URL};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const WEATHER_API_URL: &str = "WEATHER_API_URL";
pub const TAB_PACING_MS: &str = "TAB_PACING_MS";

pub const DEFAULT_TAB_PACING_MS: u64 = 1_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must be a whole number of milliseconds, got `{value}`")]
    InvalidPacing { var: &'static str, value: String },
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("weather client setup failed: {0}")]
    Weather(#[from] weather::WeatherError),
}

/// Everything the flows read from the process environment.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Url,
    pub weather_api_key: Option<String>,
    pub weather_api_url: Url,
    pub tab_pacing: Duration,
}

impl FlowSettings {
    /// Read settings from the process environment. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`; unset and empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let openai_base_url = parse_url(
            OPENAI_BASE_URL,
            read(OPENAI_BASE_URL).unwrap_or_else(|| OPENAI_CHAT_URL.to_string()),
        )?;
        let weather_api_url = parse_url(
            WEATHER_API_URL,
            read(WEATHER_API_URL).unwrap_or_else(|| OPENWEATHER_CURRENT_URL.to_string()),
        )?;
        let tab_pacing = match read(TAB_PACING_MS) {
            Some(value) => {
                let millis = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidPacing {
                        var: TAB_PACING_MS,
                        value,
                    })?;
                Duration::from_millis(millis)
            }
            None => Duration::from_millis(DEFAULT_TAB_PACING_MS),
        };

        let settings = Self {
            openai_api_key: read(OPENAI_API_KEY),
            openai_model: read(OPENAI_MODEL)
                .map(|model| model.trim().to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url,
            weather_api_key: read(WEATHER_API_KEY),
            weather_api_url,
            tab_pacing,
        };
        Ok(settings)
    }

    /// OpenAI-compatible client for the configured model. Fails when no key is set.
    pub fn language_model(&self) -> Result<Arc<dyn LanguageModelClient>, ConfigError> {
        let api_key = self
            .openai_api_key
            .clone()
            .ok_or(ConfigError::Missing(OPENAI_API_KEY))?;
        let client = OpenAiChatClient::new(self.openai_model.clone(), api_key)
            .with_endpoint(self.openai_base_url.as_str());
        Ok(Arc::new(client))
    }

    /// Weather client; a missing key is left for the fetcher to report as data.
    pub fn weather_fetcher(&self) -> Result<WeatherFetcher, ConfigError> {
        Ok(WeatherFetcher::builder()
            .base_url(self.weather_api_url.clone())
            .maybe_api_key(self.weather_api_key.clone())
            .build()?)
    }
}

fn parse_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl { var, value, source })
}
