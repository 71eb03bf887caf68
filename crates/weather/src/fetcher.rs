use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, WeatherError};
use crate::result::{ServiceCode, WeatherQuery, WeatherResult, UNKNOWN_SERVICE_ERROR};
use crate::transport::{ReqwestTransport, WeatherTransport};

/// OpenWeatherMap current-conditions endpoint.
pub const OPENWEATHER_CURRENT_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Value of the embedded `cod` field that marks a successful lookup.
pub const SERVICE_OK: i64 = 200;

/// Builder for [`WeatherFetcher`].
#[derive(Default)]
pub struct WeatherFetcherBuilder {
    base: Option<Url>,
    api_key: Option<String>,
    transport: Option<Arc<dyn WeatherTransport>>,
}

impl WeatherFetcherBuilder {
    /// Set the service endpoint the query parameters are appended to.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base = Some(url);
        self
    }

    /// Parse and set the service endpoint.
    pub fn base_url_str(mut self, url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|err| WeatherError::InvalidEndpoint(format!("{url}: {err}")))?;
        self.base = Some(parsed);
        Ok(self)
    }

    /// Set the service credential. A blank key counts as unconfigured.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the credential from an optional source such as the environment.
    pub fn maybe_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn WeatherTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<WeatherFetcher> {
        let base = match self.base {
            Some(base) => base,
            None => Url::parse(OPENWEATHER_CURRENT_URL)
                .map_err(|err| WeatherError::InvalidEndpoint(err.to_string()))?,
        };
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        Ok(WeatherFetcher {
            base,
            api_key: self.api_key,
            transport,
        })
    }
}

/// Looks up current conditions for a location. Every failure mode is
/// returned as [`WeatherResult::Failure`]; `fetch` itself cannot fail.
#[derive(Clone)]
pub struct WeatherFetcher {
    base: Url,
    api_key: Option<String>,
    transport: Arc<dyn WeatherTransport>,
}

impl WeatherFetcher {
    /// Create a new builder.
    pub fn builder() -> WeatherFetcherBuilder {
        WeatherFetcherBuilder::default()
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    fn request_url(&self, api_key: &str, query: &WeatherQuery) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("appid", api_key)
            .append_pair("q", query.location())
            .append_pair("units", "metric");
        url
    }

    pub async fn fetch(&self, query: &WeatherQuery) -> WeatherResult {
        info!(location = %query.location(), "fetching current weather");

        let Some(api_key) = self.credential() else {
            warn!("weather service credential is not configured");
            return WeatherResult::credential_missing();
        };

        let url = self.request_url(api_key, query);
        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "weather service request failed");
                return WeatherResult::transport_failure(&err);
            }
        };
        debug!(
            http_status = response.status,
            bytes = response.body.len(),
            "weather service answered"
        );

        classify_body(&response.body)
    }
}

/// Map a response body onto a [`WeatherResult`] using the embedded `cod` sentinel.
pub(crate) fn classify_body(body: &[u8]) -> WeatherResult {
    let payload = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(kind = json_kind(&other), "weather response is not a JSON object");
            return WeatherResult::parse_failure();
        }
        Err(err) => {
            warn!(error = %err, "weather response could not be decoded");
            return WeatherResult::parse_failure();
        }
    };

    let code = payload.get("cod").and_then(ServiceCode::from_value);
    info!(cod = ?code, "weather service status");

    if code == Some(ServiceCode::Number(SERVICE_OK)) {
        return WeatherResult::Success {
            raw_payload: payload,
        };
    }

    let message = match payload.get("message") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => UNKNOWN_SERVICE_ERROR.to_string(),
        Some(other) => other.to_string(),
    };
    warn!(cod = ?code, %message, "weather service reported an error");
    WeatherResult::service_error(message, code)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
