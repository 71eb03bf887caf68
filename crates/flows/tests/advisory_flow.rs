use std::collections::VecDeque;
use std::sync::Arc;

use ai_agent::{LanguageModelClient, LanguageModelResponse, ModelOptions};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use flows::{AdvisoryFlow, DEFAULT_LOCATION};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use url::Url;
use weather::{
    FailureKind, TransportError, TransportResponse, WeatherFetcher, WeatherResult,
    WeatherTransport,
};

struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModelClient for ScriptedModel {
    async fn complete(&self, prompt: &str, _options: &ModelOptions) -> Result<LanguageModelResponse> {
        self.prompts.lock().await.push(prompt.to_string());
        let next = self
            .responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| anyhow!("scripted model ran out of responses"))?;
        Ok(LanguageModelResponse::new(next))
    }
}

struct MockTransport {
    body: Value,
    requests: std::sync::Mutex<Vec<Url>>,
}

impl MockTransport {
    fn new(body: Value) -> Arc<Self> {
        Arc::new(Self {
            body,
            requests: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Url> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WeatherTransport for MockTransport {
    async fn get(&self, url: &Url) -> std::result::Result<TransportResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.clone());
        }
        Ok(TransportResponse {
            status: 200,
            body: serde_json::to_vec(&self.body).map_err(|e| TransportError::Other(e.to_string()))?,
        })
    }
}

fn weather_call(location: &str) -> String {
    json!({
        "type": "tool",
        "thought": "I need the current conditions first",
        "name": "get_current_weather",
        "args": { "location": location }
    })
    .to_string()
}

fn fetcher(transport: Arc<MockTransport>, key: Option<&str>) -> Result<WeatherFetcher> {
    Ok(WeatherFetcher::builder()
        .maybe_api_key(key.map(str::to_string))
        .transport(transport)
        .build()?)
}

#[tokio::test]
async fn advice_follows_a_successful_lookup() -> Result<()> {
    let body = json!({
        "weather": [{ "main": "Rain", "description": "light rain" }],
        "main": { "temp": 11.2, "feels_like": 9.8, "humidity": 87 },
        "wind": { "speed": 6.1 },
        "name": "Washington",
        "cod": 200
    });
    let transport = MockTransport::new(body.clone());
    let model = ScriptedModel::new(vec![
        weather_call(DEFAULT_LOCATION),
        "Light rain and 11°C. Wear a waterproof jacket and take an umbrella.\nTERMINATE".to_string(),
    ]);
    let flow = AdvisoryFlow::new(model.clone(), fetcher(transport.clone(), Some("w-key"))?);

    let report = flow.run(DEFAULT_LOCATION).await?;

    assert!(!report.halted);
    assert_eq!(
        report.advice.as_deref(),
        Some("Light rain and 11°C. Wear a waterproof jacket and take an umbrella.")
    );
    assert_eq!(
        report.weather.as_ref().map(WeatherResult::to_tool_payload),
        Some(body)
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let query: Vec<(String, String)> = requests[0].query_pairs().into_owned().collect();
    assert!(query.contains(&("q".to_string(), DEFAULT_LOCATION.to_string())));
    assert!(query.contains(&("units".to_string(), "metric".to_string())));

    let prompts = model.prompts.lock().await;
    assert!(prompts[0].contains("Please get the current weather for Washington DC, USA."));
    assert!(prompts[1].contains("light rain"));
    Ok(())
}

#[tokio::test]
async fn missing_credential_is_explained_not_invented() -> Result<()> {
    let transport = MockTransport::new(json!({ "cod": 200 }));
    // The assistant keeps asking for the tool; the turn bound stops it.
    let model = ScriptedModel::new(vec![weather_call("Oslo"), weather_call("Oslo, Norway")]);
    let flow = AdvisoryFlow::new(model, fetcher(transport.clone(), None)?);

    let report = flow.run("Oslo").await?;

    assert!(report.halted);
    assert!(transport.requests().is_empty());
    assert_eq!(
        report.weather.as_ref().and_then(WeatherResult::failure_kind),
        Some(FailureKind::CredentialMissing)
    );
    let advice = report.advice.unwrap_or_default();
    assert!(advice.contains("couldn't retrieve the current weather for Oslo"));
    assert!(advice.contains("credential not configured"));
    Ok(())
}

#[tokio::test]
async fn service_error_reaches_the_assistant_as_data() -> Result<()> {
    let transport = MockTransport::new(json!({ "cod": "404", "message": "city not found" }));
    let model = ScriptedModel::new(vec![
        weather_call("Atlantis"),
        json!({
            "type": "finish",
            "answer": "I couldn't retrieve the weather data: city not found."
        })
        .to_string(),
    ]);
    let flow = AdvisoryFlow::new(model.clone(), fetcher(transport, Some("w-key"))?);

    let report = flow.run("Atlantis").await?;

    assert!(!report.halted);
    assert_eq!(
        report.advice.as_deref(),
        Some("I couldn't retrieve the weather data: city not found.")
    );
    let prompts = model.prompts.lock().await;
    assert!(prompts[1].contains(r#""error":"city not found""#));
    assert!(prompts[1].contains(r#""cod":"404""#));
    Ok(())
}

#[tokio::test]
async fn zero_turn_bound_never_touches_the_service() -> Result<()> {
    let transport = MockTransport::new(json!({ "cod": 200 }));
    let model = ScriptedModel::new(vec![weather_call("Lima")]);
    let flow = AdvisoryFlow::new(model, fetcher(transport.clone(), Some("w-key"))?)
        .with_max_auto_replies(0);

    let report = flow.run("Lima").await?;

    assert!(report.halted);
    assert!(report.weather.is_none());
    assert!(report.advice.is_none());
    assert!(transport.requests().is_empty());
    Ok(())
}

fn sent_locations(transport: &MockTransport) -> Vec<String> {
    transport
        .requests()
        .iter()
        .filter_map(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn location_argument_is_forwarded_verbatim() -> Result<()> {
    for location in ["  Paris, France ", ""] {
        let transport = MockTransport::new(json!({ "cod": 200, "name": "Paris" }));
        let model = ScriptedModel::new(vec![
            weather_call(location),
            "Mild and clear. TERMINATE".to_string(),
        ]);
        let flow = AdvisoryFlow::new(model, fetcher(transport.clone(), Some("w-key"))?);

        let report = flow.run("Paris").await?;

        assert_eq!(sent_locations(&transport), vec![location.to_string()]);
        assert_eq!(report.advice.as_deref(), Some("Mild and clear."));
    }
    Ok(())
}

#[tokio::test]
async fn missing_location_argument_is_reported_to_the_assistant() -> Result<()> {
    let transport = MockTransport::new(json!({ "cod": 200 }));
    let model = ScriptedModel::new(vec![
        json!({ "type": "tool", "name": "get_current_weather", "args": {} }).to_string(),
        "I couldn't retrieve the weather data. TERMINATE".to_string(),
    ]);
    let flow = AdvisoryFlow::new(model.clone(), fetcher(transport.clone(), Some("w-key"))?);

    let report = flow.run("Paris").await?;

    assert!(transport.requests().is_empty());
    assert!(report.weather.is_none());
    assert_eq!(
        report.advice.as_deref(),
        Some("I couldn't retrieve the weather data.")
    );
    let prompts = model.prompts.lock().await;
    assert!(prompts[1].contains("missing required string argument `location`"));
    Ok(())
}
