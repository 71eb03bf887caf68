use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{FailureKind, TransportError};

pub const CREDENTIAL_NOT_CONFIGURED: &str = "credential not configured";
pub const RESPONSE_PARSE_FAILURE: &str = "response parse failure";
pub const UNKNOWN_SERVICE_ERROR: &str = "Unknown error";

/// A single current-conditions lookup. The location is passed to the service
/// exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeatherQuery {
    location: String,
}

impl WeatherQuery {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// The service's embedded `cod` value, kept in whichever JSON type the service used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceCode {
    Number(i64),
    Text(String),
}

impl ServiceCode {
    /// Read a `cod` value from a decoded body. `null` counts as absent and
    /// booleans or containers are kept as their JSON text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(ServiceCode::Text(text.clone())),
            Value::Number(number) => Some(match (number.as_i64(), number.as_f64()) {
                (Some(code), _) => ServiceCode::Number(code),
                // Whole floats such as `200.0` compare equal to their integer.
                (None, Some(float)) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => {
                    ServiceCode::Number(float as i64)
                }
                _ => ServiceCode::Text(number.to_string()),
            }),
            other => Some(ServiceCode::Text(other.to_string())),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            ServiceCode::Number(code) => json!(code),
            ServiceCode::Text(text) => json!(text),
        }
    }
}

impl fmt::Display for ServiceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCode::Number(code) => write!(f, "{code}"),
            ServiceCode::Text(text) => f.write_str(text),
        }
    }
}

/// Outcome of one lookup: the decoded body untouched, or a structured failure.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    Success {
        raw_payload: Map<String, Value>,
    },
    Failure {
        kind: FailureKind,
        reason: String,
        code: Option<ServiceCode>,
    },
}

impl WeatherResult {
    pub fn credential_missing() -> Self {
        WeatherResult::Failure {
            kind: FailureKind::CredentialMissing,
            reason: CREDENTIAL_NOT_CONFIGURED.to_string(),
            code: None,
        }
    }

    pub fn transport_failure(err: &TransportError) -> Self {
        WeatherResult::Failure {
            kind: FailureKind::TransportFailure,
            reason: format!("could not connect to weather service: {err}"),
            code: None,
        }
    }

    pub fn parse_failure() -> Self {
        WeatherResult::Failure {
            kind: FailureKind::ResponseParseFailure,
            reason: RESPONSE_PARSE_FAILURE.to_string(),
            code: None,
        }
    }

    pub fn service_error(message: impl Into<String>, code: Option<ServiceCode>) -> Self {
        WeatherResult::Failure {
            kind: FailureKind::ServiceReportedError,
            reason: message.into(),
            code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WeatherResult::Success { .. })
    }

    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            WeatherResult::Success { raw_payload } => Some(raw_payload),
            WeatherResult::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            WeatherResult::Success { .. } => None,
            WeatherResult::Failure { reason, .. } => Some(reason),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            WeatherResult::Success { .. } => None,
            WeatherResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// JSON handed to an assistant model: the body itself on success,
    /// `{"error": reason, "cod": code}` on failure.
    pub fn to_tool_payload(&self) -> Value {
        match self {
            WeatherResult::Success { raw_payload } => Value::Object(raw_payload.clone()),
            WeatherResult::Failure { reason, code, .. } => {
                let mut body = Map::new();
                body.insert("error".to_string(), json!(reason));
                if let Some(code) = code {
                    body.insert("cod".to_string(), code.to_value());
                }
                Value::Object(body)
            }
        }
    }
}
