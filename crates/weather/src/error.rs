use serde::{Deserialize, Serialize};

/// Convenient result alias for configuring the weather client.
pub type Result<T> = std::result::Result<T, WeatherError>;

/// Errors raised while setting up a [`crate::WeatherFetcher`].
///
/// Lookups themselves never fail with this type; they report problems as
/// [`crate::WeatherResult::Failure`] data.
#[derive(thiserror::Error, Debug)]
pub enum WeatherError {
    /// The configured service endpoint is not a usable URL.
    #[error("invalid weather service endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Failure of the single HTTP exchange with the weather service.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// DNS, connection, TLS or body read failure reported by the HTTP client.
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    /// Transport failure raised by a non-reqwest transport.
    #[error("{0}")]
    Other(String),
}

/// Which stage of a lookup produced a failure.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No credential for the weather service; no request was sent.
    #[error("credential missing")]
    CredentialMissing,
    /// The request never produced a response.
    #[error("transport failure")]
    TransportFailure,
    /// The response body was not a JSON object.
    #[error("response parse failure")]
    ResponseParseFailure,
    /// The service answered with a status sentinel other than `200`.
    #[error("service reported error")]
    ServiceReportedError,
}
