//! Current-conditions weather lookups normalized into data.
//!
//! A [`WeatherFetcher`] sends exactly one GET per [`WeatherQuery`] to an
//! OpenWeatherMap-style service (metric units, credential and location as
//! query parameters) and returns a [`WeatherResult`]. Missing credentials,
//! transport errors, undecodable bodies and service-reported errors all come
//! back as [`WeatherResult::Failure`]; nothing is retried or cached.
//!
//! ```ignore
//! use weather::{WeatherFetcher, WeatherQuery, WeatherResult};
//!
//! # async fn demo() -> weather::Result<()> {
//! let fetcher = WeatherFetcher::builder()
//!     .maybe_api_key(std::env::var("WEATHER_API_KEY").ok())
//!     .build()?;
//!
//! match fetcher.fetch(&WeatherQuery::new("Paris, France")).await {
//!     WeatherResult::Success { raw_payload } => println!("{}", raw_payload["name"]),
//!     WeatherResult::Failure { reason, code, .. } => eprintln!("{reason} ({code:?})"),
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod fetcher;
mod result;
mod transport;

pub use error::{FailureKind, Result, TransportError, WeatherError};
pub use fetcher::{WeatherFetcher, WeatherFetcherBuilder, OPENWEATHER_CURRENT_URL, SERVICE_OK};
pub use result::{
    ServiceCode, WeatherQuery, WeatherResult, CREDENTIAL_NOT_CONFIGURED, RESPONSE_PARSE_FAILURE,
    UNKNOWN_SERVICE_ERROR,
};
pub use transport::{ReqwestTransport, TransportResponse, WeatherTransport};
