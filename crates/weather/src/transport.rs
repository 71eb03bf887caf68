use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::TransportError;

/// Status line and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Abstraction over the single GET issued per lookup.
#[async_trait]
pub trait WeatherTransport: Send + Sync {
    /// Issue one GET for `url`; no retries.
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport. The default client applies no request timeout.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide a custom reqwest client instance.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WeatherTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        // The URL carries the credential, keep it out of error text.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| TransportError::Request(err.without_url()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Request(err.without_url()))?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
