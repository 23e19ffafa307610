use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::{ApiError, ApiException},
    protocol::ResponseEnvelope,
};
use tracing::debug;

use crate::{error::TransportError, types::QueryParams};

/// Performs the actual network call for one fetch cycle.
///
/// Implementations must not retry; the controller decides what a failure means.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn fetch(
        &self,
        base_url: &str,
        params: &QueryParams,
    ) -> Result<ResponseEnvelope, TransportError>;
}

pub struct MissingTransport;

#[async_trait]
impl CatalogTransport for MissingTransport {
    async fn fetch(
        &self,
        base_url: &str,
        _params: &QueryParams,
    ) -> Result<ResponseEnvelope, TransportError> {
        Err(TransportError::Unavailable(format!(
            "no transport configured for {base_url}"
        )))
    }
}

#[derive(Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn fetch(
        &self,
        base_url: &str,
        params: &QueryParams,
    ) -> Result<ResponseEnvelope, TransportError> {
        let query: Vec<(&str, &str)> = params.iter().collect();
        let res = self.http.get(base_url).query(&query).send().await?;
        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ApiError>(&body) {
                Ok(api_error) => ApiException::from(api_error).to_string(),
                Err(_) => String::from_utf8_lossy(&body).trim().to_string(),
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ResponseEnvelope = serde_json::from_slice(&body)?;
        debug!(
            url = base_url,
            total = envelope.data.total,
            count = envelope.data.results.len(),
            "catalog: decoded response"
        );
        Ok(envelope)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
