use super::API_KEY_HEADER;
use crate::utils::errors::Result;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;

/// Raw outcome of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs authenticated HTTPS requests against the service.
///
/// Non-2xx statuses are not errors at this layer; only failures to complete the
/// exchange are.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        api_key: Option<&str>,
    ) -> Result<TransportResponse>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        api_key: Option<&str>,
    ) -> Result<TransportResponse> {
        tracing::debug!("Making {} request to: {}", method, url);

        let mut builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");

        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(body) = payload {
            builder = builder
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let status_text = status
            .canonical_reason()
            .map(|reason| format!("{} {reason}", status.as_u16()))
            .unwrap_or_else(|| status.as_u16().to_string());
        let body = response.bytes().await?.to_vec();

        tracing::debug!("Response status: {}", status);
        tracing::trace!("Response body: {}", String::from_utf8_lossy(&body));

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}
