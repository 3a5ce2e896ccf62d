use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status and decoded body of one HTTP exchange.
///
/// Non-`2xx` answers are still an `ApiResponse`; the caller decides whether a
/// status is acceptable via [`ApiResponse::into_success`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `message` field of the body, if the server supplied one.
    pub fn server_message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }

    /// Turns a non-`2xx` answer into [`TransportError::Status`].
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", self.status));
            Err(TransportError::Status {
                status: self.status,
                message,
            })
        }
    }
}

/// The three verbs the form engine needs from the network.
///
/// An `Err` means no response was obtained at all (connection, timeout,
/// undecodable body). Retry and backoff are not part of this contract.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse>;
    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse>;
    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        (**self).post(path, body).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse> {
        (**self).patch(path, body).await
    }
}

/// [`Transport`] over `reqwest`, speaking JSON.
#[derive(Clone)]
pub struct HttpTransport {
    config: TransportConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new HttpTransport for the given config.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn send(&self, request: reqwest::RequestBuilder, method: &str, path: &str) -> Result<ApiResponse> {
        debug!(method, path, "sending request");
        let response = request
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(method, path, error = %e, "request failed");
                TransportError::from(e)
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::NetworkError(format!("Failed to read response text: {}", e)))?;
        debug!(method, path, status, "received response");

        Ok(ApiResponse::new(status, decode_body(text)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        let request = self.client.get(self.config.url(path));
        self.send(request, "GET", path).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        let request = self.client.post(self.config.url(path)).json(&body);
        self.send(request, "POST", path).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse> {
        let request = self.client.patch(self.config.url(path)).json(&body);
        self.send(request, "PATCH", path).await
    }
}

/// Empty bodies decode to `null`; bodies that are not JSON (plain-text error
/// pages) are kept verbatim as a string.
fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}
