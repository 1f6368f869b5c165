//! Wire dispatch over HTTP
//!
//! `Dispatcher` is the seam between the throttled transport and the network.
//! `HttpDispatcher` is the reqwest-backed implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::transport::call::{Method, RemoteCall, RemoteResponse};

/// No response was received (connect failure, reset, timeout, body read failure)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Sends one call and hands back whatever came back
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, call: &RemoteCall) -> Result<RemoteResponse, DispatchError>;
}

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed dispatcher rooted at a base URL
pub struct HttpDispatcher {
    client: Client,
    base_url: String,
}

impl HttpDispatcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DispatchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else if target.starts_with('/') {
            format!("{}{}", self.base_url, target)
        } else {
            format!("{}/{}", self.base_url, target)
        }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, call: &RemoteCall) -> Result<RemoteResponse, DispatchError> {
        let url = self.url_for(call.target());
        let method = match call.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        for (name, value) in call.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = call.body() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DispatchError(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError(format!("Failed to read body from {}: {}", url, e)))?;

        Ok(RemoteResponse { status, headers, body })
    }
}

impl std::fmt::Debug for HttpDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDispatcher")
            .field("base_url", &self.base_url)
            .finish()
    }
}
