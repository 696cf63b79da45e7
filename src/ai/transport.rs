//! HTTP transport for provider requests
//!
//! Adapters talk to providers through the [`Transport`] trait so that the
//! request building and response mapping can be exercised without a network.
//! [`ReqwestTransport`] is the production implementation.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Proxy, Url};
use thiserror::Error;
use tracing::debug;

use crate::error::Result;

/// System call reported for failed host lookups
const DNS_SYSCALL: &str = "getaddrinfo";

/// A JSON POST request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

/// Raw HTTP response, returned for every status code
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS lookup for the host failed
    #[error("could not resolve host {host} ({syscall})")]
    HostNotFound { host: String, syscall: String },

    /// The configured deadline elapsed
    #[error("request timed out")]
    Timeout,

    /// Any other request failure
    #[error(transparent)]
    Other(#[from] reqwest::Error),
}

/// Sends a single JSON POST and returns the raw response
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Transport backed by a reqwest client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a per-request timeout and an optional proxy
    pub fn new(timeout_ms: u64, proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_millis(timeout_ms));

        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_error(e, &request.url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, &request.url))?;

        debug!("POST {} -> {} ({} bytes)", request.url, status, body.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// Map a reqwest error onto the transport taxonomy
fn classify_error(err: reqwest::Error, url: &str) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }

    if err.is_connect() && is_dns_failure(&error_chain(&err)) {
        let host = err
            .url()
            .and_then(|u| u.host_str().map(str::to_string))
            .or_else(|| host_of(url))
            .unwrap_or_else(|| url.to_string());

        return TransportError::HostNotFound {
            host,
            syscall: DNS_SYSCALL.to_string(),
        };
    }

    TransportError::Other(err)
}

/// Flatten an error and its sources into one line
fn error_chain(err: &dyn StdError) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Check if an error chain reports a failed host lookup
fn is_dns_failure(chain: &str) -> bool {
    let chain = chain.to_lowercase();
    chain.contains("dns error")
        || chain.contains("failed to lookup address")
        || chain.contains("name or service not known")
        || chain.contains("nodename nor servname")
        || chain.contains("no such host")
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
