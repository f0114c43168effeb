//! HTTP transport for JSON text-generation endpoints.
//!
//! Request: `POST <endpoint>` with body `{"prompt": "..."}`.
//! Response: `{"text": "..."}` on success; any non-2xx status is returned as
//! [`TransportError::Status`] and classified by the retry policy.

use super::transport::{Transport, TransportError};
use crate::error::{Result, StepError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Error bodies are truncated to this many characters before being recorded.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// Transport that POSTs prompts to an HTTP endpoint.
///
/// The inner `reqwest::Client` pools connections, so one transport should be
/// reused for every attempt of an invocation.
pub struct HttpTransport {
    endpoint: String,
    http_client: Client,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    ///
    /// `timeout` is applied to each request by the HTTP client as well; the
    /// call client enforces it independently.
    /// Loopback endpoints bypass any proxy configured in the environment.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("promptstep/", env!("CARGO_PKG_VERSION")));
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }
        let http_client = builder
            .build()
            .map_err(|e| StepError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            http_client,
            api_key: None,
        })
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, prompt: &str) -> std::result::Result<String, TransportError> {
        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "sending prompt");

        let mut request = self
            .http_client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(from_reqwest)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                code: status.as_u16(),
                body: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::InvalidResponse(format!("expected {{\"text\": string}}: {}", e))
            }
        })?;

        Ok(body.text)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else if e.is_decode() {
        TransportError::InvalidResponse(e.to_string())
    } else if e.is_connect() || e.is_request() || e.is_body() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

fn is_loopback(endpoint: &str) -> bool {
    let Ok(url) = Url::parse(endpoint) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
