//! HTTP seam between protocol adapters and the network.
//!
//! Adapters build [`HttpRequest`]s and interpret [`HttpResponse`]s; only
//! [`ReqwestTransport`] talks to the network. Tests substitute a scripted
//! transport to observe requests without any I/O.

use crate::llm::types::LLMError;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Anything able to execute an [`HttpRequest`].
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, LLMError>>;
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Build a JSON response, mostly useful for scripted transports.
    pub fn from_json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn from_bytes(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            content_type: Some(content_type.to_string()),
            body,
        }
    }

    /// The nested `error.message` of a provider error envelope, else the status text.
    pub fn error_message(&self) -> String {
        let fallback = || format!("API request failed with status {}", self.status);

        match self.json() {
            Ok(value) => value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(fallback),
            Err(_) if !self.status_text.is_empty() => self.status_text.clone(),
            Err(_) => fallback(),
        }
    }

    /// Turn a non-success response into an [`LLMError::Api`].
    pub fn into_api_error(self) -> LLMError {
        LLMError::Api {
            status: self.status,
            message: self.error_message(),
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, LLMError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, LLMError>> {
        Box::pin(async move {
            debug!("{:?} {}", request.method, redact(&request.url));

            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| LLMError::Network(e.to_string()))?;

            let status = response.status();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response
                .bytes()
                .await
                .map_err(|e| LLMError::Network(e.to_string()))?;

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                content_type,
                body: body.to_vec(),
            })
        })
    }
}

/// Strip query strings so credentials passed as parameters never reach the logs.
pub fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
