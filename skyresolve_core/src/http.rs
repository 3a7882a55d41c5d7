//! HTTP transport seam.
//!
//! Connectors never touch `reqwest` directly; they build an [`HttpRequest`]
//! and hand it to an [`HttpClient`]. Tests substitute a scripted client.

use crate::error::ResolveError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>, timeout: Duration, cancel: &CancellationToken) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout,
            cancel: cancel.clone(),
        }
    }

    pub fn post(url: impl Into<String>, timeout: Duration, cancel: &CancellationToken) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url, timeout, cancel)
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// JSON body with the matching content type.
    pub fn json_body(self, value: &serde_json::Value) -> Self {
        self.header("Content-Type", "application/json")
            .body(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ResolveError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ResolveError::parse(format!("invalid JSON body: {}", e)))
    }

    /// Turn a non-success status into an upstream error, keeping a short
    /// excerpt of the body for diagnostics.
    pub fn error_for_status(self, service: &str) -> Result<Self, ResolveError> {
        if self.is_success() {
            return Ok(self);
        }
        let excerpt: String = self.body.chars().take(200).collect();
        Err(ResolveError::upstream(
            self.status,
            format!("{} returned HTTP {}: {}", service, self.status, excerpt.trim()),
        ))
    }
}

/// Timeout- and cancellation-aware transport. Returns the status and body for
/// any completed exchange; only transport failures are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ResolveError>;
}

/// Default transport backed by `reqwest`.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ResolveError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ResolveError> {
        if request.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(
            target: "skyresolve.http",
            url = %request.url,
            timeout_ms = request.timeout.as_millis() as u64,
            "Sending request"
        );

        let exchange = async {
            let response = builder.send().await.map_err(transport_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(transport_error)?;
            Ok::<_, ResolveError>(HttpResponse { status, body })
        };

        tokio::select! {
            _ = request.cancel.cancelled() => Err(ResolveError::Cancelled),
            result = exchange => {
                if let Ok(ref response) = result {
                    debug!(target: "skyresolve.http", url = %request.url, status = response.status, "Received response");
                }
                result
            }
        }
    }
}

fn transport_error(err: reqwest::Error) -> ResolveError {
    if err.is_timeout() {
        ResolveError::network(format!("request timed out: {}", err))
    } else {
        ResolveError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(200, "ok").error_for_status("SIMBAD").is_ok());
        let err = HttpResponse::new(503, "Service Unavailable")
            .error_for_status("SIMBAD")
            .unwrap_err();
        match err {
            ResolveError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert!(message.contains("SIMBAD"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_request_builder() {
        let cancel = CancellationToken::new();
        let req = HttpRequest::post("https://example.org", Duration::from_secs(1), &cancel)
            .json_body(&serde_json::json!({"a": 1}));
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body.as_deref(), Some("{\"a\":1}"));
        assert_eq!(req.headers[0].0, "Content-Type");
    }

    #[test]
    fn test_json_parse_error_is_parse() {
        let resp = HttpResponse::new(200, "not json");
        let err = resp.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }
}
