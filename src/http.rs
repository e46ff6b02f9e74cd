//! Outbound HTTP plumbing.
//!
//! Requests are described as plain [`ApiRequest`] values and executed by an
//! [`HttpTransport`]. The production transport is backed by `reqwest`; tests
//! substitute an in-memory fake. [`RateLimitedRequester`] layers the 429
//! wait-and-retry policy on top of any transport.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    Res,
    error::{Error, Service, TransportError},
    utils,
};

/// Waits longer than this are still honored, but logged as warnings.
const LONG_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            form: Vec::new(),
            json: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn basic_auth(self, username: &str, password: &str) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", username, password));
        self.header("Authorization", format!("Basic {}", credentials))
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS.as_u16()
    }

    /// Parses a successful body, or turns a failure status into
    /// [`Error::Upstream`].
    pub fn into_json(self, service: Service) -> Res<Value> {
        if !self.is_success() {
            return Err(Error::Upstream {
                service,
                status: self.status,
                message: error_message(&self.body),
            });
        }

        serde_json::from_str(&self.body).map_err(|e| Error::Transport {
            service,
            message: format!("invalid JSON body: {}", e),
        })
    }
}

/// Pulls a human readable message out of the error bodies the catalog, the
/// token endpoint and the model API return.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidates = [
            json["error"]["message"].as_str(),
            json["error_description"].as_str(),
            json["error"].as_str(),
            json["message"].as_str(),
        ];
        if let Some(message) = candidates.into_iter().flatten().next() {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(200).collect()
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Executes requests and transparently waits out HTTP 429 responses.
///
/// Each 429 causes exactly one wait of `Retry-After` seconds (1 when the
/// header is missing or not numeric) followed by one identical retry. Without
/// a retry cap a persistently limited endpoint is retried forever. Any other
/// non-success status is returned as [`Error::Upstream`] without retrying.
///
/// The requester keeps no state between calls.
pub struct RateLimitedRequester {
    transport: Arc<dyn HttpTransport>,
    max_retries: Option<u32>,
}

impl RateLimitedRequester {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            max_retries: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn send(&self, service: Service, request: &ApiRequest) -> Res<Value> {
        let mut retries: u32 = 0;

        loop {
            let response = self
                .transport
                .execute(request)
                .await
                .map_err(|e| Error::Transport {
                    service,
                    message: e.to_string(),
                })?;

            if !response.is_rate_limited() {
                return response.into_json(service);
            }

            if let Some(max) = self.max_retries {
                if retries >= max {
                    return Err(Error::RateLimitExhausted { service, retries });
                }
            }

            let signal = utils::parse_retry_after(response.retry_after.as_deref());
            if signal.retry_after_seconds > LONG_RETRY_AFTER_SECS {
                tracing::warn!(
                    %service,
                    url = %request.url,
                    wait_secs = signal.retry_after_seconds,
                    "rate limited with an unusually long retry-after"
                );
            } else {
                tracing::debug!(
                    %service,
                    url = %request.url,
                    wait_secs = signal.retry_after_seconds,
                    "rate limited, waiting before retry"
                );
            }

            sleep(Duration::from_secs(signal.retry_after_seconds)).await;
            retries += 1;
        }
    }
}
