//! HTTP client adapter: base URL resolution, bearer injection, path and query
//! formatting, and status classification.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::credentials::CredentialStore;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
    pub query: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {status}")]
    Status { status: u16, body: Value },
    #[error("malformed response body (status {status}): {message}")]
    MalformedBody { status: u16, message: String },
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse<Value>, TransportError>;
}

/// Guarantees a leading and a trailing slash.
pub fn format_api_path(path: &str) -> String {
    let mut adjusted = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        adjusted.push('/');
    }
    adjusted.push_str(path);
    if !adjusted.ends_with('/') {
        adjusted.push('/');
    }
    adjusted
}

/// Appends `key=value` pairs joined by `&`. An empty parameter set leaves the
/// URL untouched.
pub fn format_url_with_query_params(base: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_query_value(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub fn format_url(base_url: &str, path: &str, params: &[(String, String)]) -> String {
    let base = base_url.trim_end_matches('/');
    format_url_with_query_params(&format!("{base}{}", format_api_path(path)), params)
}

pub struct HttpTransport {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse<Value>, TransportError> {
        let url = format_url(&self.base_url, &request.path, &request.query);
        Url::parse(&url).map_err(|e| TransportError::Network(format!("invalid url '{url}': {e}")))?;
        debug!(method = %request.method, %url, "transport: sending request");

        let mut builder = self.http.request(request.method, &url);
        if let Some(token) = self.credentials.access_token() {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let parsed = if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&text)
        };

        if !status.is_success() {
            let body = parsed.unwrap_or(Value::String(text));
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match parsed {
            Ok(data) => Ok(ApiResponse {
                status: status.as_u16(),
                data,
            }),
            Err(e) => Err(TransportError::MalformedBody {
                status: status.as_u16(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
