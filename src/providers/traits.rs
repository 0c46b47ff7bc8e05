//! Provider traits and types

use crate::query::QueryState;
use crate::results::SearchResult;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Failures talking to a hosted search provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the JSON the provider documents
    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request could not be built from the query state
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Whether the provider rejected the request for rate limiting
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::Status { status: 429, .. })
    }
}

/// HTTP request to be made against the provider
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// Request body
    pub data: Option<RequestBody>,
}

impl EngineRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            params: HashMap::new(),
            data: None,
        }
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(RequestBody::Json(data));
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl EngineResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ProviderError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into a `ProviderError::Status`
    pub fn error_for_status(self) -> Result<Self, ProviderError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProviderError::Status {
                status: self.status,
                body: self.text,
            })
        }
    }
}

/// Provider adapter: maps query state to a native request and a native
/// response back to a generic result
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Build the HTTP request for a search
    fn request(&self, state: &QueryState) -> Result<EngineRequest, ProviderError>;

    /// Parse the HTTP response into a result
    fn response(
        &self,
        response: EngineResponse,
        state: &QueryState,
    ) -> Result<SearchResult, ProviderError>;
}

/// Asynchronous search entry point used by the runner
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Service name, for logging
    fn name(&self) -> &str;

    /// Run one search for `state`
    async fn search(&self, state: &QueryState) -> Result<SearchResult, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, text: &str) -> EngineResponse {
        EngineResponse {
            status,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_error_for_status() {
        assert!(response(200, "{}").error_for_status().is_ok());

        let err = response(429, "slow down").error_for_status().unwrap_err();
        assert!(err.is_rate_limited());
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_json_decode_error() {
        let err = response(200, "not json").json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn test_post_builder() {
        let request = EngineRequest::post("https://example.com/q")
            .header("x-key", "abc")
            .param("a", "1")
            .json(serde_json::json!({"q": "x"}));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("x-key").map(String::as_str), Some("abc"));
        assert!(matches!(request.data, Some(RequestBody::Json(_))));
    }
}
