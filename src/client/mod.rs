//! Client side of the relay.
//!
//! Call sites hold a [`RelayClient`] instead of reaching for a global HTTP
//! function. The client decides per request whether the target goes through
//! the relay endpoint (with the target header set) or is called directly.
//!
//! ```text
//! RelayClient::post(target)
//!     → InterceptRules::should_relay(target)?
//!         yes → POST relay endpoint, X-Original-URL: target
//!         no  → POST target
//! ```

pub mod rules;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::schema::DEFAULT_TARGET_HEADER;
use crate::relay::upstream::GRAPHQL_RESPONSE_MEDIA_TYPE;

pub use rules::InterceptRules;

/// Errors surfaced by [`RelayClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// A GraphQL request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Where a request will be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Through the relay endpoint, carrying the original URL in a header.
    Relayed { endpoint: Url, original: Url },
    /// Straight to the target.
    Direct(Url),
}

/// HTTP client that sends matching GraphQL targets through the relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    relay_endpoint: Url,
    target_header: String,
    rules: InterceptRules,
}

impl RelayClient {
    pub fn new(relay_endpoint: Url, rules: InterceptRules) -> Self {
        Self::with_http(reqwest::Client::new(), relay_endpoint, rules)
    }

    /// Use a caller-provided `reqwest::Client` (timeouts, proxies, TLS).
    pub fn with_http(http: reqwest::Client, relay_endpoint: Url, rules: InterceptRules) -> Self {
        Self {
            http,
            relay_endpoint,
            target_header: DEFAULT_TARGET_HEADER.to_string(),
            rules,
        }
    }

    /// Override the header name used to carry the original URL.
    pub fn target_header(mut self, name: impl Into<String>) -> Self {
        self.target_header = name.into();
        self
    }

    /// Decide where a request for `target` goes.
    pub fn dispatch(&self, target: &Url) -> Dispatch {
        if self.rules.should_relay(target) {
            Dispatch::Relayed {
                endpoint: self.relay_endpoint.clone(),
                original: target.clone(),
            }
        } else {
            Dispatch::Direct(target.clone())
        }
    }

    /// POST `body` to `target`, through the relay when the rules say so.
    pub async fn post(
        &self,
        target: &str,
        body: impl Into<reqwest::Body>,
    ) -> Result<reqwest::Response, ClientError> {
        let target = Url::parse(target)?;

        let request = match self.dispatch(&target) {
            Dispatch::Relayed { endpoint, original } => {
                tracing::debug!(target = %original, relay = %endpoint, "Sending through relay");
                self.http
                    .post(endpoint)
                    .header(self.target_header.as_str(), original.as_str())
            }
            Dispatch::Direct(url) => self.http.post(url),
        };

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, GRAPHQL_RESPONSE_MEDIA_TYPE)
            .body(body)
            .send()
            .await?;

        Ok(response)
    }

    /// Send a GraphQL request and return the JSON response.
    pub async fn query(&self, target: &str, request: &GraphQlRequest) -> Result<Value, ClientError> {
        let body = serde_json::to_vec(request)?;

        let response = self.post(target, body).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
