//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound POST (target header + raw body)
//!     → target.rs (extract target URL, apply allow-list)
//!     → upstream.rs (single POST, fixed headers, body untouched)
//!     → 2xx: parse JSON, hand back to the server as-is
//!     → other: error.rs (status + bounded details envelope)
//! ```
//!
//! # Design Decisions
//! - Stateless per call; a `Relay` only holds config-derived values
//! - No retries: every failure is terminal for the call
//! - Body is forwarded as bytes, never parsed on the way in
//! - Rebuilt as a whole on config reload and swapped atomically

pub mod error;
pub mod target;
pub mod upstream;

use std::error::Error as _;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde_json::Value;
use thiserror::Error;

use crate::config::RelayConfig;

pub use error::{truncate_details, ErrorEnvelope, RelayError};
pub use target::{target_from_headers, TargetPolicy};
pub use upstream::{read_limited, LimitedBody, UpstreamClient};

/// Failure to construct a relay from configuration.
#[derive(Debug, Error)]
pub enum RelayBuildError {
    #[error("Failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Runtime relay built from a validated configuration.
#[derive(Debug, Clone)]
pub struct Relay {
    target_header: String,
    details_limit: usize,
    max_response_bytes: usize,
    policy: TargetPolicy,
    upstream: UpstreamClient,
}

impl Relay {
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayBuildError> {
        let upstream = UpstreamClient::new(&config.upstream, &config.relay.user_agent)?;

        Ok(Self {
            target_header: config.relay.target_header.clone(),
            details_limit: config.relay.details_limit,
            max_response_bytes: config.upstream.max_response_bytes,
            policy: TargetPolicy::new(&config.relay.allowed_hosts),
            upstream,
        })
    }

    /// True when any target host is forwarded.
    pub fn is_open(&self) -> bool {
        self.policy.is_open()
    }

    /// Forward one request and map the outcome.
    ///
    /// Returns the upstream JSON on success; every other outcome is a
    /// `RelayError` ready to be turned into a response.
    pub async fn relay(
        &self,
        request_id: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Value, RelayError> {
        let target = target_from_headers(headers, &self.target_header)?;
        self.policy.check(&target)?;

        tracing::debug!(
            request_id = %request_id,
            target = %target,
            body_len = body.len(),
            "Forwarding to upstream"
        );

        let response = self
            .upstream
            .post(target, body)
            .await
            .map_err(|e| RelayError::Internal(describe(&e)))?;

        let status = response.status();
        tracing::debug!(request_id = %request_id, status = %status, "Upstream responded");

        if !status.is_success() {
            // Four bytes per char is enough to fill `details_limit` chars.
            let cap = self.details_limit.saturating_mul(4).min(self.max_response_bytes);
            let body = read_limited(response, cap)
                .await
                .map_err(|e| RelayError::Internal(describe(&e)))?;
            let text = String::from_utf8_lossy(&body.bytes);
            return Err(RelayError::Upstream {
                status,
                details: truncate_details(&text, self.details_limit),
            });
        }

        let body = read_limited(response, self.max_response_bytes)
            .await
            .map_err(|e| RelayError::Internal(describe(&e)))?;
        if body.truncated {
            return Err(RelayError::Internal(format!(
                "upstream response exceeds {} bytes",
                self.max_response_bytes
            )));
        }

        serde_json::from_slice(&body.bytes)
            .map_err(|e| RelayError::Internal(format!("upstream returned invalid JSON: {}", e)))
    }
}

/// Flatten a reqwest error and its sources into one message.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
