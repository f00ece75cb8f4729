//! Relay error taxonomy and the JSON error envelope.
//!
//! # Mapping
//! ```text
//! MissingTarget     → 400 {error}
//! TargetNotAllowed  → 403 {error, details}
//! Upstream          → upstream status {error, status, details}
//! Internal          → 500 {error, details}
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a relay call. Every variant is terminal; nothing is retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound request carried no target header.
    #[error("Missing {header} header")]
    MissingTarget { header: String },

    /// The target host is not on the configured allow-list.
    #[error("Target not allowed: {host}")]
    TargetNotAllowed { host: String },

    /// The upstream answered with a non-success status.
    #[error("GraphQL request failed with status {status}")]
    Upstream { status: StatusCode, details: String },

    /// Anything that went wrong while reaching or reading the upstream.
    #[error("Internal proxy error: {0}")]
    Internal(String),
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingTarget { .. } => StatusCode::BAD_REQUEST,
            RelayError::TargetNotAllowed { .. } => StatusCode::FORBIDDEN,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingTarget { .. } => "missing_target",
            RelayError::TargetNotAllowed { .. } => "not_allowed",
            RelayError::Upstream { .. } => "upstream_error",
            RelayError::Internal(_) => "internal_error",
        }
    }

    /// Body sent to the caller.
    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            RelayError::MissingTarget { .. } => ErrorEnvelope {
                error: self.to_string(),
                status: None,
                details: None,
            },
            RelayError::TargetNotAllowed { host } => ErrorEnvelope {
                error: "Target not allowed".to_string(),
                status: None,
                details: Some(host.clone()),
            },
            RelayError::Upstream { status, details } => ErrorEnvelope {
                error: "GraphQL request failed".to_string(),
                status: Some(status.as_u16()),
                details: Some(details.clone()),
            },
            RelayError::Internal(message) => ErrorEnvelope {
                error: "Internal proxy error".to_string(),
                status: None,
                details: Some(message.clone()),
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Cut `text` down to at most `limit` characters.
pub fn truncate_details(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_details() {
        assert_eq!(truncate_details("short", 500), "short");
        assert_eq!(truncate_details(&"x".repeat(800), 500).len(), 500);
        assert_eq!(truncate_details("", 10), "");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "é".repeat(600);
        let cut = truncate_details(&text, 500);
        assert_eq!(cut.chars().count(), 500);
        assert_eq!(cut.len(), 1000);
    }

    #[test]
    fn test_status_mapping() {
        let missing = RelayError::MissingTarget { header: "X-Original-URL".into() };
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let upstream = RelayError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            details: "boom".into(),
        };
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(
            RelayError::Internal("refused".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::TargetNotAllowed { host: "evil.test".into() }.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_envelope_shape() {
        let missing = RelayError::MissingTarget { header: "X-Original-URL".into() };
        let json = serde_json::to_value(missing.envelope()).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Missing X-Original-URL header" }));

        let upstream = RelayError::Upstream {
            status: StatusCode::NOT_FOUND,
            details: "no such endpoint".into(),
        };
        let json = serde_json::to_value(upstream.envelope()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "GraphQL request failed",
                "status": 404,
                "details": "no such endpoint",
            })
        );

        let internal = serde_json::to_value(RelayError::Internal("dns".into()).envelope()).unwrap();
        assert_eq!(internal["error"], "Internal proxy error");
        assert_eq!(internal["details"], "dns");
        assert!(internal.get("status").is_none());
    }
}
