//! Target extraction and host policy.
//!
//! # Responsibilities
//! - Read the target URL from the configured inbound header
//! - Parse it as an absolute URL
//! - Refuse hosts outside the allow-list, when one is configured

use axum::http::HeaderMap;
use url::Url;

use crate::relay::error::RelayError;

/// Extract and parse the target URL from the inbound headers.
///
/// An absent or empty header is a client error. A header that is present but
/// unreadable or not an absolute URL fails the call the same way a failed
/// outbound request would.
pub fn target_from_headers(headers: &HeaderMap, header_name: &str) -> Result<Url, RelayError> {
    let value = match headers.get(header_name) {
        Some(v) if !v.is_empty() => v,
        _ => {
            return Err(RelayError::MissingTarget {
                header: header_name.to_string(),
            })
        }
    };

    let raw = value
        .to_str()
        .map_err(|e| RelayError::Internal(format!("unreadable {} header: {}", header_name, e)))?;

    Url::parse(raw).map_err(|e| RelayError::Internal(format!("invalid target URL '{}': {}", raw, e)))
}

/// Host allow-list applied before any outbound call.
#[derive(Debug, Clone, Default)]
pub struct TargetPolicy {
    allowed_hosts: Vec<String>,
}

impl TargetPolicy {
    /// Build a policy. Entries are normalized to lowercase.
    pub fn new(allowed_hosts: &[String]) -> Self {
        Self {
            allowed_hosts: allowed_hosts
                .iter()
                .map(|h| h.trim().trim_end_matches('.').to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// True when no allow-list is configured and any host is forwarded.
    pub fn is_open(&self) -> bool {
        self.allowed_hosts.is_empty()
    }

    /// Check the target against the allow-list.
    ///
    /// An entry admits its exact host and every subdomain of it.
    pub fn check(&self, target: &Url) -> Result<(), RelayError> {
        if self.is_open() {
            return Ok(());
        }

        let host = target
            .host_str()
            .map(|h| h.trim_end_matches('.').to_lowercase())
            .unwrap_or_default();

        let allowed = self.allowed_hosts.iter().any(|entry| {
            host == *entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        });

        if allowed {
            Ok(())
        } else {
            Err(RelayError::TargetNotAllowed { host })
        }
    }
}
