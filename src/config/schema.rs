//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Header carrying the true destination of a relay call.
pub const DEFAULT_TARGET_HEADER: &str = "X-Original-URL";

/// Upper bound on the length of upstream error details echoed to callers.
pub const MAX_DETAILS_LIMIT: usize = 500;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, TLS, limits).
    pub listener: ListenerConfig,

    /// Relay endpoint behavior.
    pub relay: RelaySettings,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,

    /// Total time allowed for an inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_connections: 10_000,
            request_timeout_secs: 60,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Relay endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Path the relay endpoint is mounted on.
    pub path: String,

    /// Name of the header carrying the target URL.
    pub target_header: String,

    /// User-Agent sent on every outbound call.
    pub user_agent: String,

    /// Maximum characters of upstream error body returned as `details`.
    pub details_limit: usize,

    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,

    /// Attach permissive cross-origin headers to responses.
    pub cors: bool,

    /// Hosts the relay may forward to. Empty means any host.
    pub allowed_hosts: Vec<String>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            path: "/api/graphql-proxy".to_string(),
            target_header: DEFAULT_TARGET_HEADER.to_string(),
            user_agent: "Mozilla/5.0 (compatible; GraphQLRelay/1.0)".to_string(),
            details_limit: MAX_DETAILS_LIMIT,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            cors: true,
            allowed_hosts: Vec::new(),
        }
    }
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time for the upstream request/response in seconds.
    pub request_timeout_secs: u64,

    /// Honor HTTP_PROXY / HTTPS_PROXY from the environment.
    pub use_env_proxy: bool,

    /// Largest upstream response body the relay will buffer, in bytes.
    pub max_response_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            use_env_proxy: true,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_relay_contract() {
        let config = RelayConfig::default();
        assert_eq!(config.relay.path, "/api/graphql-proxy");
        assert_eq!(config.relay.target_header, "X-Original-URL");
        assert_eq!(config.relay.details_limit, 500);
        assert!(config.relay.allowed_hosts.is_empty());
        assert!(config.listener.tls.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [relay]
            allowed_hosts = ["thegraph.com"]

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.allowed_hosts, vec!["thegraph.com".to_string()]);
        assert_eq!(config.relay.path, "/api/graphql-proxy");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.upstream.request_timeout_secs, 30);
    }
}
