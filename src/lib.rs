//! GraphQL relay library.
//!
//! Relays GraphQL POST requests from browsers to third-party servers named in
//! a request header, so pages can reach endpoints that do not send CORS
//! headers. The server side lives in [`relay`] and [`http`]; [`client`] is the
//! matching caller-side piece.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;

pub use client::{GraphQlRequest, InterceptRules, RelayClient};
pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError};
