//! Network layer subsystem.
//!
//! The relay binds either a plain `TcpListener` (served by `axum::serve`) or
//! a rustls listener (served by `axum-server`). This module holds the TLS
//! material loading; connection limits live in the HTTP middleware stack.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
