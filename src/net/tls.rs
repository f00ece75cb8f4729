//! TLS certificate loading for the relay listener.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::TlsConfig;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Certificate file not found: {0}")]
    MissingCert(String),

    #[error("Private key file not found: {0}")]
    MissingKey(String),

    #[error("Failed to load TLS material: {0}")]
    Load(#[from] std::io::Error),
}

/// Load the listener's rustls configuration from PEM files.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    if !cert_path.exists() {
        return Err(TlsError::MissingCert(config.cert_path.clone()));
    }
    if !key_path.exists() {
        return Err(TlsError::MissingKey(config.key_path.clone()));
    }

    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}
