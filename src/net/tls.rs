//! TLS termination at the origin.
//!
//! Used when the service is exposed without an encrypting edge in front of
//! it. Requests served through this path are marked
//! `TransportSecurity::Encrypted`.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the rustls server config from PEM certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> io::Result<RustlsConfig> {
    for (label, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} file not found: {}", label, path.display()),
            ));
        }
    }

    tracing::info!(cert = %cert_path.display(), "Loading TLS certificate");
    RustlsConfig::from_pem_file(cert_path, key_path).await
}
