//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Build the HTTP server and its background tasks
//! - Bind the listener (plain or TLS) and serve until a shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::CounterConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

/// Run the service until SIGINT/SIGTERM.
pub async fn run(config: CounterConfig) -> Result<(), ServerError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.deployment.environment,
        cookie_name = %config.session.cookie_name,
        session_ttl_secs = config.session.ttl_secs,
        tls = config.listener.tls.is_some(),
        cors_origin = ?config.cors.allow_origin,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        signal.trigger();
    });

    let server = HttpServer::new(config.clone());
    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config
                .listener
                .bind_address
                .parse()
                .map_err(|e| ServerError::Address(config.listener.bind_address.clone(), e))?;
            let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path))
                .await
                .map_err(ServerError::Tls)?;
            server.run_tls(addr, rustls, shutdown).await
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            server.run(listener, shutdown).await
        }
    }
}
