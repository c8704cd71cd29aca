//! Session Counter (v1)
//!
//! A per-client counter kept in server-side sessions, served with Tokio and
//! Axum behind an edge gateway and load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!   UI (credentialed)  │                   SESSION COUNTER                    │
//!        │             │                                                      │
//!   edge gateway       │  ┌─────────┐   ┌─────────────┐   ┌────────────────┐  │
//!   (Forwarded hop)    │  │  http   │──▶│ access log  │──▶│   handlers     │  │
//!        │             │  │ server  │   │ (forwarded) │   │ cookie → id    │  │
//!   load balancer ─────┼─▶│         │   └─────────────┘   └───────┬────────┘  │
//!   (Forwarded hop)    │  └─────────┘                             │           │
//!                      │                                          ▼           │
//!                      │  ┌───────────────┐   ┌──────────────────────────┐    │
//!                      │  │ session store │◀──│ counter service          │    │
//!                      │  │ DashMap + TTL │   │ get / up / down (locked) │    │
//!                      │  └───────┬───────┘   └──────────────────────────┘    │
//!                      │          │ sweeper                                   │
//!                      │  ┌───────▼──────────────────────────────────────┐    │
//!                      │  │ config · observability · lifecycle · net/tls  │    │
//!                      │  └──────────────────────────────────────────────┘    │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use session_counter::config::load_config;
use session_counter::lifecycle::startup;
use session_counter::observability::logging;

/// Config file path: first argument, else `COUNTER_CONFIG`.
fn config_path() -> Option<PathBuf> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("COUNTER_CONFIG").ok())
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path().as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("session-counter v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
