//! Metrics collection and exposition.
//!
//! # Metrics
//! - `counter_requests_total` (counter): requests by method, route, status
//! - `counter_request_duration_seconds` (histogram): latency by route
//! - `counter_sessions_created_total` (counter)
//! - `counter_sessions_expired_total` (counter)
//! - `counter_sessions_active` (gauge): stored sessions, swept or not

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    counter!(
        "counter_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("counter_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_session_created() {
    counter!("counter_sessions_created_total").increment(1);
}

pub fn record_sessions_expired(count: usize) {
    counter!("counter_sessions_expired_total").increment(count as u64);
}

pub fn record_active_sessions(count: usize) {
    gauge!("counter_sessions_active").set(count as f64);
}
