//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (0 < TTL <= ten years, addresses parse)
//! - Check the cookie name and path are usable in a `Set-Cookie` header
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CounterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::CounterConfig;

/// Upper bound for session durations; keeps deadlines far inside the
/// monotonic clock's range.
pub const MAX_SESSION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("session.ttl_secs must be greater than zero")]
    ZeroTtl,

    #[error("session.ttl_secs must not exceed {max}, got {0}", max = MAX_SESSION_SECS)]
    TtlTooLarge(u64),

    #[error("session.sweep_interval_secs must be greater than zero")]
    ZeroSweepInterval,

    #[error(
        "session.sweep_interval_secs must not exceed {max}, got {0}",
        max = MAX_SESSION_SECS
    )]
    SweepIntervalTooLarge(u64),

    #[error("session.cookie_name '{0}' is not a valid cookie name")]
    CookieName(String),

    #[error("session.path '{0}' must start with '/'")]
    CookiePath(String),

    #[error("cors.allow_origin '{0}' is not an http(s) origin")]
    CorsOrigin(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate the configuration, collecting every problem found.
pub fn validate_config(config: &CounterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match config.session.ttl_secs {
        0 => errors.push(ValidationError::ZeroTtl),
        secs if secs > MAX_SESSION_SECS => errors.push(ValidationError::TtlTooLarge(secs)),
        _ => {}
    }

    match config.session.sweep_interval_secs {
        Some(0) => errors.push(ValidationError::ZeroSweepInterval),
        Some(secs) if secs > MAX_SESSION_SECS => {
            errors.push(ValidationError::SweepIntervalTooLarge(secs))
        }
        _ => {}
    }

    if !is_cookie_token(&config.session.cookie_name) {
        errors.push(ValidationError::CookieName(config.session.cookie_name.clone()));
    }

    let path = &config.session.path;
    if !path.starts_with('/') || path.chars().any(|c| c == ';' || c.is_control()) {
        errors.push(ValidationError::CookiePath(path.clone()));
    }

    if let Some(origin) = &config.cors.allow_origin {
        if !is_origin(origin) {
            errors.push(ValidationError::CorsOrigin(origin.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// RFC 6265 cookie-name = token (RFC 2616 separators excluded).
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c)
        })
}

fn is_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.path() == "/"
                && !origin.ends_with('/')
        }
        Err(_) => false,
    }
}
