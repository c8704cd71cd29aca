//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize, apply PORT / COOKIE_SID /
//!       CORS_ALLOW_ORIGIN / APP_ENV overrides)
//!     → validation.rs (semantic checks)
//!     → CounterConfig (validated, immutable)
//!     → cloned into the server, cookie policy and session store
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the service runs with no file at all
//! - Environment variables override the file, matching container deployments
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::CounterConfig;
pub use schema::{
    CorsConfig, DeploymentConfig, Environment, ListenerConfig, ObservabilityConfig,
    SessionConfig, TimeoutConfig, TlsConfig,
};
