//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain: tokio TcpListener → axum::serve
//!     → tls.rs: rustls handshake → axum_server
//!     → Hand off to HTTP layer with TransportSecurity set
//! ```

pub mod tls;
