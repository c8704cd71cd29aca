//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Init logging/metrics → Build server → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server stops accepting, sweeper exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then background tasks, then listeners
//! - Shutdown has a grace period for in-flight requests

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
