//! Session-bound counter service behind a `Forwarded`-speaking proxy chain.

pub mod config;
pub mod counter;
pub mod forwarded;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;

pub use config::CounterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
