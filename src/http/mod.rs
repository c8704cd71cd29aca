//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, CORS, request id, timeout, tracing)
//!     → middleware/access_log.rs (Forwarded → ClientContext, access log)
//!     → handlers.rs (cookie → CounterService → `{ "count": n }` + Set-Cookie)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use handlers::CounterBody;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
