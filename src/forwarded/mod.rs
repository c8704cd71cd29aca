//! RFC 7239 `Forwarded` header handling.
//!
//! # Data Flow
//! ```text
//! Forwarded: for=192.0.2.1;proto=https, for=198.51.100.2
//!     → parser.rs (split hops on ',', params on ';', key/value on first '=')
//!     → HopChain (client-nearest hop first)
//!     → context.rs (nearest `for` / `proto`, else transport fallback)
//!     → ClientContext (ip + protocol, used for access logging only)
//! ```
//!
//! # Design Decisions
//! - Parsing never fails: malformed segments are dropped, siblings survive
//! - Parameter names are case-insensitive, repeated names keep every value
//! - Hop data is trusted without checking the transport peer; the resolved
//!   context must not be used for access control

pub mod context;
pub mod parser;

pub use context::{ClientContext, Protocol, TransportSecurity};
pub use parser::{parse_forwarded, parse_forwarded_headers, HopChain, HopRecord, FORWARDED};
