//! Per-session counter domain.
//!
//! # Data Flow
//! ```text
//! handler (GET /counter, PATCH /counter/up, PATCH /counter/down)
//!     → service.rs (resolve session, pick CounterOp)
//!     → SessionHandle::with (exclusive access to one session)
//!     → state.rs (get / increment / clamped decrement)
//!     → CounterOutcome { session id, count }
//! ```
//!
//! # Design Decisions
//! - The count is unsigned; decrement saturates at zero instead of failing
//! - Every operation runs inside the session lock, so concurrent requests
//!   against one session never lose updates

pub mod service;
pub mod state;

pub use service::{CounterOutcome, CounterService};
pub use state::{CounterOp, CounterState};
