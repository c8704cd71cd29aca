//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie: <name>=<id>
//!     → cookie.rs (extract id, build Set-Cookie per deployment)
//!     → store.rs resolve(id)
//!         live id      → existing handle
//!         unknown id   → fresh id, count = 0
//!         expired id   → removed, fresh id, count = 0
//!     → SessionHandle::with (per-session lock, refresh last access;
//!       None if the store evicted the session in between)
//!
//! Background:
//!     sweeper.rs → store.rs sweep() every check period until shutdown
//! ```
//!
//! # Design Decisions
//! - The store is an explicit object shared through `Arc`, never a global
//! - Sessions live in a sharded `DashMap`; each session has its own mutex so
//!   different sessions never contend
//! - No lock is held across an `.await`
//! - Expired and unknown ids both fold into the creation path
//! - Eviction is flagged under the session lock, so a handle resolved just
//!   before a sweep cannot write into a dropped session

pub mod cookie;
pub mod store;
pub mod sweeper;

pub use cookie::CookiePolicy;
pub use store::{ResolvedSession, SessionHandle, SessionId, SessionStore};
pub use sweeper::SessionSweeper;
