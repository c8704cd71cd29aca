//! Counter operations bound to sessions.

use std::sync::Arc;

use crate::counter::state::CounterOp;
use crate::session::{ResolvedSession, SessionId, SessionStore};

/// Result of one counter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterOutcome {
    /// Session the operation ran against; always written back to the cookie.
    pub session_id: SessionId,
    /// The session was created by this request.
    pub is_new: bool,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct CounterService {
    store: Arc<SessionStore>,
}

impl CounterService {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Resolve the session named by `cookie_id` (creating one if needed) and
    /// apply `op` while holding that session exclusively.
    ///
    /// If the session is evicted between resolution and locking, the cookie
    /// id no longer resolves and the next pass binds a fresh session.
    pub fn execute(&self, cookie_id: Option<&str>, op: CounterOp) -> CounterOutcome {
        let mut cookie_id = cookie_id;
        loop {
            let resolved = self.store.resolve(cookie_id);
            let id = resolved.id.clone();
            match Self::apply(resolved, op) {
                Some(outcome) => return outcome,
                None => {
                    tracing::debug!(session_id = %id, "Session evicted before use, rebinding");
                    cookie_id = None;
                }
            }
        }
    }

    fn apply(resolved: ResolvedSession, op: CounterOp) -> Option<CounterOutcome> {
        let count = resolved.handle.with(|state| op.apply(state))?;

        tracing::debug!(
            session_id = %resolved.id,
            new_session = resolved.is_new,
            op = op.as_str(),
            count,
            "Counter operation applied"
        );

        Some(CounterOutcome {
            session_id: resolved.id,
            is_new: resolved.is_new,
            count,
        })
    }

    pub fn get(&self, cookie_id: Option<&str>) -> CounterOutcome {
        self.execute(cookie_id, CounterOp::Get)
    }

    pub fn increment(&self, cookie_id: Option<&str>) -> CounterOutcome {
        self.execute(cookie_id, CounterOp::Increment)
    }

    pub fn decrement(&self, cookie_id: Option<&str>) -> CounterOutcome {
        self.execute(cookie_id, CounterOp::Decrement)
    }
}
