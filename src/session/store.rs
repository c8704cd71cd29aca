//! TTL-bound in-memory session store.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use uuid::Uuid;

use crate::counter::CounterState;
use crate::observability::metrics;

/// Opaque session token carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh, unguessable id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-side state for one client.
#[derive(Debug)]
struct Session {
    counter: CounterState,
    last_touched: Instant,
    /// Set under the session lock when the store drops the entry.
    evicted: bool,
}

impl Session {
    /// `None` when `last_touched + ttl` is beyond the clock's range.
    fn expires_at(&self, ttl: Duration) -> Option<Instant> {
        self.last_touched.checked_add(ttl)
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.expires_at(ttl).is_some_and(|deadline| now > deadline)
    }
}

/// Shared handle to one session's state.
///
/// Cloning is cheap; all clones guard the same state with the same lock.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
    ttl: Duration,
}

impl SessionHandle {
    fn new(now: Instant, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Session {
                counter: CounterState::default(),
                last_touched: now,
                evicted: false,
            })),
            ttl,
        }
    }

    /// Run `f` with exclusive access to the counter, then refresh the
    /// session's last access time whether or not `f` changed anything.
    ///
    /// Returns `None` without running `f` if the store evicted the session
    /// after this handle was resolved.
    pub fn with<R>(&self, f: impl FnOnce(&mut CounterState) -> R) -> Option<R> {
        let mut session = self.lock();
        if session.evicted {
            return None;
        }
        let result = f(&mut session.counter);
        session.last_touched = Instant::now();
        Some(result)
    }

    /// Instant after which the session is treated as unknown, or `None` if
    /// it never expires within the clock's range.
    pub fn expires_at(&self) -> Option<Instant> {
        self.lock().expires_at(self.ttl)
    }

    /// Whether the session has been dropped from the store.
    pub fn is_evicted(&self) -> bool {
        self.lock().evicted
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.lock().is_expired(now, self.ttl)
    }

    /// Mark the session evicted if it has expired. Returns whether it was.
    fn evict_if_expired(&self, now: Instant) -> bool {
        let mut session = self.lock();
        if session.is_expired(now, self.ttl) {
            session.evicted = true;
        }
        session.evicted
    }

    // Mutations are single assignments, so a poisoned lock still guards a
    // consistent count.
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Outcome of binding a request to a session.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: SessionId,
    pub handle: SessionHandle,
    /// True when the session was created by this resolution.
    pub is_new: bool,
}

/// Keyed store of live sessions.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionHandle>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Bind to the session named by `cookie_id`, creating a fresh one when
    /// the id is absent, unknown or expired.
    pub fn resolve(&self, cookie_id: Option<&str>) -> ResolvedSession {
        let now = Instant::now();

        if let Some(raw) = cookie_id {
            let id = SessionId::from(raw);
            if let Some(handle) = self.live(&id, now) {
                return ResolvedSession {
                    id,
                    handle,
                    is_new: false,
                };
            }
        }

        self.create(now)
    }

    /// Run `f` against the live session `id`. Returns `None` when the id is
    /// unknown or expired.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut CounterState) -> R,
    ) -> Option<R> {
        self.live(id, Instant::now())?.with(f)
    }

    /// Remove every expired session, returning how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|_, handle| {
            let evicted = handle.evict_if_expired(now);
            if evicted {
                removed += 1;
            }
            !evicted
        });

        if removed > 0 {
            metrics::record_sessions_expired(removed);
        }
        metrics::record_active_sessions(self.sessions.len());
        removed
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn live(&self, id: &SessionId, now: Instant) -> Option<SessionHandle> {
        // Clone out of the map so the shard lock is released before the
        // session lock is taken.
        let handle = self.sessions.get(id)?.value().clone();
        if handle.is_expired(now) {
            if self
                .sessions
                .remove_if(id, |_, stored| stored.evict_if_expired(now))
                .is_some()
            {
                tracing::debug!(session_id = %id, "Session expired on access");
                metrics::record_sessions_expired(1);
            }
            return None;
        }
        Some(handle)
    }

    fn create(&self, now: Instant) -> ResolvedSession {
        let id = SessionId::generate();
        let handle = SessionHandle::new(now, self.ttl);
        self.sessions.insert(id.clone(), handle.clone());

        tracing::debug!(session_id = %id, "Session created");
        metrics::record_session_created();
        metrics::record_active_sessions(self.sessions.len());

        ResolvedSession {
            id,
            handle,
            is_new: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3600);

    #[test]
    fn test_resolve_creates_when_absent() {
        let store = SessionStore::new(TTL);
        let resolved = store.resolve(None);
        assert!(resolved.is_new);
        assert_eq!(resolved.handle.with(|c| c.get()), Some(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_reuses_live_session() {
        let store = SessionStore::new(TTL);
        let first = store.resolve(None);
        first.handle.with(|c| c.increment());

        let again = store.resolve(Some(first.id.as_str()));
        assert!(!again.is_new);
        assert_eq!(again.id, first.id);
        assert_eq!(again.handle.with(|c| c.get()), Some(1));
    }

    #[test]
    fn test_unknown_id_creates_fresh_session() {
        let store = SessionStore::new(TTL);
        let resolved = store.resolve(Some("not-a-session"));
        assert!(resolved.is_new);
        assert_ne!(resolved.id.as_str(), "not-a-session");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new(TTL);
        let a = store.resolve(None);
        let b = store.resolve(None);
        assert_ne!(a.id, b.id);

        store.with_session(&a.id, |c| c.increment());
        store.with_session(&a.id, |c| c.increment());
        assert_eq!(store.with_session(&a.id, |c| c.get()), Some(2));
        assert_eq!(store.with_session(&b.id, |c| c.get()), Some(0));
    }

    #[test]
    fn test_with_session_unknown_id() {
        let store = SessionStore::new(TTL);
        assert_eq!(store.with_session(&SessionId::from("missing"), |c| c.get()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_is_replaced() {
        let store = SessionStore::new(TTL);
        let first = store.resolve(None);
        first.handle.with(|c| c.increment());

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert_eq!(store.with_session(&first.id, |c| c.get()), None);
        let second = store.resolve(Some(first.id.as_str()));
        assert!(second.is_new);
        assert_ne!(second.id, first.id);
        assert_eq!(second.handle.with(|c| c.get()), Some(0));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_access_extends_ttl() {
        let store = SessionStore::new(TTL);
        let first = store.resolve(None);

        tokio::time::advance(TTL - Duration::from_secs(10)).await;
        assert_eq!(store.with_session(&first.id, |c| c.get()), Some(0));

        tokio::time::advance(TTL - Duration::from_secs(10)).await;
        let again = store.resolve(Some(first.id.as_str()));
        assert!(!again.is_new);
        assert!(again.handle.expires_at().unwrap() > Instant::now());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let store = SessionStore::new(TTL);
        let stale = store.resolve(None);

        tokio::time::advance(TTL / 2).await;
        let fresh = store.resolve(None);

        tokio::time::advance(TTL / 2 + Duration::from_secs(1)).await;
        assert_eq!(store.sweep(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.with_session(&stale.id, |c| c.get()), None);
        assert_eq!(store.with_session(&fresh.id, |c| c.get()), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_invalidates_outstanding_handles() {
        let store = SessionStore::new(TTL);
        let resolved = store.resolve(None);
        let held = resolved.handle.clone();

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(store.sweep(), 1);

        assert!(held.is_evicted());
        assert_eq!(held.with(|c| c.increment()), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_access_invalidates_outstanding_handles() {
        let store = SessionStore::new(TTL);
        let resolved = store.resolve(None);

        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        assert_eq!(store.with_session(&resolved.id, |c| c.get()), None);

        assert_eq!(resolved.handle.with(|c| c.increment()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_ttl_never_expires() {
        let store = SessionStore::new(Duration::MAX);
        let first = store.resolve(None);
        assert_eq!(first.handle.expires_at(), None);

        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        assert_eq!(store.sweep(), 0);

        let again = store.resolve(Some(first.id.as_str()));
        assert!(!again.is_new);
        assert_eq!(again.handle.with(|c| c.increment()), Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_not_lost() {
        let store = Arc::new(SessionStore::new(TTL));
        let id = store.resolve(None).id;

        let mut tasks = Vec::new();
        for _ in 0..500 {
            let store = store.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                tokio::task::yield_now().await;
                let resolved = store.resolve(Some(id.as_str()));
                resolved.handle.with(|c| c.increment()).unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.with_session(&id, |c| c.get()), Some(500));
    }
}
