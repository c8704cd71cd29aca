//! Periodic removal of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::session::store::SessionStore;

pub struct SessionSweeper {
    store: Arc<SessionStore>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Sweep every `interval` until shutdown is signalled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            ttl_secs = self.store.ttl().as_secs(),
            "Session sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.store.sweep();
                    if removed > 0 {
                        tracing::info!(removed, remaining = self.store.len(), "Expired sessions swept");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_and_stops() {
        let ttl = Duration::from_secs(60);
        let store = Arc::new(SessionStore::new(ttl));
        store.resolve(None);

        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(SessionSweeper::new(store.clone(), ttl).run(rx));

        time::sleep(ttl * 2 + Duration::from_secs(1)).await;
        assert!(store.is_empty());

        tx.send(()).unwrap();
        task.await.unwrap();
    }
}
