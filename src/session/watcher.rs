//! Auth status polling
//!
//! A background task re-reads the session token at a fixed interval and
//! publishes [`AuthStatus`] on a `watch` channel, only when it changes.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{AuthStatus, Session};

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the polling task; dropping it stops the task
pub struct AuthWatcher {
    status: watch::Receiver<AuthStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AuthWatcher {
    /// Start polling `session` every `interval`
    pub fn spawn(session: Arc<Session>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(session.status());
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // cookie reads are blocking file IO
                        let polled = Arc::clone(&session);
                        let next = match tokio::task::spawn_blocking(move || polled.status()).await {
                            Ok(status) => status,
                            Err(e) => {
                                tracing::warn!(error = %e, "Auth status poll failed");
                                continue;
                            }
                        };
                        let changed = tx.send_if_modified(|current| {
                            if *current == next {
                                false
                            } else {
                                *current = next;
                                true
                            }
                        });
                        if changed {
                            tracing::debug!(
                                authenticated = tx.borrow().is_authenticated(),
                                "Auth status changed"
                            );
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }

            tracing::debug!("Auth watcher stopped");
        });

        Self {
            status: rx,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Receiver notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.clone()
    }

    /// Last published status
    pub fn current(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    /// Stop polling and wait for the task to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Auth watcher task failed");
            }
        }
    }
}

impl Drop for AuthWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
