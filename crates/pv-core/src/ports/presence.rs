use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::ids::ConfigurationHandle;

/// Online state per configuration, as last observed.
pub type PresenceSnapshot = HashMap<ConfigurationHandle, bool>;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("presence monitor unavailable: {0}")]
    Unavailable(String),
}

/// Live feed of presence snapshots.
///
/// Delivery stops when the subscription is unsubscribed or dropped.
pub struct PresenceSubscription {
    updates: mpsc::Receiver<PresenceSnapshot>,
    on_unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl PresenceSubscription {
    pub fn new(
        updates: mpsc::Receiver<PresenceSnapshot>,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            updates,
            on_unsubscribe: Some(Box::new(on_unsubscribe)),
        }
    }

    /// Next snapshot, or `None` once the monitor stopped.
    pub async fn next(&mut self) -> Option<PresenceSnapshot> {
        self.updates.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.updates.close();
        if let Some(on_unsubscribe) = self.on_unsubscribe.take() {
            on_unsubscribe();
        }
    }
}

impl Drop for PresenceSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PresenceSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceSubscription")
            .field("active", &self.on_unsubscribe.is_some())
            .finish()
    }
}

/// Reports which devices are reachable on the local network.
#[async_trait]
pub trait NetworkPresencePort: Send + Sync {
    async fn subscribe(&self) -> Result<PresenceSubscription, PresenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn unsubscribe_runs_callback_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel(1);
        let counter = Arc::clone(&calls);
        let subscription = PresenceSubscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        subscription.unsubscribe();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::channel(1);
        let counter = Arc::clone(&calls);
        drop(PresenceSubscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
