use std::sync::Arc;

use pv_core::wizard::WizardSession;
use tokio::sync::Mutex;

/// Shared wizard context containing the session and the dispatch lock.
/// 共享向导上下文，包含会话与分发锁。
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `dispatch_lock` first, then `session`.
/// - `dispatch_lock`: serializes dispatches so transition, actions and their
///   follow-up events run as one unit.
/// - `session`: short reads and writes of the session itself.
#[derive(Clone)]
pub struct WizardContext {
    session: Arc<Mutex<WizardSession>>,
    dispatch_lock: Arc<Mutex<()>>,
}

impl WizardContext {
    pub fn new(initial: WizardSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(initial)),
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Snapshot of the session. Does NOT acquire `dispatch_lock`.
    pub async fn get_session(&self) -> WizardSession {
        self.session.lock().await.clone()
    }

    pub async fn set_session(&self, session: WizardSession) {
        *self.session.lock().await = session;
    }

    /// Removes the API key from the session so it is shown only once.
    pub async fn take_api_key(&self) -> Option<String> {
        self.session.lock().await.api_key.take()
    }

    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }
}
