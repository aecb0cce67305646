use std::sync::Mutex;

use async_trait::async_trait;
use pv_core::ports::WizardEventPort;
use pv_core::wizard::{TransferProgress, WizardSession, WizardState};
use tracing::{debug, info, warn};

/// Renders wizard updates as log lines for headless runs.
#[derive(Default)]
pub struct LogWizardEvents {
    last_state: Mutex<Option<WizardState>>,
}

impl LogWizardEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `state` differs from the last rendered one; records it.
    fn advance(&self, state: WizardState) -> bool {
        match self.last_state.lock() {
            Ok(mut last) => last.replace(state) != Some(state),
            Err(_) => true,
        }
    }
}

#[async_trait]
impl WizardEventPort for LogWizardEvents {
    async fn emit_state_changed(&self, session: &WizardSession) {
        if self.advance(session.state) {
            info!(state = ?session.state, "wizard step");
        }
        match session.transfer_progress {
            Some(TransferProgress::Percent(pct)) => info!(percent = pct, "installing"),
            Some(TransferProgress::Indeterminate) => info!("preparing flash"),
            None => {}
        }
        if let Some(error) = &session.error {
            if error.is_warning() {
                warn!(kind = ?error.kind, details = ?error.details, "{}", error.message);
            } else {
                warn!(kind = ?error.kind, details = ?error.details, "wizard error: {}", error.message);
            }
        }
        match serde_json::to_string(session) {
            Ok(json) => debug!(session = %json, "wizard session"),
            Err(err) => debug!(error = %err, "failed to serialize wizard session"),
        }
    }

    async fn show_capability_fallback(&self) {
        warn!("No serial device found. Download the firmware and install it manually.");
    }
}
