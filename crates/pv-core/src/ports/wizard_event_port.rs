use crate::wizard::WizardSession;

/// Pushes wizard updates to whatever renders the dialog.
#[async_trait::async_trait]
pub trait WizardEventPort: Send + Sync {
    async fn emit_state_changed(&self, session: &WizardSession);

    /// The runtime could not find a device to connect to; offer the
    /// alternative install methods.
    async fn show_capability_fallback(&self);
}
