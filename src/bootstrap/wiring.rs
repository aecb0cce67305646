//! # Dependency wiring / 依赖装配
//!
//! Builds the infra adapters from [`ProvisionerSettings`] and injects them
//! into an [`InstallWizardOrchestrator`]. Assembly only: no decisions about
//! the flow are made here.

use std::sync::Arc;

use anyhow::Context;
use pv_app::{InstallWizardOrchestrator, TransportDeps, WizardDeps, WizardSettings};
use pv_core::ports::WizardEventPort;
use pv_infra::{
    FileSecretStore, HttpConfigurationStore, PollingPresenceMonitor, ProvisionerSettings,
};
use tracing::info;

pub fn wizard_settings(settings: &ProvisionerSettings) -> WizardSettings {
    WizardSettings {
        presence_timeout: settings.presence_timeout(),
        use_recommended_settings: settings.use_recommended_settings,
        erase_before_flash: settings.erase_before_flash,
    }
}

/// Wire a wizard against the dashboard named in `settings`.
///
/// `transport` is `None` when this runtime cannot reach a serial port; the
/// wizard then only creates the configuration.
pub fn build_install_wizard(
    settings: &ProvisionerSettings,
    events: Arc<dyn WizardEventPort>,
    transport: Option<TransportDeps>,
) -> anyhow::Result<InstallWizardOrchestrator> {
    let configuration_store = HttpConfigurationStore::new(&settings.dashboard_url)
        .context("failed to create configuration store")?;
    let presence =
        PollingPresenceMonitor::new(&settings.dashboard_url, settings.presence_poll_interval())
            .context("failed to create presence monitor")?;
    let secret_store = FileSecretStore::new(settings.secrets_path.clone());

    info!(
        dashboard = %settings.dashboard_url,
        secrets = %settings.secrets_path.display(),
        serial = transport.is_some(),
        "install wizard wired"
    );

    Ok(InstallWizardOrchestrator::new(
        WizardDeps {
            configuration_store: Arc::new(configuration_store),
            secret_store: Arc::new(secret_store),
            presence: Arc::new(presence),
            events,
            transport,
        },
        wizard_settings(settings),
    ))
}
