use serde::{Deserialize, Serialize};

use crate::device::DeviceConfig;
use crate::ids::ConfigurationHandle;
use crate::wizard::{TransferProgress, WizardError, WizardState};

/// Per-session knobs, fixed when the wizard opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardOptions {
    /// Erase the whole flash before writing the new firmware.
    pub erase_before_flash: bool,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            erase_before_flash: true,
        }
    }
}

/// An in-progress provisioning attempt.
///
/// Only the state machine mutates a session; the orchestrator owns it and
/// hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSession {
    pub state: WizardState,
    pub device_config: DeviceConfig,
    pub configuration_handle: Option<ConfigurationHandle>,
    pub transfer_progress: Option<TransferProgress>,
    pub error: Option<WizardError>,
    pub api_key: Option<String>,
    /// Serial transport availability, evaluated once at session start.
    pub transport_capable: bool,
    pub options: WizardOptions,
    /// Set once the configuration was created; freezes `device_config`.
    pub config_locked: bool,
    pub flashed: bool,
    pub cancelled: bool,
}

impl WizardSession {
    pub fn new(transport_capable: bool, options: WizardOptions) -> Self {
        let state = if transport_capable {
            WizardState::BasicConfig
        } else {
            WizardState::AskTransportCapability
        };
        Self {
            state,
            device_config: DeviceConfig::default(),
            configuration_handle: None,
            transfer_progress: None,
            error: None,
            api_key: None,
            transport_capable,
            options,
            config_locked: false,
            flashed: false,
            cancelled: false,
        }
    }

    /// Reached `Done` without cancellation or a hard error. A timeout warning
    /// still counts as success.
    pub fn succeeded(&self) -> bool {
        self.state == WizardState::Done
            && !self.cancelled
            && self.configuration_handle.is_some()
            && self.error.as_ref().is_none_or(WizardError::is_warning)
    }

    /// Move to `state`: clears the error, and the progress unless flashing.
    pub(crate) fn enter(&mut self, state: WizardState) {
        self.state = state;
        self.error = None;
        if state != WizardState::Flashing {
            self.transfer_progress = None;
        }
    }

    pub(crate) fn fail(&mut self, state: WizardState, error: WizardError) {
        self.enter(state);
        self.error = Some(error);
    }

    /// Mutate the device config unless it is already frozen.
    pub(crate) fn edit_config(&mut self, edit: impl FnOnce(&mut DeviceConfig)) {
        if self.config_locked {
            return;
        }
        edit(&mut self.device_config);
    }
}
