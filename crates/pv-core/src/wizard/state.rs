use serde::{Deserialize, Serialize};

/// Install wizard step.
///
/// Variants are declared in flow order, so `Ord` reflects how far the
/// session has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardState {
    /// Runtime has no serial transport; explain the limitation first.
    AskTransportCapability,
    /// Device name and Wi-Fi credentials.
    BasicConfig,
    PickPlatform,
    PickBoard,
    /// Waiting for the user to pick a port.
    ConnectTransport,
    /// Handshake and chip identification.
    Connecting,
    /// Creating and compiling the configuration.
    Preparing,
    Flashing,
    /// Firmware installed, waiting for the device to come online.
    WaitingNetwork,
    Done,
}

impl WizardState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardState::Done)
    }
}
