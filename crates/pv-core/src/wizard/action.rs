use crate::device::{DeviceConfig, FirmwareImage};
use crate::ids::ConfigurationHandle;

/// Side-effects produced by state transitions.
///
/// Actions carry everything they need so the orchestrator never has to read
/// the session to execute one.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    /// Write the captured Wi-Fi password for `ssid` to the secret store.
    PersistWifiSecret { ssid: String },
    /// Ask the user for a port and open a transfer session on it.
    AcquireTransport,
    IdentifyChip,
    CreateConfiguration { config: DeviceConfig },
    FetchApiKey { handle: ConfigurationHandle },
    /// Compile and download the resulting binaries.
    CompileConfiguration { handle: ConfigurationHandle },
    TransferFirmware {
        images: Vec<FirmwareImage>,
        erase: bool,
    },
    HardReset,
    AwaitPresence { handle: ConfigurationHandle },
    ShowCapabilityFallback,
    CloseTransport,
    DeleteConfiguration { handle: ConfigurationHandle },
    CancelPresence,
}
