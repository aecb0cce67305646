use crate::device::{FirmwareImage, Platform};
use crate::ids::ConfigurationHandle;
use crate::wizard::{TransferProgress, WizardError};

/// Events that drive the install wizard.
///
/// User events come from the dialog; the rest are results reported back by
/// the orchestrator after it executed an action.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    // User
    AcknowledgeCapability,
    /// `stored_secret` tells whether the secret store already holds Wi-Fi
    /// credentials, which makes the SSID optional.
    SubmitBasicConfig {
        name: String,
        wifi_ssid: String,
        stored_secret: bool,
    },
    SelectPlatform {
        platform: Platform,
        use_recommended: bool,
    },
    SelectBoard {
        board_id: String,
    },
    Back,
    RequestTransport,
    Cancel,

    // Secret store
    WifiSecretPersisted,
    WifiSecretFailed { message: String },

    // Transport
    TransportAcquired,
    /// No port was selected; the picker was dismissed or found no device.
    TransportNotFound,
    TransportFailed { message: String },
    ChipIdentified { chip: String },
    HandshakeFailed { message: String },

    // Configuration store
    ConfigurationCreated { handle: ConfigurationHandle },
    ApiKeyFetched { api_key: Option<String> },
    ConfigurationCompiled { images: Vec<FirmwareImage> },
    PreparationFailed { error: WizardError },

    // Firmware transfer
    TransferProgressed { progress: TransferProgress },
    TransferCompleted,
    TransferFailed { message: String },

    // Network presence
    DeviceOnline,
    PresenceTimedOut,
    PresenceFailed { message: String },
}

impl WizardEvent {
    /// Short name for logs; never includes payloads.
    pub fn name(&self) -> &'static str {
        match self {
            WizardEvent::AcknowledgeCapability => "acknowledge_capability",
            WizardEvent::SubmitBasicConfig { .. } => "submit_basic_config",
            WizardEvent::SelectPlatform { .. } => "select_platform",
            WizardEvent::SelectBoard { .. } => "select_board",
            WizardEvent::Back => "back",
            WizardEvent::RequestTransport => "request_transport",
            WizardEvent::Cancel => "cancel",
            WizardEvent::WifiSecretPersisted => "wifi_secret_persisted",
            WizardEvent::WifiSecretFailed { .. } => "wifi_secret_failed",
            WizardEvent::TransportAcquired => "transport_acquired",
            WizardEvent::TransportNotFound => "transport_not_found",
            WizardEvent::TransportFailed { .. } => "transport_failed",
            WizardEvent::ChipIdentified { .. } => "chip_identified",
            WizardEvent::HandshakeFailed { .. } => "handshake_failed",
            WizardEvent::ConfigurationCreated { .. } => "configuration_created",
            WizardEvent::ApiKeyFetched { .. } => "api_key_fetched",
            WizardEvent::ConfigurationCompiled { .. } => "configuration_compiled",
            WizardEvent::PreparationFailed { .. } => "preparation_failed",
            WizardEvent::TransferProgressed { .. } => "transfer_progressed",
            WizardEvent::TransferCompleted => "transfer_completed",
            WizardEvent::TransferFailed { .. } => "transfer_failed",
            WizardEvent::DeviceOnline => "device_online",
            WizardEvent::PresenceTimedOut => "presence_timed_out",
            WizardEvent::PresenceFailed { .. } => "presence_failed",
        }
    }
}
