use serde::{Deserialize, Serialize};
use std::fmt;

/// Form field a validation error points at, so the UI can refocus it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    WifiSsid,
    Board,
}

/// Wizard error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardErrorKind {
    /// User input, fixed in place.
    Validation(Field),
    /// Could not acquire or open a transport.
    Transport,
    Handshake,
    UnknownChip,
    /// Configuration creation rejected by the store.
    Configuration,
    Build,
    Transfer,
    /// Device did not report itself online in time. A warning, not a failure.
    Timeout,
    Storage,
}

/// Error recorded on the wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardError {
    pub kind: WizardErrorKind,
    pub message: String,
    /// Extra context such as where to find the build logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub(crate) const HANDSHAKE_MESSAGE: &str = "Failed to initialize. Try resetting your device or holding the BOOT button while selecting your serial port until it starts preparing the installation.";
pub(crate) const TRANSFER_MESSAGE: &str = "Installation failed.";
pub(crate) const BUILD_MESSAGE: &str = "Unable to compile the configuration.";

impl WizardError {
    pub fn new(kind: WizardErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(field: Field, message: impl Into<String>) -> Self {
        Self::new(WizardErrorKind::Validation(field), message)
    }

    pub fn transport(reason: &str) -> Self {
        Self::new(
            WizardErrorKind::Transport,
            format!("Unable to connect to the device: {reason}"),
        )
    }

    pub fn handshake(reason: &str) -> Self {
        Self::new(WizardErrorKind::Handshake, HANDSHAKE_MESSAGE).with_details(reason)
    }

    pub fn unknown_chip(chip: &str) -> Self {
        Self::new(
            WizardErrorKind::UnknownChip,
            format!("Unable to identify the connected device (reported chip: {chip})."),
        )
    }

    pub fn configuration(reason: &str) -> Self {
        Self::new(
            WizardErrorKind::Configuration,
            format!("Unable to create the configuration: {reason}"),
        )
    }

    pub fn build(logs_hint: &str) -> Self {
        Self::new(WizardErrorKind::Build, BUILD_MESSAGE).with_details(logs_hint)
    }

    pub fn transfer(reason: &str) -> Self {
        Self::new(WizardErrorKind::Transfer, TRANSFER_MESSAGE).with_details(reason)
    }

    pub fn not_detected_online() -> Self {
        Self::new(
            WizardErrorKind::Timeout,
            "Configuration created and installed, but the device was not detected online.",
        )
    }

    pub fn storage(reason: &str) -> Self {
        Self::new(
            WizardErrorKind::Storage,
            format!("Unable to store the Wi-Fi credentials: {reason}"),
        )
    }

    /// Warnings leave the flow successful.
    pub fn is_warning(&self) -> bool {
        self.kind == WizardErrorKind::Timeout
    }
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WizardError {}
