use serde::{Deserialize, Serialize};

use super::Platform;

/// Device settings accumulated while the user walks through the wizard.
///
/// The Wi-Fi password never lives here; it goes straight to the secret store
/// and the generated configuration refers to the stored secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub board_id: Option<String>,
    pub platform: Option<Platform>,
    pub wifi_ssid: Option<String>,
}

impl DeviceConfig {
    /// Board to build for: the explicit choice, or the platform default.
    pub fn effective_board(&self) -> Option<&str> {
        self.board_id
            .as_deref()
            .or_else(|| self.platform.and_then(|p| p.default_board()))
    }
}

/// Summary of a stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMeta {
    pub platform: String,
    #[serde(default)]
    pub integrations: Vec<String>,
}

impl ConfigMeta {
    pub fn has_integration(&self, name: &str) -> bool {
        self.integrations.iter().any(|i| i == name)
    }
}
