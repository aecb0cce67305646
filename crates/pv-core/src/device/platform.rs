use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Hardware platforms offered in the platform picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Esp32,
    Esp32S2,
    Esp32S3,
    Esp32C3,
    Esp8266,
    Rp2040,
    Bk72xx,
    Rtl87xx,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct ParsePlatformError(pub String);

impl Platform {
    /// Catalog order as shown to the user.
    pub const ALL: [Platform; 8] = [
        Platform::Esp32,
        Platform::Esp32S2,
        Platform::Esp32S3,
        Platform::Esp32C3,
        Platform::Esp8266,
        Platform::Rp2040,
        Platform::Bk72xx,
        Platform::Rtl87xx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Esp32 => "ESP32",
            Platform::Esp32S2 => "ESP32S2",
            Platform::Esp32S3 => "ESP32S3",
            Platform::Esp32C3 => "ESP32C3",
            Platform::Esp8266 => "ESP8266",
            Platform::Rp2040 => "RP2040",
            Platform::Bk72xx => "BK72XX",
            Platform::Rtl87xx => "RTL87XX",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Esp32 => "ESP32",
            Platform::Esp32S2 => "ESP32-S2",
            Platform::Esp32S3 => "ESP32-S3",
            Platform::Esp32C3 => "ESP32-C3",
            Platform::Esp8266 => "ESP8266",
            Platform::Rp2040 => "Raspberry Pi Pico W",
            Platform::Bk72xx => "BK72xx",
            Platform::Rtl87xx => "RTL87xx",
        }
    }

    /// Board used when "use recommended settings" is enabled.
    pub fn default_board(&self) -> Option<&'static str> {
        match self {
            Platform::Esp32 => Some("esp32dev"),
            Platform::Esp32S2 => Some("esp32-s2-saola-1"),
            Platform::Esp32S3 => Some("esp32-s3-devkitc-1"),
            Platform::Esp32C3 => Some("esp32-c3-devkitm-1"),
            Platform::Esp8266 => Some("esp01_1m"),
            Platform::Rp2040 => Some("rpipicow"),
            Platform::Bk72xx => Some("generic-bk7231n-qfn32-tuya"),
            Platform::Rtl87xx => Some("generic-rtl8710bn-2mb-788k"),
        }
    }
}

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == normalized)
            .ok_or_else(|| ParsePlatformError(s.to_string()))
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
