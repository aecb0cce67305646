use serde::{Deserialize, Serialize};

use super::Platform;

/// Chip families that can be identified over the serial transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipFamily {
    Esp32,
    Esp32S2,
    Esp32S3,
    Esp32C3,
    Esp8266,
}

impl ChipFamily {
    /// Map a chip name reported by the flasher handshake (e.g. `"ESP32-S3"`,
    /// `"ESP8266 (revision 2)"`) to a known family.
    pub fn from_chip_name(chip: &str) -> Option<Self> {
        let name = chip
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        match name.as_str() {
            "ESP32" => Some(ChipFamily::Esp32),
            "ESP32-S2" => Some(ChipFamily::Esp32S2),
            "ESP32-S3" => Some(ChipFamily::Esp32S3),
            "ESP32-C3" => Some(ChipFamily::Esp32C3),
            "ESP8266" => Some(ChipFamily::Esp8266),
            _ => None,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            ChipFamily::Esp32 => Platform::Esp32,
            ChipFamily::Esp32S2 => Platform::Esp32S2,
            ChipFamily::Esp32S3 => Platform::Esp32S3,
            ChipFamily::Esp32C3 => Platform::Esp32C3,
            ChipFamily::Esp8266 => Platform::Esp8266,
        }
    }
}
