//! Device model: target platforms, chip families and the configuration the
//! user assembles in the wizard.

mod chip;
mod config;
mod firmware;
mod platform;

pub use chip::ChipFamily;
pub use config::{ConfigMeta, DeviceConfig};
pub use firmware::FirmwareImage;
pub use platform::{ParsePlatformError, Platform};
