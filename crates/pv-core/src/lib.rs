//! # pv-core
//!
//! Core domain models and business logic for the device provisioner.
//! 设备配置器的核心领域模型与业务逻辑。
//!
//! This crate contains the install wizard state machine and the ports it
//! talks through, without any infrastructure dependencies.
//! 包含安装向导状态机及其端口定义，不依赖任何基础设施。

// Public module exports
pub mod device;
pub mod ids;
pub mod ports;
pub mod security;
pub mod wizard;

// Re-export commonly used types at the crate root
pub use device::{ChipFamily, DeviceConfig, FirmwareImage, Platform};
pub use ids::{ConfigurationHandle, TransportRef};
pub use security::SecretString;
pub use wizard::{
    TransferProgress, WizardAction, WizardError, WizardErrorKind, WizardEvent, WizardOptions,
    WizardSession, WizardState, WizardStateMachine,
};
