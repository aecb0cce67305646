//! # Wizard dependencies / 向导依赖
//!
//! Dependency grouping for constructing an install wizard.
//! 构造安装向导所需的依赖分组。
//!
//! **Note / 注意**: This is NOT a Builder pattern. It only groups parameters;
//! all wiring happens in the embedding binary.
//! **这不是 Builder 模式**，仅用于参数打包，装配在宿主程序中完成。

use std::sync::Arc;
use std::time::Duration;

use pv_core::ports::*;

/// Collaborators of one install wizard.
/// 单个安装向导的协作者。
pub struct WizardDeps {
    pub configuration_store: Arc<dyn ConfigurationStorePort>,
    pub secret_store: Arc<dyn SecretStorePort>,
    pub presence: Arc<dyn NetworkPresencePort>,
    pub events: Arc<dyn WizardEventPort>,

    /// `None` when the runtime has no serial transport. Decides once, at
    /// construction, whether the wizard flashes or only creates the
    /// configuration.
    pub transport: Option<TransportDeps>,
}

/// Serial transport collaborators / 串口传输协作者
pub struct TransportDeps {
    pub picker: Arc<dyn TransportPickerPort>,
    pub firmware: Arc<dyn FirmwareTransferPort>,
}

/// Tunables for the wizard.
#[derive(Debug, Clone)]
pub struct WizardSettings {
    /// How long to wait for the flashed device to report itself online.
    pub presence_timeout: Duration,
    /// Default for the "use recommended settings" toggle in the platform step.
    pub use_recommended_settings: bool,
    pub erase_before_flash: bool,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            presence_timeout: Duration::from_secs(20),
            use_recommended_settings: true,
            erase_before_flash: true,
        }
    }
}
