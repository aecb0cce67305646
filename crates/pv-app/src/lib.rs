//! Device provisioner application orchestration layer
//! 设备配置器应用编排层
//!
//! This crate contains the install wizard use case: it drives the pure
//! state machine from `pv-core` and executes the side effects it asks for.
//! 此 crate 包含安装向导用例：驱动 `pv-core` 中的纯状态机并执行其请求的副作用。

pub mod deps;
pub mod usecases;

pub use deps::{TransportDeps, WizardDeps, WizardSettings};
pub use usecases::{InstallWizardError, InstallWizardOrchestrator};
