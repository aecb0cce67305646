//! Bootstrap: settings, tracing, wiring and the run loop.
//! 启动入口：配置、tracing、依赖装配与运行。

pub mod run;
pub mod tracing;
pub mod wiring;

pub use pv_infra::settings::load_settings;
pub use run::run_until_interrupted;
pub use wiring::{build_install_wizard, wizard_settings};
