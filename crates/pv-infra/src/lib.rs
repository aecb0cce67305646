//! Infrastructure adapters for the device provisioner.
//! 设备配置器的基础设施适配器。
//!
//! Implements the `pv-core` ports against the dashboard HTTP API and the
//! local file system, and loads [`settings::ProvisionerSettings`].

pub mod config_store;
mod dashboard_url;
pub mod presence;
pub mod secret_store;
pub mod settings;

pub use config_store::HttpConfigurationStore;
pub use presence::PollingPresenceMonitor;
pub use secret_store::FileSecretStore;
pub use settings::{load_settings, ProvisionerSettings};
