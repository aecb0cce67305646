//! # Provisioner settings / 配置器设置
//!
//! Layered settings: built-in defaults, then an optional TOML file, then
//! `PROVISIONER__*` environment variables.
//! 分层设置：内置默认值，可选 TOML 文件，最后是环境变量。
//!
//! ```toml
//! dashboard_url = "http://localhost:6052"
//! presence_timeout_secs = 20
//! presence_poll_interval_ms = 1000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

pub const APP_DIR_NAME: &str = "provisioner";
pub const SETTINGS_FILE: &str = "provisioner.toml";
pub const ENV_PREFIX: &str = "PROVISIONER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionerSettings {
    pub dashboard_url: String,
    pub presence_timeout_secs: u64,
    pub presence_poll_interval_ms: u64,
    pub use_recommended_settings: bool,
    pub erase_before_flash: bool,
    pub secrets_path: PathBuf,
    pub log_dir: PathBuf,
}

impl ProvisionerSettings {
    pub fn presence_timeout(&self) -> Duration {
        Duration::from_secs(self.presence_timeout_secs)
    }

    pub fn presence_poll_interval(&self) -> Duration {
        Duration::from_millis(self.presence_poll_interval_ms)
    }
}

/// `<config dir>/provisioner/provisioner.toml`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Load settings. `settings_file` overrides the default location; a missing
/// file is not an error.
pub fn load_settings(settings_file: Option<&Path>) -> anyhow::Result<ProvisionerSettings> {
    let path = settings_file
        .map(Path::to_path_buf)
        .or_else(default_settings_path);
    build(
        path.as_deref(),
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    )
}

fn build(
    settings_file: Option<&Path>,
    environment: Environment,
) -> anyhow::Result<ProvisionerSettings> {
    let data_dir = data_dir();
    let mut builder = Config::builder()
        .set_default("dashboard_url", "http://localhost:6052")?
        .set_default("presence_timeout_secs", 20_i64)?
        .set_default("presence_poll_interval_ms", 1000_i64)?
        .set_default("use_recommended_settings", true)?
        .set_default(
            "secrets_path",
            data_dir.join("secrets.json").to_string_lossy().into_owned(),
        )?
        .set_default("erase_before_flash", true)?
        .set_default("log_dir", data_dir.join("logs").to_string_lossy().into_owned())?;

    if let Some(path) = settings_file {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }

    builder
        .add_source(environment)
        .build()
        .context("failed to load provisioner settings")?
        .try_deserialize()
        .context("invalid provisioner settings")
}
