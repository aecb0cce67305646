use async_trait::async_trait;
use thiserror::Error;

use crate::device::{ConfigMeta, DeviceConfig, FirmwareImage};
use crate::ids::ConfigurationHandle;

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// The store rejected the submitted configuration.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Compilation failed; `logs` points at the detailed build output.
    #[error("build failed: {message}")]
    Build { message: String, logs: String },

    #[error("configuration not found: {0}")]
    NotFound(ConfigurationHandle),

    #[error("configuration store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

/// Creates, compiles and removes named device configurations.
#[async_trait]
pub trait ConfigurationStorePort: Send + Sync {
    async fn create(&self, config: &DeviceConfig) -> Result<ConfigurationHandle, ConfigStoreError>;

    async fn compile(&self, handle: &ConfigurationHandle) -> Result<(), ConfigStoreError>;

    async fn read(&self, handle: &ConfigurationHandle) -> Result<ConfigMeta, ConfigStoreError>;

    /// API encryption key of the configuration, if it defines one.
    async fn api_key(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<Option<String>, ConfigStoreError>;

    /// Binaries produced by the last successful compile.
    async fn firmware(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<Vec<FirmwareImage>, ConfigStoreError>;

    /// Best-effort removal.
    async fn delete(&self, handle: &ConfigurationHandle) -> Result<(), ConfigStoreError>;
}
