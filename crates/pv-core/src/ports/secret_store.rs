use anyhow::Result;
use async_trait::async_trait;

use crate::security::SecretString;

/// Persists the Wi-Fi credentials generated configurations refer to.
#[async_trait]
pub trait SecretStorePort: Send + Sync {
    async fn has_wifi_secret(&self) -> Result<bool>;

    async fn set_wifi_secret(&self, ssid: &str, password: &SecretString) -> Result<()>;
}
