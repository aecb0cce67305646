//! File-based Wi-Fi secret store
//!
//! Keeps the credentials generated configurations refer to in a JSON file
//! next to the dashboard data. Other keys in the file are preserved.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use pv_core::ports::SecretStorePort;
use pv_core::security::SecretString;

pub const DEFAULT_SECRETS_FILE: &str = "secrets.json";

const SSID_KEY: &str = "wifi_ssid";
const PASSWORD_KEY: &str = "wifi_password";

pub struct FileSecretStore {
    secrets_path: PathBuf,
}

impl FileSecretStore {
    pub fn new(secrets_path: PathBuf) -> Self {
        Self { secrets_path }
    }

    pub fn with_defaults(base_dir: &Path) -> Self {
        Self::new(base_dir.join(DEFAULT_SECRETS_FILE))
    }

    async fn load(&self) -> anyhow::Result<Map<String, Value>> {
        if !fs::try_exists(&self.secrets_path).await? {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.secrets_path)
            .await
            .with_context(|| format!("failed to read {}", self.secrets_path.display()))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.secrets_path.display()))
    }

    async fn ensure_parent_dir(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.secrets_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStorePort for FileSecretStore {
    async fn has_wifi_secret(&self) -> anyhow::Result<bool> {
        let secrets = self.load().await?;
        Ok(secrets
            .get(SSID_KEY)
            .and_then(Value::as_str)
            .is_some_and(|ssid| !ssid.is_empty()))
    }

    async fn set_wifi_secret(&self, ssid: &str, password: &SecretString) -> anyhow::Result<()> {
        let mut secrets = self.load().await?;
        secrets.insert(SSID_KEY.to_string(), Value::from(ssid));
        secrets.insert(PASSWORD_KEY.to_string(), Value::from(password.expose()));

        self.ensure_parent_dir().await?;
        let json = serde_json::to_string_pretty(&secrets).context("failed to serialize secrets")?;

        let mut file = fs::File::create(&self.secrets_path)
            .await
            .with_context(|| format!("failed to create {}", self.secrets_path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await
                .context("failed to restrict secrets file permissions")?;
        }
        file.write_all(json.as_bytes())
            .await
            .context("failed to write secrets file")?;
        file.sync_all()
            .await
            .context("failed to sync secrets file")?;

        debug!(path = %self.secrets_path.display(), ssid = %ssid, "wifi secret stored");
        Ok(())
    }
}
