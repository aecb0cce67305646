//! Dashboard-backed configuration store.
//!
//! Talks to the dashboard REST API:
//!
//! | call | request |
//! |------|---------|
//! | create | `POST /configurations` |
//! | compile | `POST /configurations/{name}/compile` |
//! | read | `GET /configurations/{name}` |
//! | api key | `GET /configurations/{name}/api-key` |
//! | firmware | `GET /configurations/{name}/firmware`, then each image path |
//! | delete | `DELETE /configurations/{name}` |

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pv_core::device::{ConfigMeta, DeviceConfig, FirmwareImage};
use pv_core::ids::ConfigurationHandle;
use pv_core::ports::{ConfigStoreError, ConfigurationStorePort};

use crate::dashboard_url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    platform: Option<&'a str>,
    board: Option<&'a str>,
    /// Omitted when the stored Wi-Fi secret is reused.
    #[serde(skip_serializing_if = "Option::is_none")]
    ssid: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreateResponse {
    configuration: String,
}

#[derive(Deserialize, Default)]
struct BuildFailure {
    #[serde(default)]
    message: String,
    #[serde(default)]
    logs: String,
}

#[derive(Deserialize)]
struct ApiKeyResponse {
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct ManifestEntry {
    offset: u32,
    path: String,
}

pub struct HttpConfigurationStore {
    client: Client,
    base_url: Url,
}

impl HttpConfigurationStore {
    pub fn new(dashboard_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("failed to build dashboard http client")?;
        Self::with_client(client, dashboard_url)
    }

    pub fn with_client(client: Client, dashboard_url: &str) -> anyhow::Result<Self> {
        let base_url = dashboard_url::parse_base(dashboard_url)?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ConfigStoreError> {
        dashboard_url::extend(&self.base_url, segments).map_err(unavailable)
    }

    fn configuration_url(
        &self,
        handle: &ConfigurationHandle,
        tail: &[&str],
    ) -> Result<Url, ConfigStoreError> {
        let mut segments = vec!["configurations", handle.as_str()];
        segments.extend_from_slice(tail);
        self.endpoint(&segments)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ConfigStoreError> {
        request
            .send()
            .await
            .map_err(|e| unavailable(anyhow::Error::new(e).context("dashboard request failed")))
    }
}

#[async_trait]
impl ConfigurationStorePort for HttpConfigurationStore {
    async fn create(&self, config: &DeviceConfig) -> Result<ConfigurationHandle, ConfigStoreError> {
        let body = CreateRequest {
            name: &config.name,
            platform: config.platform.map(|p| p.as_str()),
            board: config.effective_board(),
            ssid: config.wifi_ssid.as_deref(),
        };
        let response = self
            .send(self.client.post(self.endpoint(&["configurations"])?).json(&body))
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let reason = response.text().await.unwrap_or_default();
            return Err(ConfigStoreError::Validation(if reason.is_empty() {
                status.to_string()
            } else {
                reason
            }));
        }
        let created: CreateResponse = checked(response)?
            .json()
            .await
            .map_err(|e| unavailable(e.into()))?;

        info!(configuration = %created.configuration, "dashboard created configuration");
        Ok(ConfigurationHandle::from(created.configuration))
    }

    async fn compile(&self, handle: &ConfigurationHandle) -> Result<(), ConfigStoreError> {
        let url = self.configuration_url(handle, &["compile"])?;
        let response = self.send(self.client.post(url)).await?;

        match response.status() {
            status if status.is_success() => {
                debug!(handle = %handle, "compile finished");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(ConfigStoreError::NotFound(handle.clone())),
            status => {
                let failure: BuildFailure = response.json().await.unwrap_or_default();
                let message = if failure.message.is_empty() {
                    format!("compile returned {status}")
                } else {
                    failure.message
                };
                let logs = if failure.logs.is_empty() {
                    format!("see the compile logs of {handle}")
                } else {
                    failure.logs
                };
                Err(ConfigStoreError::Build { message, logs })
            }
        }
    }

    async fn read(&self, handle: &ConfigurationHandle) -> Result<ConfigMeta, ConfigStoreError> {
        let url = self.configuration_url(handle, &[])?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ConfigStoreError::NotFound(handle.clone()));
        }
        checked(response)?
            .json()
            .await
            .map_err(|e| unavailable(e.into()))
    }

    async fn api_key(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<Option<String>, ConfigStoreError> {
        let url = self.configuration_url(handle, &["api-key"])?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: ApiKeyResponse = checked(response)?
            .json()
            .await
            .map_err(|e| unavailable(e.into()))?;
        Ok(body.api_key.filter(|key| !key.is_empty()))
    }

    async fn firmware(
        &self,
        handle: &ConfigurationHandle,
    ) -> Result<Vec<FirmwareImage>, ConfigStoreError> {
        let url = self.configuration_url(handle, &["firmware"])?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ConfigStoreError::NotFound(handle.clone()));
        }
        let manifest: Vec<ManifestEntry> = checked(response)?
            .json()
            .await
            .map_err(|e| unavailable(e.into()))?;

        let mut images = Vec::with_capacity(manifest.len());
        for entry in manifest {
            let url = dashboard_url::resolve(&self.base_url, &entry.path).map_err(unavailable)?;
            let data = checked(self.send(self.client.get(url)).await?)?
                .bytes()
                .await
                .map_err(|e| unavailable(e.into()))?;
            debug!(offset = entry.offset, bytes = data.len(), "downloaded firmware image");
            images.push(FirmwareImage::new(entry.offset, data.to_vec()));
        }
        Ok(images)
    }

    async fn delete(&self, handle: &ConfigurationHandle) -> Result<(), ConfigStoreError> {
        let url = self.configuration_url(handle, &[])?;
        let response = self.send(self.client.delete(url)).await?;
        // Already gone is fine.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        checked(response)?;
        info!(handle = %handle, "dashboard deleted configuration");
        Ok(())
    }
}

fn unavailable(err: anyhow::Error) -> ConfigStoreError {
    ConfigStoreError::Unavailable(err)
}

fn checked(response: Response) -> Result<Response, ConfigStoreError> {
    response
        .error_for_status()
        .map_err(|e| unavailable(e.into()))
}
