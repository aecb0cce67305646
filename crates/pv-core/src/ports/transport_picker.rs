use async_trait::async_trait;
use thiserror::Error;

use crate::ids::TransportRef;

#[derive(Debug, Error)]
pub enum PortRequestError {
    /// No port selected: the picker was dismissed or no device is attached.
    #[error("no port selected")]
    NotFound,

    #[error("port request failed: {0}")]
    Failed(String),
}

/// Lets the user choose the transport to flash over.
#[async_trait]
pub trait TransportPickerPort: Send + Sync {
    async fn request_port(&self) -> Result<TransportRef, PortRequestError>;
}
