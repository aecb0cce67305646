use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::device::FirmwareImage;
use crate::ids::TransportRef;
use crate::wizard::TransferProgress;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to open transport: {0}")]
    Open(String),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("transport io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens flashing sessions on a transport the user picked.
#[async_trait]
pub trait FirmwareTransferPort: Send + Sync {
    async fn open(
        &self,
        transport: &TransportRef,
    ) -> Result<Box<dyn TransferSessionPort>, TransferError>;
}

/// An open flashing session. Exclusively owned by one wizard session.
#[async_trait]
pub trait TransferSessionPort: Send {
    /// Run the bootloader handshake and return the chip name.
    async fn identify_chip(&mut self) -> Result<String, TransferError>;

    /// Write `images`, reporting progress on `progress` while suspended.
    /// Send failures on `progress` are not errors.
    async fn transfer(
        &mut self,
        images: &[FirmwareImage],
        erase: bool,
        progress: mpsc::Sender<TransferProgress>,
    ) -> Result<(), TransferError>;

    /// Pulse the reset line so the new firmware boots.
    async fn hard_reset(&mut self) -> Result<(), TransferError>;

    async fn close(&mut self) -> Result<(), TransferError>;
}
