//! Port interfaces for the application layer
//! 应用层端口接口
//!
//! Ports define the contract between the install wizard orchestrator and
//! the collaborators that do the real work: the configuration store, the
//! firmware flasher, the secret store and the network presence monitor.
//! Adapters live in `pv-infra` (or in the embedding UI).

mod configuration_store;
mod firmware_transfer;
mod presence;
mod secret_store;
mod transport_picker;
mod wizard_event_port;

pub use configuration_store::{ConfigStoreError, ConfigurationStorePort};
pub use firmware_transfer::{FirmwareTransferPort, TransferError, TransferSessionPort};
pub use presence::{NetworkPresencePort, PresenceError, PresenceSnapshot, PresenceSubscription};
pub use secret_store::SecretStorePort;
pub use transport_picker::{PortRequestError, TransportPickerPort};
pub use wizard_event_port::WizardEventPort;
