//! Handling of sensitive values supplied during provisioning.

mod secret;

pub use secret::SecretString;
