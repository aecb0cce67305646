mod file;

pub use file::{FileSecretStore, DEFAULT_SECRETS_FILE};
