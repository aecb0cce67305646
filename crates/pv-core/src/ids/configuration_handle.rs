use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Opaque identifier of a configuration artifact, as returned by the
/// configuration store. The presence monitor reports devices under the same
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationHandle(String);

impl_id!(ConfigurationHandle);
