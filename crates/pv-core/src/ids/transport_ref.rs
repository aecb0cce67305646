use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Reference to a transport the user picked (e.g. a serial port path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportRef(String);

impl_id!(TransportRef);
