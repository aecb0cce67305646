use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled binary and the flash offset it is written to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareImage {
    pub offset: u32,
    pub data: Vec<u8>,
}

impl FirmwareImage {
    pub fn new(offset: u32, data: Vec<u8>) -> Self {
        Self { offset, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for FirmwareImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirmwareImage")
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("len", &self.data.len())
            .finish()
    }
}
