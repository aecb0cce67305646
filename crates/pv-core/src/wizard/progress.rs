use serde::{Deserialize, Serialize};

/// Firmware transfer progress as reported by the transfer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferProgress {
    /// Percentage, clamped to `0..=100`.
    Percent(u8),
    /// Erasing or otherwise unable to report a ratio.
    Indeterminate,
}

impl TransferProgress {
    pub fn percent(value: u8) -> Self {
        TransferProgress::Percent(value.min(100))
    }

    /// Progress for `written` out of `total` bytes.
    pub fn from_bytes(written: usize, total: usize) -> Self {
        if total == 0 {
            return TransferProgress::Indeterminate;
        }
        let pct = (written.min(total) as u64 * 100 / total as u64) as u8;
        TransferProgress::Percent(pct)
    }
}

#[cfg(test)]
mod tests {
    use super::TransferProgress;

    #[test]
    fn progress_from_bytes_is_floored_and_clamped() {
        assert_eq!(TransferProgress::from_bytes(0, 10), TransferProgress::Percent(0));
        assert_eq!(TransferProgress::from_bytes(5, 9), TransferProgress::Percent(55));
        assert_eq!(TransferProgress::from_bytes(20, 10), TransferProgress::Percent(100));
        assert_eq!(TransferProgress::from_bytes(1, 0), TransferProgress::Indeterminate);
        assert_eq!(TransferProgress::percent(250), TransferProgress::Percent(100));
    }
}
