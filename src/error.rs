//! Error types.
//!
//! Nothing on the transmit path can fail at runtime. Errors only come out of
//! building the configuration and out of verifying an encoded frame.

use thiserror::Error;

/// Rejected start-up configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ConfigError {
    /// The identifier list has no entries.
    #[error("identifier list is empty")]
    EmptyIdList,
    /// The identifier list does not fit the registry.
    #[error("identifier list exceeds registry capacity of {capacity}")]
    TooManyIdentifiers {
        /// Capacity of the registry that was asked to hold the list.
        capacity: usize,
    },
    /// A repeat quota of zero would never regenerate the frame.
    #[error("repeat quota must be at least 1")]
    ZeroRepeatQuota,
    /// The requested tick period does not fit the 8-bit compare register.
    #[error("tick of {cycles} timer counts does not fit the compare register")]
    CompareOutOfRange {
        /// Requested tick length in timer counts.
        cycles: u32,
    },
}

/// A symbol buffer that does not hold a well-formed EM41xx frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameError {
    /// The nine header bits are not all `1`.
    #[error("header is not nine 1 bits")]
    Header,
    /// A data row failed its parity check.
    #[error("row {row} failed its parity check")]
    RowParity {
        /// Zero-based data row.
        row: usize,
    },
    /// The column nibble does not match the data rows.
    #[error("column parity nibble mismatch")]
    ColumnParity,
    /// The final bit is not the stop bit.
    #[error("stop bit is not 0")]
    StopBit,
}
