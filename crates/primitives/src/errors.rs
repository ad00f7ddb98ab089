//! Errors for the primitive types.

use thiserror::Error;

use crate::U256;

/// Error while parsing an [`Address`](crate::types::Address) from its textual representation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseAddressError {
    /// The input is not valid hex.
    #[error("invalid hex in address: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The input does not decode to exactly 20 bytes.
    #[error("address must be 20 bytes, got {0} hex characters")]
    InvalidLength(usize),
}

/// Error while converting amounts between remote and synthetic units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The decimals delta cannot be represented as a power of ten inside 256 bits.
    #[error("decimals delta {0} is out of range")]
    DeltaOutOfRange(i16),

    /// Scaling the amount up overflows 256 bits.
    #[error("scaling {amount} by 10^{delta} overflows")]
    Overflow {
        /// The amount that was being scaled.
        amount: U256,
        /// The exponent applied.
        delta: i8,
    },
}
