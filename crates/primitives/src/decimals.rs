//! Conversion of amounts between a remote token's base units and its synthetic counterpart's base
//! units.
//!
//! A [`DecimalsDelta`] of `d` means the synthetic token has `d` more decimals than the remote token.
//! Converting towards the side with fewer decimals divides by `10^|d|` and always rounds toward
//! zero. The conversions are therefore symmetric: for every amount `a`,
//! `to_synthetic(to_remote(to_synthetic(a))) == to_synthetic(a)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{errors::ConversionError, U256};

/// Largest supported absolute delta. `10^77` is the largest power of ten below `2^256`.
pub const MAX_DECIMALS_DELTA: i8 = 77;

/// Signed exponent between synthetic and remote decimals (`synthetic - remote`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct DecimalsDelta(i8);

impl DecimalsDelta {
    /// A delta of zero, i.e. both tokens have the same number of decimals.
    pub const ZERO: Self = Self(0);

    /// Creates a delta, rejecting values whose power of ten would not fit into 256 bits.
    pub const fn new(delta: i8) -> Result<Self, ConversionError> {
        if delta > MAX_DECIMALS_DELTA || delta < -MAX_DECIMALS_DELTA {
            return Err(ConversionError::DeltaOutOfRange(delta as i16));
        }

        Ok(Self(delta))
    }

    /// Computes the delta between a synthetic token and a remote token from their decimals.
    pub fn between(synthetic_decimals: u8, remote_decimals: u8) -> Result<Self, ConversionError> {
        let delta = i16::from(synthetic_decimals) - i16::from(remote_decimals);
        let delta = i8::try_from(delta).map_err(|_| ConversionError::DeltaOutOfRange(delta))?;

        Self::new(delta)
    }

    /// Returns the raw exponent.
    pub const fn get(self) -> i8 {
        self.0
    }

    fn scale(self) -> U256 {
        U256::new(10).pow(u32::from(self.0.unsigned_abs()))
    }

    fn scale_up(self, amount: U256) -> Result<U256, ConversionError> {
        amount
            .checked_mul(self.scale())
            .ok_or(ConversionError::Overflow {
                amount,
                delta: self.0,
            })
    }

    /// Converts an amount in remote-token base units into synthetic base units.
    ///
    /// For a negative delta the result is truncated toward zero.
    pub fn to_synthetic(self, remote_amount: U256) -> Result<U256, ConversionError> {
        if self.0 >= 0 {
            self.scale_up(remote_amount)
        } else {
            Ok(remote_amount / self.scale())
        }
    }

    /// Converts an amount in synthetic base units into remote-token base units.
    ///
    /// For a positive delta the result is truncated toward zero.
    pub fn to_remote(self, synthetic_amount: U256) -> Result<U256, ConversionError> {
        if self.0 > 0 {
            Ok(synthetic_amount / self.scale())
        } else {
            self.inverse().scale_up(synthetic_amount)
        }
    }

    /// Rounds a synthetic amount down to the largest value that converts to remote units exactly.
    pub fn remove_synthetic_dust(self, synthetic_amount: U256) -> Result<U256, ConversionError> {
        self.to_synthetic(self.to_remote(synthetic_amount)?)
    }

    /// Rounds a remote amount down to the largest value that converts to synthetic units exactly.
    pub fn remove_remote_dust(self, remote_amount: U256) -> Result<U256, ConversionError> {
        self.to_remote(self.to_synthetic(remote_amount)?)
    }

    const fn inverse(self) -> Self {
        Self(-self.0)
    }
}

impl TryFrom<i8> for DecimalsDelta {
    type Error = ConversionError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DecimalsDelta> for i8 {
    fn from(delta: DecimalsDelta) -> Self {
        delta.0
    }
}

impl fmt::Display for DecimalsDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}
