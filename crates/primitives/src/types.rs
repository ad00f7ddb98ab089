//! Identifiers and value types used across the bridge.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{errors::ParseAddressError, U256};

/// Endpoint identifier of a chain.
pub type ChainId = u32;

/// Per-channel message sequence number. The first message on a channel has nonce `1`.
pub type Nonce = u64;

/// 1-based index of a synthetic token in the Hub's registry.
pub type TokenIdx = u32;

/// Index of a link entry in the Hub's registry arena.
pub type LinkIdx = u32;

/// Token amount in base units.
pub type Amount = U256;

/// A 20-byte account or contract address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0; 20]);

    /// Creates an address from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address whose last eight bytes hold `value` in big-endian order.
    pub const fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        let be = value.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[12 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 40 {
            return Err(ParseAddressError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)?;

        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A `(token, amount)` pair carried in deposits, withdrawals and unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// The token contract on the chain the amount is denominated on.
    pub token: Address,

    /// The amount in the token's base units.
    #[serde(with = "ethnum::serde::permissive")]
    pub amount: Amount,
}

impl Asset {
    /// Creates a new asset entry.
    pub const fn new(token: Address, amount: Amount) -> Self {
        Self { token, amount }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.amount, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_text_roundtrip() {
        let addr = Address::from_low_u64_be(0xdead_beef);
        let text = addr.to_string();

        assert_eq!(text, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        assert_eq!(
            "00000000000000000000000000000000deadbeef"
                .parse::<Address>()
                .unwrap(),
            addr,
            "prefix is optional"
        );
    }

    #[test]
    fn address_rejects_bad_input() {
        assert_eq!(
            "0x1234".parse::<Address>(),
            Err(ParseAddressError::InvalidLength(4))
        );
        assert!(matches!(
            "0xzz000000000000000000000000000000deadbeef".parse::<Address>(),
            Err(ParseAddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn asset_serde_accepts_numbers_and_strings() {
        let json = r#"{"token":"0x0000000000000000000000000000000000000001","amount":1000000}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.token, Address::from_low_u64_be(1));
        assert_eq!(asset.amount, U256::new(1_000_000));

        let json = r#"{"token":"0x0000000000000000000000000000000000000001","amount":"0xf4240"}"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.amount, U256::new(1_000_000));
    }
}
