//! The messages exchanged between the Hub and the Gateways.

use std::fmt;

use omnibridge_primitives::{
    decimals::DecimalsDelta,
    types::{Address, Amount, Asset},
};

use serde::{Deserialize, Serialize};

use crate::{
    codec::{WordReader, WordWriter},
    errors::WireError,
    MAX_BATCH_LEN,
};

/// Words per item in asset-carrying messages.
const ASSET_ITEM_WORDS: usize = 2;

/// Words per item in link request and link acknowledgement messages.
const LINK_ITEM_WORDS: usize = 6;

/// Number of header words preceding the items.
const HEADER_WORDS: usize = 3;

/// Tags reserved by the swap flows of the yield subsystem.
const SWAP_TAG: u8 = 2;
const REVERT_SWAP_TAG: u8 = 4;

/// The kind tag of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageKind {
    /// Gateway → Hub: real tokens were locked, mint synthetic tokens.
    Deposit = 0,
    /// Hub → Gateway: synthetic tokens were burned, release real tokens.
    Unlock = 1,
    /// Gateway → Hub: request links for a batch of local tokens.
    LinkRequest = 3,
    /// Hub → Gateway: per-token outcome of a link request.
    LinkAck = 5,
}

impl MessageKind {
    const fn item_words(self) -> usize {
        match self {
            Self::Deposit | Self::Unlock => ASSET_ITEM_WORDS,
            Self::LinkRequest | Self::LinkAck => LINK_ITEM_WORDS,
        }
    }

    fn from_tag(tag: u64) -> Result<Self, WireError> {
        match tag {
            0 => Ok(Self::Deposit),
            1 => Ok(Self::Unlock),
            3 => Ok(Self::LinkRequest),
            5 => Ok(Self::LinkAck),
            t if t == u64::from(SWAP_TAG) || t == u64::from(REVERT_SWAP_TAG) => {
                Err(WireError::UnsupportedKind(t as u8))
            }
            t => Err(WireError::UnknownKind(t)),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "Deposit",
            Self::Unlock => "Unlock",
            Self::LinkRequest => "LinkRequest",
            Self::LinkAck => "LinkAck",
        };
        f.write_str(name)
    }
}

/// A token configuration a Gateway asks the Hub to link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkRequestItem {
    /// The real token on the Gateway's chain.
    pub token: Address,
    /// Decimals of the synthetic token as known to the Gateway.
    pub synthetic_decimals: u8,
    /// The synthetic token on the Hub.
    pub synthetic_token: Address,
    /// `synthetic decimals - token decimals`.
    pub decimals_delta: DecimalsDelta,
    /// Minimum amount, in the token's base units, accepted for a deposit.
    pub min_bridge_amount: Amount,
    /// Whether the link starts out paused.
    pub paused: bool,
}

/// Why the Hub refused to link a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRejection {
    /// A different mapping for the token, or for the synthetic token on this chain, exists.
    AlreadyLinked,
    /// The synthetic token was never created on the Hub.
    UnknownSyntheticToken,
    /// The synthetic decimals in the request do not match the synthetic token.
    DecimalsMismatch,
    /// The token address is zero.
    ZeroAddress,
    /// Another gateway is already registered for the chain.
    GatewayMismatch,
}

impl fmt::Display for LinkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AlreadyLinked => "already linked",
            Self::UnknownSyntheticToken => "unknown synthetic token",
            Self::DecimalsMismatch => "decimals mismatch",
            Self::ZeroAddress => "zero address",
            Self::GatewayMismatch => "gateway mismatch",
        };
        f.write_str(reason)
    }
}

/// Outcome of a single [`LinkRequestItem`] on the Hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkAckStatus {
    /// A new link was created.
    Linked,
    /// An identical link already existed and is reported back unchanged.
    Existing,
    /// The Hub refused to link the token.
    Rejected(LinkRejection),
}

impl LinkAckStatus {
    const fn code(self) -> u8 {
        match self {
            Self::Linked => 0,
            Self::Existing => 1,
            Self::Rejected(LinkRejection::AlreadyLinked) => 16,
            Self::Rejected(LinkRejection::UnknownSyntheticToken) => 17,
            Self::Rejected(LinkRejection::DecimalsMismatch) => 18,
            Self::Rejected(LinkRejection::ZeroAddress) => 19,
            Self::Rejected(LinkRejection::GatewayMismatch) => 20,
        }
    }

    const fn from_code(code: u8) -> Result<Self, WireError> {
        Ok(match code {
            0 => Self::Linked,
            1 => Self::Existing,
            16 => Self::Rejected(LinkRejection::AlreadyLinked),
            17 => Self::Rejected(LinkRejection::UnknownSyntheticToken),
            18 => Self::Rejected(LinkRejection::DecimalsMismatch),
            19 => Self::Rejected(LinkRejection::ZeroAddress),
            20 => Self::Rejected(LinkRejection::GatewayMismatch),
            other => return Err(WireError::UnknownLinkStatus(other)),
        })
    }

    /// Whether the token is linked on the Hub after this outcome.
    pub const fn is_linked(self) -> bool {
        matches!(self, Self::Linked | Self::Existing)
    }
}

/// The Hub's answer for one requested token.
///
/// For linked tokens the configuration fields carry the Hub's authoritative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAckItem {
    /// The real token on the Gateway's chain.
    pub token: Address,
    /// Outcome on the Hub.
    pub status: LinkAckStatus,
    /// The synthetic token the real token maps to.
    pub synthetic_token: Address,
    /// `synthetic decimals - token decimals`.
    pub decimals_delta: DecimalsDelta,
    /// Minimum deposit amount in the token's base units.
    pub min_bridge_amount: Amount,
    /// Whether the link is paused on the Hub.
    pub paused: bool,
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BridgeMessage {
    /// Gateway → Hub deposit of locked tokens.
    Deposit {
        /// Receiver of the synthetic tokens on the Hub.
        recipient: Address,
        /// Locked tokens, denominated in the Gateway chain's tokens.
        assets: Vec<Asset>,
    },
    /// Hub → Gateway release of locked tokens.
    Unlock {
        /// Receiver of the real tokens on the Gateway's chain.
        recipient: Address,
        /// Tokens to release, denominated in the Gateway chain's tokens.
        assets: Vec<Asset>,
    },
    /// Gateway → Hub request to link tokens.
    LinkRequest {
        /// The token configurations.
        items: Vec<LinkRequestItem>,
    },
    /// Hub → Gateway outcome of a link request.
    LinkAck {
        /// One entry per requested token, in request order.
        items: Vec<LinkAckItem>,
    },
}

impl BridgeMessage {
    /// The kind tag of this message.
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Deposit { .. } => MessageKind::Deposit,
            Self::Unlock { .. } => MessageKind::Unlock,
            Self::LinkRequest { .. } => MessageKind::LinkRequest,
            Self::LinkAck { .. } => MessageKind::LinkAck,
        }
    }

    /// Number of items carried.
    pub fn len(&self) -> usize {
        match self {
            Self::Deposit { assets, .. } | Self::Unlock { assets, .. } => assets.len(),
            Self::LinkRequest { items } => items.len(),
            Self::LinkAck { items } => items.len(),
        }
    }

    /// Whether the message carries no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the encoded payload in bytes.
    pub fn encoded_len(&self) -> usize {
        (HEADER_WORDS + self.len() * self.kind().item_words()) * crate::WORD_SIZE
    }

    /// Encodes the message into its wire representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = WordWriter::with_words(HEADER_WORDS + self.len() * self.kind().item_words());
        let recipient = match self {
            Self::Deposit { recipient, .. } | Self::Unlock { recipient, .. } => *recipient,
            Self::LinkRequest { .. } | Self::LinkAck { .. } => Address::ZERO,
        };

        w.u64(self.kind() as u64)
            .address(&recipient)
            .u64(self.len() as u64);

        match self {
            Self::Deposit { assets, .. } | Self::Unlock { assets, .. } => {
                for asset in assets {
                    w.address(&asset.token).u256(asset.amount);
                }
            }
            Self::LinkRequest { items } => {
                for item in items {
                    w.address(&item.token)
                        .u64(u64::from(item.synthetic_decimals))
                        .address(&item.synthetic_token)
                        .delta(item.decimals_delta)
                        .u256(item.min_bridge_amount)
                        .bool(item.paused);
                }
            }
            Self::LinkAck { items } => {
                for item in items {
                    w.address(&item.token)
                        .u64(u64::from(item.status.code()))
                        .address(&item.synthetic_token)
                        .delta(item.decimals_delta)
                        .u256(item.min_bridge_amount)
                        .bool(item.paused);
                }
            }
        }

        w.finish()
    }

    /// Decodes a payload, rejecting anything that is not a canonical encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let mut r = WordReader::new(bytes);

        let kind = MessageKind::from_tag(r.u64("kind")?)?;
        let recipient = r.address("recipient")?;
        let count = r.u64("count")?;

        if count == 0 {
            return Err(WireError::EmptyBatch);
        }
        if count > MAX_BATCH_LEN as u64 {
            return Err(WireError::BatchTooLarge(count));
        }
        let count = count as usize;
        r.expect_exact(count * kind.item_words())?;

        let msg = match kind {
            MessageKind::Deposit | MessageKind::Unlock => {
                let assets = (0..count)
                    .map(|_| -> Result<Asset, WireError> {
                        Ok(Asset::new(r.address("token")?, r.u256()?))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                if kind == MessageKind::Deposit {
                    Self::Deposit { recipient, assets }
                } else {
                    Self::Unlock { recipient, assets }
                }
            }
            MessageKind::LinkRequest => {
                let items = (0..count)
                    .map(|_| -> Result<LinkRequestItem, WireError> {
                        Ok(LinkRequestItem {
                            token: r.address("token")?,
                            synthetic_decimals: r.u8("synthetic_decimals")?,
                            synthetic_token: r.address("synthetic_token")?,
                            decimals_delta: r.delta("decimals_delta")?,
                            min_bridge_amount: r.u256()?,
                            paused: r.bool("paused")?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Self::LinkRequest { items }
            }
            MessageKind::LinkAck => {
                let items = (0..count)
                    .map(|_| -> Result<LinkAckItem, WireError> {
                        Ok(LinkAckItem {
                            token: r.address("token")?,
                            status: LinkAckStatus::from_code(r.u8("status")?)?,
                            synthetic_token: r.address("synthetic_token")?,
                            decimals_delta: r.delta("decimals_delta")?,
                            min_bridge_amount: r.u256()?,
                            paused: r.bool("paused")?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Self::LinkAck { items }
            }
        };

        Ok(msg)
    }
}

impl fmt::Display for BridgeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit { recipient, assets } | Self::Unlock { recipient, assets } => write!(
                f,
                "{}(recipient: {recipient}, assets: {})",
                self.kind(),
                assets.len()
            ),
            Self::LinkRequest { items } => write!(f, "LinkRequest(items: {})", items.len()),
            Self::LinkAck { items } => write!(f, "LinkAck(items: {})", items.len()),
        }
    }
}
