//! The state of the Gateway controller.

use std::{collections::BTreeMap, fmt};

use omnibridge_primitives::{decimals::DecimalsDelta, types::Address, U256};
use omnibridge_transport::PeerRegistry;
use omnibridge_wire::LinkRejection;
use serde::{Deserialize, Serialize};

use crate::ledger::AssetBook;

/// Where the link of a local token stands on the Hub, as far as the Gateway knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Requested, no acknowledgement yet.
    Pending,
    /// The Hub linked the token; the entry carries the Hub's values.
    Confirmed,
    /// The Hub refused the link. The token may be requested again.
    Rejected(LinkRejection),
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Confirmed => f.write_str("confirmed"),
            Self::Rejected(reason) => write!(f, "rejected ({reason})"),
        }
    }
}

/// The Gateway's mirror of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayTokenEntry {
    /// The real token on this chain.
    pub token: Address,
    /// Its synthetic counterpart on the Hub.
    pub synthetic_token: Address,
    /// Decimals of the synthetic token.
    pub synthetic_decimals: u8,
    /// `synthetic decimals - token decimals`.
    pub decimals_delta: DecimalsDelta,
    /// Smallest deposit accepted.
    #[serde(with = "ethnum::serde::permissive")]
    pub min_bridge_amount: U256,
    /// Whether deposits of the token are paused.
    pub paused: bool,
    /// Amount held on behalf of the Hub.
    #[serde(with = "ethnum::serde::permissive")]
    pub locked: U256,
    /// Where the link stands.
    pub status: LinkStatus,
}

impl GatewayTokenEntry {
    /// Whether deposits may use this entry.
    pub const fn is_confirmed(&self) -> bool {
        matches!(self.status, LinkStatus::Confirmed)
    }
}

/// Token entries of a Gateway keyed by the local token.
pub type TokenTable = BTreeMap<Address, GatewayTokenEntry>;

/// Everything a Gateway controller keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayState {
    /// The account allowed to administer the Gateway.
    pub owner: Address,

    /// Whether deposits and unlocks are halted.
    pub paused: bool,

    /// The Hub controller, keyed by the Hub chain.
    pub peers: PeerRegistry,

    /// Mirror of the Hub's links for local tokens.
    pub tokens: TokenTable,

    /// The token contracts of the chain, including the Gateway's custody balances.
    pub assets: AssetBook,
}

impl GatewayState {
    /// An empty Gateway administered by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            paused: false,
            peers: PeerRegistry::default(),
            tokens: TokenTable::new(),
            assets: AssetBook::default(),
        }
    }
}
