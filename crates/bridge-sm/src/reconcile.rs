//! Comparison of a Gateway's token table against the Hub's registry.
//!
//! The Hub is authoritative. A Gateway learns about its links only through acknowledgements, so
//! its table can lag behind or, after an owner changed a link on the Hub, disagree with it. The
//! locked balances only agree once every message between the two has been delivered.

use std::fmt;

use omnibridge_primitives::{decimals::DecimalsDelta, types::Address, U256};
use serde::{Deserialize, Serialize};

use crate::gateway::state::{GatewayTokenEntry, LinkStatus};

/// The Hub's view of one link to a Gateway's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkView {
    /// The real token on the Gateway's chain.
    pub token: Address,
    /// The synthetic token it is linked to.
    pub synthetic_token: Address,
    /// `synthetic decimals - token decimals`.
    pub decimals_delta: DecimalsDelta,
    /// Smallest deposit the Hub accepts.
    #[serde(with = "ethnum::serde::permissive")]
    pub min_bridge_amount: U256,
    /// Whether the Hub paused the link.
    pub paused: bool,
    /// Amount the Hub believes is locked in the Gateway.
    #[serde(with = "ethnum::serde::permissive")]
    pub locked: U256,
}

/// A disagreement between a Gateway and the Hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Drift {
    /// The Gateway considers the token linked but the Hub has no link.
    MissingOnHub {
        /// The local token.
        token: Address,
    },

    /// The Hub has a link the Gateway does not consider confirmed.
    NotConfirmed {
        /// The local token.
        token: Address,
        /// The Gateway's status, `None` if it has no entry.
        status: Option<LinkStatus>,
    },

    /// The token maps to another synthetic token on the Hub.
    SyntheticToken {
        /// The local token.
        token: Address,
        /// The Gateway's value.
        gateway: Address,
        /// The Hub's value.
        hub: Address,
    },

    /// The decimals deltas differ.
    DecimalsDelta {
        /// The local token.
        token: Address,
        /// The Gateway's value.
        gateway: DecimalsDelta,
        /// The Hub's value.
        hub: DecimalsDelta,
    },

    /// The minimum amounts differ.
    MinBridgeAmount {
        /// The local token.
        token: Address,
        /// The Gateway's value.
        #[serde(with = "ethnum::serde::permissive")]
        gateway: U256,
        /// The Hub's value.
        #[serde(with = "ethnum::serde::permissive")]
        hub: U256,
    },

    /// One side paused the token, the other did not.
    Paused {
        /// The local token.
        token: Address,
        /// The Gateway's value.
        gateway: bool,
        /// The Hub's value.
        hub: bool,
    },

    /// The locked balances differ.
    Locked {
        /// The local token.
        token: Address,
        /// The Gateway's value.
        #[serde(with = "ethnum::serde::permissive")]
        gateway: U256,
        /// The Hub's value.
        #[serde(with = "ethnum::serde::permissive")]
        hub: U256,
    },
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOnHub { token } => write!(f, "{token} is not linked on the hub"),
            Self::NotConfirmed { token, status } => match status {
                Some(status) => write!(f, "{token} is linked on the hub but {status} locally"),
                None => write!(f, "{token} is linked on the hub but unknown locally"),
            },
            Self::SyntheticToken {
                token,
                gateway,
                hub,
            } => write!(f, "{token} maps to {gateway} locally, {hub} on the hub"),
            Self::DecimalsDelta {
                token,
                gateway,
                hub,
            } => write!(f, "{token} has delta {gateway} locally, {hub} on the hub"),
            Self::MinBridgeAmount {
                token,
                gateway,
                hub,
            } => write!(f, "{token} has minimum {gateway} locally, {hub} on the hub"),
            Self::Paused {
                token,
                gateway,
                hub,
            } => write!(f, "{token} is paused={gateway} locally, paused={hub} on the hub"),
            Self::Locked {
                token,
                gateway,
                hub,
            } => write!(f, "{token} has {gateway} locked locally, {hub} on the hub"),
        }
    }
}

/// Compares `entries` of a Gateway against the Hub's `links` to the Gateway's chain.
pub fn reconcile<'a>(
    entries: impl IntoIterator<Item = &'a GatewayTokenEntry>,
    links: &[LinkView],
) -> Vec<Drift> {
    let mut drifts = Vec::new();
    let mut seen = Vec::with_capacity(links.len());

    for entry in entries {
        let Some(link) = links.iter().find(|link| link.token == entry.token) else {
            if entry.is_confirmed() {
                drifts.push(Drift::MissingOnHub { token: entry.token });
            }
            continue;
        };
        seen.push(link.token);

        if !entry.is_confirmed() {
            drifts.push(Drift::NotConfirmed {
                token: entry.token,
                status: Some(entry.status),
            });
            continue;
        }

        compare(entry, link, &mut drifts);
    }

    for link in links {
        if !seen.contains(&link.token) {
            drifts.push(Drift::NotConfirmed {
                token: link.token,
                status: None,
            });
        }
    }

    drifts
}

fn compare(entry: &GatewayTokenEntry, link: &LinkView, drifts: &mut Vec<Drift>) {
    let token = entry.token;

    if entry.synthetic_token != link.synthetic_token {
        drifts.push(Drift::SyntheticToken {
            token,
            gateway: entry.synthetic_token,
            hub: link.synthetic_token,
        });
    }
    if entry.decimals_delta != link.decimals_delta {
        drifts.push(Drift::DecimalsDelta {
            token,
            gateway: entry.decimals_delta,
            hub: link.decimals_delta,
        });
    }
    if entry.min_bridge_amount != link.min_bridge_amount {
        drifts.push(Drift::MinBridgeAmount {
            token,
            gateway: entry.min_bridge_amount,
            hub: link.min_bridge_amount,
        });
    }
    if entry.paused != link.paused {
        drifts.push(Drift::Paused {
            token,
            gateway: entry.paused,
            hub: link.paused,
        });
    }
    if entry.locked != link.locked {
        drifts.push(Drift::Locked {
            token,
            gateway: entry.locked,
            hub: link.locked,
        });
    }
}
