//! Notifications emitted by the controllers while processing messages.

use std::fmt;

use omnibridge_primitives::{
    types::{Address, ChainId},
    U256,
};
use omnibridge_wire::LinkRejection;
use serde::{Deserialize, Serialize};

/// All signals of the bridge.
///
/// This is the sum of what the individual machines can emit, so that the orchestrator can collect
/// them in a single log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Emitted by the Hub.
    FromHub(HubSignal),

    /// Emitted by a Gateway.
    FromGateway(GatewaySignal),
}

/// Signals that the [Hub](crate::hub::machine::HubSM) can emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HubSignal {
    /// Synthetic tokens were minted for a deposit.
    Minted {
        /// Chain the deposit came from.
        src_chain: ChainId,
        /// The minted synthetic token.
        synthetic_token: Address,
        /// Receiver of the minted tokens.
        recipient: Address,
        /// Minted amount in synthetic units.
        amount: U256,
    },

    /// A deposit item was skipped under the per-item batch policy.
    DepositItemRejected {
        /// Chain the deposit came from.
        src_chain: ChainId,
        /// The remote token of the item.
        token: Address,
        /// The amount of the item in remote units.
        amount: U256,
        /// Why the item was skipped.
        reason: String,
    },
}

impl From<HubSignal> for Signal {
    fn from(sig: HubSignal) -> Self {
        Signal::FromHub(sig)
    }
}

/// Signals that a [Gateway](crate::gateway::machine::GatewaySM) can emit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewaySignal {
    /// Locked tokens were released to a recipient.
    Released {
        /// The released token.
        token: Address,
        /// Receiver of the tokens.
        recipient: Address,
        /// Released amount.
        amount: U256,
    },

    /// The Hub confirmed the link of a token.
    LinkConfirmed {
        /// The local token.
        token: Address,
        /// Its synthetic counterpart on the Hub.
        synthetic_token: Address,
    },

    /// The Hub refused to link a token.
    LinkRejected {
        /// The local token.
        token: Address,
        /// The Hub's reason.
        reason: LinkRejection,
    },
}

impl From<GatewaySignal> for Signal {
    fn from(sig: GatewaySignal) -> Self {
        Signal::FromGateway(sig)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::FromHub(HubSignal::Minted {
                src_chain,
                synthetic_token,
                recipient,
                amount,
            }) => write!(
                f,
                "minted {amount} of {synthetic_token} to {recipient} for a deposit from chain {src_chain}"
            ),
            Signal::FromHub(HubSignal::DepositItemRejected {
                src_chain,
                token,
                amount,
                reason,
            }) => write!(
                f,
                "skipped deposit of {amount} {token} from chain {src_chain}: {reason}"
            ),
            Signal::FromGateway(GatewaySignal::Released {
                token,
                recipient,
                amount,
            }) => write!(f, "released {amount} of {token} to {recipient}"),
            Signal::FromGateway(GatewaySignal::LinkConfirmed {
                token,
                synthetic_token,
            }) => write!(f, "link of {token} to {synthetic_token} confirmed"),
            Signal::FromGateway(GatewaySignal::LinkRejected { token, reason }) => {
                write!(f, "link of {token} rejected: {reason}")
            }
        }
    }
}
