//! The duties the Hub controller emits.

use std::fmt;

use omnibridge_primitives::types::{Address, ChainId};
use omnibridge_wire::{BridgeMessage, LinkAckItem};

/// Work the Hub needs done outside of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubDuty {
    /// Answer a link request.
    SendLinkAck {
        /// Chain of the requesting gateway.
        dst_chain: ChainId,
        /// The requesting gateway.
        receiver: Address,
        /// One item per requested token, in request order.
        items: Vec<LinkAckItem>,
    },
}

impl HubDuty {
    /// Destination chain and receiver of the message to send.
    pub const fn destination(&self) -> (ChainId, Address) {
        match self {
            HubDuty::SendLinkAck {
                dst_chain,
                receiver,
                ..
            } => (*dst_chain, *receiver),
        }
    }

    /// The message to send.
    pub fn message(&self) -> BridgeMessage {
        match self {
            HubDuty::SendLinkAck { items, .. } => BridgeMessage::LinkAck {
                items: items.clone(),
            },
        }
    }
}

impl fmt::Display for HubDuty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubDuty::SendLinkAck {
                dst_chain, items, ..
            } => write!(f, "SendLinkAck ({} items to chain {dst_chain})", items.len()),
        }
    }
}
