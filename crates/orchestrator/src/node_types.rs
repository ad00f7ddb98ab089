//! Unified types for node identity and controller output.

use std::fmt::Display;

use omnibridge_primitives::types::ChainId;
use omnibridge_sm::{gateway::duties::GatewayDuty, hub::duties::HubDuty};
use serde::Serialize;

/// The unique identifier of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    /// The Hub, on the given chain.
    Hub(ChainId),
    /// The Gateway on the given chain.
    Gateway(ChainId),
}

impl NodeId {
    /// The chain the node lives on.
    pub const fn chain(&self) -> ChainId {
        match self {
            NodeId::Hub(chain) | NodeId::Gateway(chain) => *chain,
        }
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeId::Hub(chain) => write!(f, "Hub({chain})"),
            NodeId::Gateway(chain) => write!(f, "Gateway({chain})"),
        }
    }
}

/// A wrapper for holding all the different types of duties that a controller can emit after a
/// successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifiedDuty {
    /// A duty of the Hub.
    Hub(HubDuty),
    /// A duty of a Gateway.
    Gateway(GatewayDuty),
}

impl Display for UnifiedDuty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnifiedDuty::Hub(duty) => write!(f, "Hub({duty})"),
            UnifiedDuty::Gateway(duty) => write!(f, "Gateway({duty})"),
        }
    }
}
