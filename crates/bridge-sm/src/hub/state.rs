//! The state of the Hub controller.

use omnibridge_primitives::types::Address;
use omnibridge_transport::PeerRegistry;
use serde::Serialize;

use crate::{hub::registry::LinkRegistry, ledger::AssetBook};

/// Everything the Hub controller keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubState {
    /// The account allowed to administer the Hub.
    pub owner: Address,

    /// Whether deposits and withdrawals are halted.
    pub paused: bool,

    /// The gateway trusted on each chain.
    pub peers: PeerRegistry,

    /// Synthetic tokens and their links.
    pub registry: LinkRegistry,

    /// Balances of the synthetic tokens.
    pub ledgers: AssetBook,
}

impl HubState {
    /// An empty Hub administered by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            paused: false,
            peers: PeerRegistry::default(),
            registry: LinkRegistry::default(),
            ledgers: AssetBook::default(),
        }
    }
}
