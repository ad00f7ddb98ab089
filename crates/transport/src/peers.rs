//! Trusted remote applications per chain.

use std::collections::BTreeMap;

use omnibridge_primitives::types::{Address, ChainId};
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

/// Maps each remote chain to the single application trusted to send from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRegistry(BTreeMap<ChainId, Address>);

impl PeerRegistry {
    /// Sets or replaces the peer for `chain`.
    pub fn set(&mut self, chain: ChainId, peer: Address) -> Result<(), TransportError> {
        if peer.is_zero() {
            return Err(TransportError::InvalidPeer(chain));
        }

        self.0.insert(chain, peer);
        Ok(())
    }

    /// The peer configured for `chain`.
    pub fn get(&self, chain: ChainId) -> Option<Address> {
        self.0.get(&chain).copied()
    }

    /// The peer for `chain`, or [`TransportError::NoPeer`].
    pub fn require(&self, chain: ChainId) -> Result<Address, TransportError> {
        self.get(chain).ok_or(TransportError::NoPeer(chain))
    }

    /// Whether `sender` is the configured peer for `chain`.
    pub fn is_peer(&self, chain: ChainId, sender: &Address) -> bool {
        self.get(chain).is_some_and(|peer| peer == *sender)
    }

    /// Iterates over all configured peers.
    pub fn iter(&self) -> impl Iterator<Item = (ChainId, Address)> + '_ {
        self.0.iter().map(|(chain, peer)| (*chain, *peer))
    }
}
