//! Inbound channel bookkeeping.
//!
//! A nonce on a channel moves from `Unseen` to `Verified` and from there to either `Executed` or
//! `Skipped`. The last two are final. All nonces up to and including [`Channel::inbound_nonce`]
//! are final; everything above it is `Verified` or `Unseen`.

use std::collections::{BTreeMap, BTreeSet};

use omnibridge_primitives::types::Nonce;
use serde::{Deserialize, Serialize};

use crate::types::{Guid, PayloadHash};

/// Lifecycle state of a single nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceState {
    /// Nothing is known about the nonce yet.
    Unseen,
    /// The payload hash is recorded and the message awaits execution.
    Verified,
    /// The message was delivered to the receiver (or cleared by its owner).
    Executed,
    /// The receiver's owner gave up on the message.
    Skipped,
}

impl NonceState {
    /// Whether the state can no longer change.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Executed | Self::Skipped)
    }
}

/// A verified message that has not run yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMessage {
    /// Id of the message.
    pub guid: Guid,

    /// Hash recorded at verification.
    pub payload_hash: PayloadHash,

    /// Gas limit the sender paid for.
    pub gas_limit: u64,

    /// Failed execution attempts so far.
    pub attempts: u32,

    /// Reason of the last failed attempt.
    pub last_error: Option<String>,
}

/// State of one inbound channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    inbound_nonce: Nonce,
    pending: BTreeMap<Nonce, PendingMessage>,
    skipped: BTreeSet<Nonce>,
}

impl Channel {
    /// Highest nonce such that it and every nonce below it are final.
    pub const fn inbound_nonce(&self) -> Nonce {
        self.inbound_nonce
    }

    /// The only nonce that may be executed, skipped or cleared next.
    pub const fn next_nonce(&self) -> Nonce {
        self.inbound_nonce + 1
    }

    /// Highest nonce such that every nonce up to it is final or verified.
    pub fn verified_nonce(&self) -> Nonce {
        let mut nonce = self.inbound_nonce;
        while self.pending.contains_key(&(nonce + 1)) {
            nonce += 1;
        }

        nonce
    }

    /// State of `nonce` on this channel.
    pub fn state(&self, nonce: Nonce) -> NonceState {
        if nonce <= self.inbound_nonce {
            if self.skipped.contains(&nonce) {
                NonceState::Skipped
            } else {
                NonceState::Executed
            }
        } else if self.pending.contains_key(&nonce) {
            NonceState::Verified
        } else {
            NonceState::Unseen
        }
    }

    /// The verified message with `nonce`, if any.
    pub fn pending(&self, nonce: Nonce) -> Option<&PendingMessage> {
        self.pending.get(&nonce)
    }

    /// All verified messages in nonce order.
    pub fn pending_messages(&self) -> impl Iterator<Item = (Nonce, &PendingMessage)> + '_ {
        self.pending.iter().map(|(nonce, msg)| (*nonce, msg))
    }

    /// Nonces that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = Nonce> + '_ {
        self.skipped.iter().copied()
    }

    pub(crate) fn pending_mut(&mut self, nonce: Nonce) -> Option<&mut PendingMessage> {
        self.pending.get_mut(&nonce)
    }

    pub(crate) fn insert_verified(&mut self, nonce: Nonce, message: PendingMessage) {
        self.pending.insert(nonce, message);
    }

    /// Moves the next nonce into a final state.
    pub(crate) fn finalize(&mut self, nonce: Nonce, skipped: bool) {
        debug_assert_eq!(nonce, self.next_nonce(), "channel must finalize in order");

        self.pending.remove(&nonce);
        if skipped {
            self.skipped.insert(nonce);
        }
        self.inbound_nonce = nonce;
    }
}

#[cfg(test)]
mod tests {
    use omnibridge_primitives::types::Address;

    use super::*;

    fn pending(nonce: Nonce) -> PendingMessage {
        let guid = Guid::derive(nonce, 1, &Address::ZERO, 2, &Address::ZERO);
        PendingMessage {
            guid,
            payload_hash: PayloadHash::compute(&guid, &[]),
            gas_limit: 0,
            attempts: 0,
            last_error: None,
        }
    }

    #[test]
    fn verified_nonce_stops_at_first_gap() {
        let mut channel = Channel::default();
        channel.insert_verified(1, pending(1));
        channel.insert_verified(2, pending(2));
        channel.insert_verified(4, pending(4));

        assert_eq!(channel.inbound_nonce(), 0);
        assert_eq!(channel.verified_nonce(), 2);
        assert_eq!(channel.state(3), NonceState::Unseen);
        assert_eq!(channel.state(4), NonceState::Verified);
    }

    #[test]
    fn finalized_nonces_keep_their_outcome() {
        let mut channel = Channel::default();
        channel.insert_verified(1, pending(1));
        channel.insert_verified(2, pending(2));

        channel.finalize(1, false);
        channel.finalize(2, true);

        assert_eq!(channel.inbound_nonce(), 2);
        assert_eq!(channel.state(1), NonceState::Executed);
        assert_eq!(channel.state(2), NonceState::Skipped);
        assert!(channel.state(2).is_final());
        assert_eq!(channel.pending_messages().count(), 0);
        assert_eq!(channel.skipped().collect::<Vec<_>>(), vec![2]);
    }
}
