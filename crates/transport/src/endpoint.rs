//! The per-chain messaging endpoint.

use std::collections::{BTreeMap, VecDeque};

use omnibridge_params::transport::TransportParams;
use omnibridge_primitives::{
    types::{Address, ChainId, Nonce},
    U256,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    channel::{Channel, NonceState, PendingMessage},
    errors::{ExecuteError, TransportError},
    receiver::{MessageReceiver, MessageSender},
    types::{
        ChannelKey, Guid, MessagingFee, MessagingReceipt, Origin, Packet, PayloadHash, SendOptions,
    },
};

/// Outcome of [`Endpoint::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The payload hash was recorded.
    Verified,
    /// The same payload was verified before.
    AlreadyVerified,
    /// The nonce is already executed or skipped.
    AlreadyFinal(NonceState),
    /// The sender is not the receiver's peer for the source chain. Nothing was recorded on the
    /// channel, see [`Endpoint::peer_rejections`].
    PeerRejected,
}

/// Outcome of a successful [`Endpoint::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    /// The receiver applied the message.
    Executed(T),
    /// The message had been executed before; nothing happened.
    AlreadyExecuted,
}

/// A packet refused at verification because it did not come from a configured peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRejection {
    /// Channel the packet tried to enter.
    pub channel: ChannelKey,

    /// Nonce of the packet.
    pub nonce: Nonce,

    /// Id of the packet.
    pub guid: Guid,

    /// The receiver's configured peer for the source chain at the time.
    pub expected_peer: Option<Address>,
}

/// Messaging endpoint of a single chain.
#[derive(Debug, Clone)]
pub struct Endpoint {
    chain_id: ChainId,
    params: TransportParams,
    outbound_nonces: BTreeMap<(Address, ChainId, Address), Nonce>,
    channels: BTreeMap<ChannelKey, Channel>,
    outbox: VecDeque<Packet>,
    collected_fees: U256,
    peer_rejections: Vec<PeerRejection>,
}

impl Endpoint {
    /// Creates the endpoint of `chain_id`.
    pub fn new(chain_id: ChainId, params: TransportParams) -> Self {
        Self {
            chain_id,
            params,
            outbound_nonces: BTreeMap::new(),
            channels: BTreeMap::new(),
            outbox: VecDeque::new(),
            collected_fees: U256::ZERO,
            peer_rejections: Vec::new(),
        }
    }

    /// The transport parameters in use.
    pub const fn params(&self) -> &TransportParams {
        &self.params
    }

    /// Fees collected from senders on this chain.
    pub const fn collected_fees(&self) -> U256 {
        self.collected_fees
    }

    /// Last nonce assigned on the outbound path.
    pub fn outbound_nonce(
        &self,
        sender: &Address,
        dst_chain: ChainId,
        receiver: &Address,
    ) -> Nonce {
        self.outbound_nonces
            .get(&(*sender, dst_chain, *receiver))
            .copied()
            .unwrap_or_default()
    }

    /// Number of sent packets not yet picked up by a relayer.
    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    /// Hands all sent packets over to the relayer, oldest first.
    pub fn drain_outbox(&mut self) -> Vec<Packet> {
        self.outbox.drain(..).collect()
    }

    /// Records the payload hash of an inbound packet.
    ///
    /// Packets whose sender is not the receiver's peer are dropped without touching the channel.
    pub fn verify<R: MessageReceiver>(
        &mut self,
        packet: &Packet,
        receiver: &R,
    ) -> Result<Verification, TransportError> {
        if packet.dst_chain != self.chain_id {
            return Err(TransportError::WrongDestination {
                expected: self.chain_id,
                got: packet.dst_chain,
            });
        }

        let key = packet.channel();
        let nonce = packet.origin.nonce;

        if !receiver.allow_initialize_path(&packet.origin) {
            let rejection = PeerRejection {
                channel: key,
                nonce,
                guid: packet.guid,
                expected_peer: receiver.peers().get(packet.origin.src_chain),
            };
            warn!(chain = self.chain_id, channel = %key, %nonce, expected_peer = ?rejection.expected_peer, "rejecting packet from unknown peer");
            self.peer_rejections.push(rejection);

            return Ok(Verification::PeerRejected);
        }

        let channel = self.channels.entry(key).or_default();
        let state = channel.state(nonce);
        if state.is_final() {
            debug!(chain = self.chain_id, channel = %key, %nonce, ?state, "ignoring packet for finalized nonce");
            return Ok(Verification::AlreadyFinal(state));
        }

        let payload_hash = packet.payload_hash();
        if let Some(existing) = channel.pending(nonce) {
            if existing.payload_hash == payload_hash {
                return Ok(Verification::AlreadyVerified);
            }

            return Err(TransportError::PayloadHashConflict { nonce });
        }

        channel.insert_verified(
            nonce,
            PendingMessage {
                guid: packet.guid,
                payload_hash,
                gas_limit: packet.gas_limit,
                attempts: 0,
                last_error: None,
            },
        );
        debug!(chain = self.chain_id, channel = %key, %nonce, guid = %packet.guid, "packet verified");

        Ok(Verification::Verified)
    }

    /// Delivers a verified packet to its receiver.
    ///
    /// `gas_limit` overrides the limit the sender paid for, which is how a message that ran out of
    /// gas is retried. A failed attempt leaves the message verified and records the reason.
    pub fn execute<R: MessageReceiver>(
        &mut self,
        packet: &Packet,
        gas_limit: Option<u64>,
        receiver: &mut R,
    ) -> Result<Delivery<R::Output>, ExecuteError<R::Error>> {
        let key = packet.channel();
        let nonce = packet.origin.nonce;
        let channel = self.channels.get_mut(&key).ok_or(TransportError::NotVerified {
            channel: key,
            nonce,
        })?;

        let paid_gas = match check_next(channel, key, nonce, &packet.payload_hash())? {
            Some(pending) => pending.gas_limit,
            None => return Ok(Delivery::AlreadyExecuted),
        };

        let gas_limit = gas_limit.unwrap_or(paid_gas);
        let required = self.params.execution_gas(packet.message.len());
        if required > gas_limit {
            let err = TransportError::OutOfGas {
                required,
                provided: gas_limit,
            };
            warn!(chain = self.chain_id, channel = %key, %nonce, %err, "execution failed");
            record_failure(channel, nonce, err.to_string());

            return Err(err.into());
        }

        match receiver.receive(&packet.origin, &packet.guid, &packet.message) {
            Ok(output) => {
                channel.finalize(nonce, false);
                info!(chain = self.chain_id, channel = %key, %nonce, guid = %packet.guid, "message executed");

                Ok(Delivery::Executed(output))
            }
            Err(err) => {
                warn!(chain = self.chain_id, channel = %key, %nonce, %err, "receiver reverted");
                record_failure(channel, nonce, err.to_string());

                Err(ExecuteError::Reverted(err))
            }
        }
    }

    /// Gives up on the next verified message of a channel. Only the receiver's owner may skip.
    pub fn skip<R: MessageReceiver>(
        &mut self,
        caller: &Address,
        receiver: &R,
        origin: &Origin,
    ) -> Result<(), TransportError> {
        if *caller != receiver.owner() {
            return Err(TransportError::Unauthorized);
        }

        let key = ChannelKey::of(receiver.address(), origin);
        let nonce = origin.nonce;
        let channel = self
            .channels
            .get_mut(&key)
            .ok_or(TransportError::NotVerified { channel: key, nonce })?;

        if nonce != channel.next_nonce() {
            return Err(TransportError::OutOfOrder {
                channel: key,
                expected: channel.next_nonce(),
                got: nonce,
            });
        }
        if channel.state(nonce) != NonceState::Verified {
            return Err(TransportError::NotVerified { channel: key, nonce });
        }

        channel.finalize(nonce, true);
        warn!(chain = self.chain_id, channel = %key, %nonce, "message skipped");

        Ok(())
    }

    /// Marks the next verified message as executed without delivering it. Only the receiver's
    /// owner may clear, and only with the exact payload that was verified.
    pub fn clear<R: MessageReceiver>(
        &mut self,
        caller: &Address,
        receiver: &R,
        packet: &Packet,
    ) -> Result<(), TransportError> {
        if *caller != receiver.owner() || packet.receiver != receiver.address() {
            return Err(TransportError::Unauthorized);
        }

        let key = packet.channel();
        let nonce = packet.origin.nonce;
        let channel = self
            .channels
            .get_mut(&key)
            .ok_or(TransportError::NotVerified { channel: key, nonce })?;

        if check_next(channel, key, nonce, &packet.payload_hash())?.is_none() {
            // clearing twice is a no-op
            return Ok(());
        }

        channel.finalize(nonce, false);
        warn!(chain = self.chain_id, channel = %key, %nonce, "message cleared without execution");

        Ok(())
    }

    /// The inbound channel `key`, if anything was ever verified on it.
    pub fn channel(&self, key: &ChannelKey) -> Option<&Channel> {
        self.channels.get(key)
    }

    /// All inbound channels.
    pub fn channels(&self) -> impl Iterator<Item = (&ChannelKey, &Channel)> + '_ {
        self.channels.iter()
    }

    /// Highest nonce of `key` such that it and all nonces below it are final.
    pub fn inbound_nonce(&self, key: &ChannelKey) -> Nonce {
        self.channel(key).map(Channel::inbound_nonce).unwrap_or_default()
    }

    /// Highest nonce of `key` up to which every nonce is final or verified.
    pub fn verified_nonce(&self, key: &ChannelKey) -> Nonce {
        self.channel(key).map(Channel::verified_nonce).unwrap_or_default()
    }

    /// State of `nonce` on `key`.
    pub fn nonce_state(&self, key: &ChannelKey, nonce: Nonce) -> NonceState {
        self.channel(key)
            .map_or(NonceState::Unseen, |channel| channel.state(nonce))
    }

    /// Payload hash recorded for a verified nonce.
    pub fn inbound_payload_hash(&self, key: &ChannelKey, nonce: Nonce) -> Option<PayloadHash> {
        self.channel(key)
            .and_then(|channel| channel.pending(nonce))
            .map(|pending| pending.payload_hash)
    }

    /// Packets refused because they did not come from a peer.
    pub fn peer_rejections(&self) -> &[PeerRejection] {
        &self.peer_rejections
    }

    fn quote_fee(&self, message_len: usize, options: &SendOptions) -> Result<U256, TransportError> {
        if message_len > self.params.max_message_size {
            return Err(TransportError::MessageTooLarge {
                size: message_len,
                max: self.params.max_message_size,
            });
        }

        let gas_limit = options.gas_limit.unwrap_or(self.params.default_gas_limit);
        let gas_fee = self.params.gas_price.saturating_mul(U256::from(gas_limit));
        let byte_fee = self
            .params
            .per_byte_fee
            .saturating_mul(U256::from(message_len as u64));

        Ok(self
            .params
            .base_fee
            .saturating_add(gas_fee)
            .saturating_add(byte_fee))
    }
}

impl MessageSender for Endpoint {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn quote(
        &self,
        _dst_chain: ChainId,
        message_len: usize,
        options: &SendOptions,
    ) -> Result<MessagingFee, TransportError> {
        self.quote_fee(message_len, options)
            .map(|native_fee| MessagingFee { native_fee })
    }

    fn send(
        &mut self,
        sender: Address,
        dst_chain: ChainId,
        receiver: Address,
        message: Vec<u8>,
        options: &SendOptions,
        fee: U256,
    ) -> Result<MessagingReceipt, TransportError> {
        let required = self.quote_fee(message.len(), options)?;
        if fee < required {
            return Err(TransportError::InsufficientFee {
                required,
                provided: fee,
            });
        }

        let nonce = self
            .outbound_nonces
            .entry((sender, dst_chain, receiver))
            .or_default();
        *nonce += 1;
        let nonce = *nonce;

        let guid = Guid::derive(nonce, self.chain_id, &sender, dst_chain, &receiver);
        let packet = Packet {
            origin: Origin {
                src_chain: self.chain_id,
                sender,
                nonce,
            },
            dst_chain,
            receiver,
            guid,
            message,
            gas_limit: options.gas_limit.unwrap_or(self.params.default_gas_limit),
        };
        info!(chain = self.chain_id, %dst_chain, %sender, %receiver, %nonce, %guid, len = packet.message.len(), "message sent");

        self.outbox.push_back(packet);
        self.collected_fees = self.collected_fees.saturating_add(required);

        Ok(MessagingReceipt {
            guid,
            nonce,
            fee: required,
        })
    }
}

/// Checks that `nonce` is the next executable nonce of `channel` and matches `payload_hash`.
///
/// Returns `None` if the nonce was already executed.
fn check_next<'c>(
    channel: &'c Channel,
    key: ChannelKey,
    nonce: Nonce,
    payload_hash: &PayloadHash,
) -> Result<Option<&'c PendingMessage>, TransportError> {
    match channel.state(nonce) {
        NonceState::Executed => return Ok(None),
        NonceState::Skipped => return Err(TransportError::NonceSkipped { channel: key, nonce }),
        NonceState::Unseen => return Err(TransportError::NotVerified { channel: key, nonce }),
        NonceState::Verified => {}
    }

    if nonce != channel.next_nonce() {
        return Err(TransportError::OutOfOrder {
            channel: key,
            expected: channel.next_nonce(),
            got: nonce,
        });
    }

    match channel.pending(nonce) {
        Some(pending) if pending.payload_hash == *payload_hash => Ok(Some(pending)),
        Some(_) => Err(TransportError::PayloadHashMismatch { nonce }),
        None => Err(TransportError::NotVerified { channel: key, nonce }),
    }
}

fn record_failure(channel: &mut Channel, nonce: Nonce, reason: String) {
    if let Some(pending) = channel.pending_mut(nonce) {
        pending.attempts += 1;
        pending.last_error = Some(reason);
    }
}
