//! Errors returned by the transport.

use omnibridge_primitives::{
    types::{ChainId, Nonce},
    U256,
};
use thiserror::Error;

use crate::types::ChannelKey;

/// Failures of endpoint operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The paid fee is below the quote.
    #[error("insufficient fee: required {required}, provided {provided}")]
    InsufficientFee {
        /// The quoted fee.
        required: U256,
        /// The fee that was paid.
        provided: U256,
    },

    /// The payload exceeds the endpoint's size limit.
    #[error("message of {size} bytes exceeds the limit of {max}")]
    MessageTooLarge {
        /// Payload size.
        size: usize,
        /// Size limit.
        max: usize,
    },

    /// A packet was delivered to the wrong endpoint.
    #[error("packet for chain {got} delivered to chain {expected}")]
    WrongDestination {
        /// Chain of this endpoint.
        expected: ChainId,
        /// Destination named in the packet.
        got: ChainId,
    },

    /// No message with this nonce has been verified on the channel.
    #[error("nonce {nonce} is not verified on {channel}")]
    NotVerified {
        /// The channel.
        channel: ChannelKey,
        /// The nonce.
        nonce: Nonce,
    },

    /// The nonce is not the next one to be executed on its channel.
    #[error("nonce {got} cannot run before {expected} on {channel}")]
    OutOfOrder {
        /// The channel.
        channel: ChannelKey,
        /// Next executable nonce.
        expected: Nonce,
        /// Requested nonce.
        got: Nonce,
    },

    /// The nonce was skipped and can never be executed.
    #[error("nonce {nonce} was skipped on {channel}")]
    NonceSkipped {
        /// The channel.
        channel: ChannelKey,
        /// The nonce.
        nonce: Nonce,
    },

    /// The supplied payload does not match the verified payload hash.
    #[error("payload does not match the hash verified for nonce {nonce}")]
    PayloadHashMismatch {
        /// The nonce.
        nonce: Nonce,
    },

    /// A different payload was already verified for the nonce.
    #[error("a different payload is already verified for nonce {nonce}")]
    PayloadHashConflict {
        /// The nonce.
        nonce: Nonce,
    },

    /// The gas limit does not cover the execution.
    #[error("out of gas: execution needs {required}, limit is {provided}")]
    OutOfGas {
        /// Gas needed.
        required: u64,
        /// Gas available.
        provided: u64,
    },

    /// The caller is not allowed to manage the receiver's channel.
    #[error("caller is not the owner of the receiver")]
    Unauthorized,

    /// A peer cannot be the zero address.
    #[error("invalid peer for chain {0}")]
    InvalidPeer(ChainId),

    /// No peer is configured for the destination chain.
    #[error("no peer configured for chain {0}")]
    NoPeer(ChainId),
}

impl TransportError {
    /// Whether retrying the same call later may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::OutOfOrder { .. } | Self::OutOfGas { .. })
    }
}

/// Failure to execute an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError<E> {
    /// The endpoint refused to run the message.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The receiving application rejected the message. Its state is unchanged and the message
    /// remains verified.
    #[error("receiver reverted: {0}")]
    Reverted(E),
}
