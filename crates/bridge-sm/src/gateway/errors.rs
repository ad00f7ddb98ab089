//! Errors of the Gateway controller.

use omnibridge_primitives::{
    errors::ConversionError,
    types::{Address, ChainId},
    U256,
};
use omnibridge_transport::TransportError;
use omnibridge_wire::{MessageKind, WireError};
use thiserror::Error;

use crate::{errors::ErrorClass, gateway::state::LinkStatus, ledger::LedgerError};

/// Errors that can occur in the Gateway controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The caller is not the owner.
    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    /// A required address is zero.
    #[error("zero address")]
    ZeroAddress,

    /// The Gateway is paused.
    #[error("gateway is paused")]
    GatewayPaused,

    /// The token has no entry in the token table.
    #[error("token {0} is not registered")]
    TokenNotRegistered(Address),

    /// The token's link is not confirmed by the Hub.
    #[error("link of token {token} is {status}")]
    TokenNotConfirmed {
        /// The local token.
        token: Address,
        /// Where the link stands.
        status: LinkStatus,
    },

    /// The token is linked already.
    #[error("token {0} is already linked")]
    AlreadyLinked(Address),

    /// The token appears twice in a link request.
    #[error("token {0} appears twice in the request")]
    DuplicateToken(Address),

    /// Deposits of the token are paused.
    #[error("token {0} is paused")]
    TokenPaused(Address),

    /// The deposited amount is below the token's minimum.
    #[error("deposit of {amount} {token} is below the minimum of {min}")]
    BelowMinimumBridgeAmount {
        /// The local token.
        token: Address,
        /// Deposited amount, after dust removal.
        amount: U256,
        /// The token's minimum.
        min: U256,
    },

    /// Nothing is left of the amount after conversion.
    #[error("amount of {0} is too small to bridge")]
    AmountIsTooSmall(Address),

    /// An unlock asks for more than the Gateway holds on behalf of the Hub.
    #[error("unlock of {requested} {token} exceeds the locked {locked}")]
    InsufficientLockedBalance {
        /// The local token.
        token: Address,
        /// Requested amount.
        requested: U256,
        /// Locked amount.
        locked: U256,
    },

    /// A rescue would take tokens that back synthetic tokens.
    #[error("rescue of {requested} {token} exceeds the stranded {stranded}")]
    RescueExceedsStranded {
        /// The local token.
        token: Address,
        /// Requested amount.
        requested: U256,
        /// Custody balance not backing synthetic tokens.
        stranded: U256,
    },

    /// A link acknowledgement names a token that was never requested.
    #[error("acknowledgement for unrequested token {0}")]
    UnexpectedLinkAck(Address),

    /// The message does not come from the configured peer.
    #[error("sender {sender} on chain {chain} is not a peer")]
    UnknownPeer {
        /// The source chain.
        chain: ChainId,
        /// The sender.
        sender: Address,
    },

    /// The Gateway does not process this kind of message.
    #[error("gateway does not process {0} messages")]
    UnexpectedMessageKind(MessageKind),

    /// The batch has no items.
    #[error("batch is empty")]
    EmptyBatch,

    /// The batch has too many items.
    #[error("batch of {len} items exceeds the limit of {max}")]
    BatchTooLarge {
        /// Items in the batch.
        len: usize,
        /// The limit.
        max: usize,
    },

    /// A running total exceeds 256 bits.
    #[error("{0} overflows")]
    Overflow(&'static str),

    /// The payload could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// An amount could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A token contract refused the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The transport refused the operation.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Classifies the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotOwner(_)
            | Self::ZeroAddress
            | Self::TokenNotRegistered(_)
            | Self::TokenNotConfirmed { .. }
            | Self::AlreadyLinked(_)
            | Self::DuplicateToken(_)
            | Self::Conversion(ConversionError::DeltaOutOfRange(_))
            | Self::Ledger(LedgerError::UnknownToken(_))
            | Self::Transport(TransportError::InvalidPeer(_) | TransportError::NoPeer(_)) => {
                ErrorClass::Configuration
            }

            Self::GatewayPaused
            | Self::TokenPaused(_)
            | Self::BelowMinimumBridgeAmount { .. }
            | Self::AmountIsTooSmall(_)
            | Self::InsufficientLockedBalance { .. }
            | Self::RescueExceedsStranded { .. }
            | Self::EmptyBatch
            | Self::BatchTooLarge { .. }
            | Self::Ledger(LedgerError::InsufficientBalance { .. })
            | Self::Ledger(LedgerError::InsufficientAllowance { .. }) => ErrorClass::Gate,

            Self::UnexpectedLinkAck(_)
            | Self::UnknownPeer { .. }
            | Self::UnexpectedMessageKind(_)
            | Self::Wire(_) => ErrorClass::Malformed,

            Self::Transport(_) => ErrorClass::Transport,

            Self::Overflow(_) | Self::Conversion(_) | Self::Ledger(_) => ErrorClass::Accounting,
        }
    }
}

/// The result type for operations of the Gateway controller.
pub type GatewayResult<T> = Result<T, GatewayError>;
