//! Errors of the Hub controller.

use omnibridge_primitives::{
    errors::ConversionError,
    types::{Address, ChainId, TokenIdx},
    U256,
};
use omnibridge_transport::TransportError;
use omnibridge_wire::{LinkRejection, MessageKind, WireError};
use thiserror::Error;

use crate::{errors::ErrorClass, ledger::LedgerError};

/// Errors that can occur in the Hub controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The caller is not the owner.
    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    /// A different link for the remote token, or for the synthetic token on the chain, exists.
    #[error("token {token} on chain {chain} is already linked")]
    AlreadyLinked {
        /// The remote chain.
        chain: ChainId,
        /// The remote token.
        token: Address,
    },

    /// The synthetic token does not exist.
    #[error("unknown synthetic token {0}")]
    UnknownSyntheticToken(Address),

    /// No synthetic token has this index.
    #[error("unknown synthetic token index {0}")]
    UnknownTokenIndex(TokenIdx),

    /// A required address is zero.
    #[error("zero address")]
    ZeroAddress,

    /// Another gateway is registered for the chain.
    #[error("chain {chain} is served by gateway {expected}, not {got}")]
    GatewayMismatch {
        /// The remote chain.
        chain: ChainId,
        /// The registered gateway.
        expected: Address,
        /// The offending gateway.
        got: Address,
    },

    /// A synthetic token with the symbol exists.
    #[error("symbol {0} is taken")]
    SymbolTaken(String),

    /// A link request names the wrong number of synthetic decimals.
    #[error("synthetic token {token} has {actual} decimals, request says {requested}")]
    DecimalsMismatch {
        /// The synthetic token.
        token: Address,
        /// Decimals named in the request.
        requested: u8,
        /// Decimals of the synthetic token.
        actual: u8,
    },

    /// No link exists for a deposited remote token.
    #[error("token {token} from chain {chain} is not registered")]
    TokenNotRegistered {
        /// The remote chain.
        chain: ChainId,
        /// The remote token.
        token: Address,
    },

    /// No gateway is registered for the destination chain.
    #[error("no gateway is registered for chain {0}")]
    NoGatewayForChain(ChainId),

    /// The synthetic token has no link to the destination chain.
    #[error("token {token} is not linked to chain {chain}")]
    TokenNotLinkedToDestChain {
        /// The synthetic token.
        token: Address,
        /// The destination chain.
        chain: ChainId,
    },

    /// The link is paused.
    #[error("token {token} on chain {chain} is paused")]
    TokenPaused {
        /// The remote chain.
        chain: ChainId,
        /// The remote token.
        token: Address,
    },

    /// The Hub is paused.
    #[error("hub is paused")]
    HubPaused,

    /// The deposited amount is below the link's minimum.
    #[error("deposit of {amount} {token} is below the minimum of {min}")]
    BelowMinimumBridgeAmount {
        /// The remote token.
        token: Address,
        /// Deposited amount.
        amount: U256,
        /// The link's minimum.
        min: U256,
    },

    /// Nothing is left of the amount after conversion.
    #[error("amount of {0} is too small to bridge")]
    AmountIsTooSmall(Address),

    /// The destination gateway does not hold enough of the remote token.
    #[error("chain {chain} holds {available} of {token}, {requested} requested")]
    InsufficientBalanceOnDestChain {
        /// The remote token.
        token: Address,
        /// The destination chain.
        chain: ChainId,
        /// Requested amount in remote units.
        requested: U256,
        /// Locked amount in remote units.
        available: U256,
    },

    /// The message does not come from the configured peer.
    #[error("sender {sender} on chain {chain} is not a peer")]
    UnknownPeer {
        /// The source chain.
        chain: ChainId,
        /// The sender.
        sender: Address,
    },

    /// The Hub does not process this kind of message.
    #[error("hub does not process {0} messages")]
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

    /// Every item of a per-item batch was rejected.
    #[error("all {rejected} items were rejected, first: {first}")]
    BatchRejected {
        /// Number of rejected items.
        rejected: usize,
        /// Reason of the first rejection.
        first: Box<HubError>,
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

    /// A synthetic token ledger refused the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The transport refused the operation.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl HubError {
    /// Classifies the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotOwner(_)
            | Self::AlreadyLinked { .. }
            | Self::UnknownSyntheticToken(_)
            | Self::UnknownTokenIndex(_)
            | Self::ZeroAddress
            | Self::GatewayMismatch { .. }
            | Self::SymbolTaken(_)
            | Self::DecimalsMismatch { .. }
            | Self::TokenNotRegistered { .. }
            | Self::NoGatewayForChain(_)
            | Self::TokenNotLinkedToDestChain { .. }
            | Self::Conversion(ConversionError::DeltaOutOfRange(_)) => ErrorClass::Configuration,

            Self::TokenPaused { .. }
            | Self::HubPaused
            | Self::BelowMinimumBridgeAmount { .. }
            | Self::AmountIsTooSmall(_)
            | Self::InsufficientBalanceOnDestChain { .. }
            | Self::EmptyBatch
            | Self::BatchTooLarge { .. }
            | Self::Ledger(LedgerError::InsufficientBalance { .. })
            | Self::Ledger(LedgerError::InsufficientAllowance { .. }) => ErrorClass::Gate,

            Self::BatchRejected { first, .. } => first.class(),

            Self::UnknownPeer { .. } | Self::UnexpectedMessageKind(_) | Self::Wire(_) => {
                ErrorClass::Malformed
            }

            Self::Transport(TransportError::InvalidPeer(_) | TransportError::NoPeer(_)) => {
                ErrorClass::Configuration
            }
            Self::Transport(_) => ErrorClass::Transport,

            Self::Overflow(_) | Self::Conversion(_) | Self::Ledger(_) => ErrorClass::Accounting,
        }
    }

    /// The reason reported back to a Gateway when this error refuses a link request item.
    pub const fn link_rejection(&self) -> Option<LinkRejection> {
        match self {
            Self::AlreadyLinked { .. } => Some(LinkRejection::AlreadyLinked),
            Self::UnknownSyntheticToken(_) => Some(LinkRejection::UnknownSyntheticToken),
            Self::DecimalsMismatch { .. } => Some(LinkRejection::DecimalsMismatch),
            Self::ZeroAddress => Some(LinkRejection::ZeroAddress),
            Self::GatewayMismatch { .. } => Some(LinkRejection::GatewayMismatch),
            _ => None,
        }
    }
}

/// The result type for operations of the Hub controller.
pub type HubResult<T> = Result<T, HubError>;
