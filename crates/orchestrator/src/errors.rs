//! Error types for the orchestrator crate.

use omnibridge_primitives::types::ChainId;
use omnibridge_sm::{gateway::errors::GatewayError, hub::errors::HubError};
use omnibridge_transport::{ChannelKey, ExecuteError, TransportError};
use thiserror::Error;

/// Errors raised while driving the network.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No node lives on the given chain.
    #[error("no node on chain {0}")]
    UnknownChain(ChainId),

    /// A node already lives on the given chain.
    #[error("chain {0} already has a node")]
    DuplicateChain(ChainId),

    /// The Hub rejected a call or a message.
    #[error("hub: {0}")]
    Hub(#[from] HubError),

    /// A Gateway rejected a call or a message.
    #[error("gateway on chain {chain}: {err}")]
    Gateway {
        /// Chain of the Gateway.
        chain: ChainId,
        /// The Gateway's error.
        err: GatewayError,
    },

    /// An endpoint refused the operation.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The relayer never saw the packet for a nonce it was asked to deliver.
    #[error("no packet known for nonce {nonce} on {channel}")]
    UnknownPacket {
        /// The inbound channel.
        channel: ChannelKey,
        /// The nonce.
        nonce: u64,
    },

    /// A reordering is not a permutation of the in-flight packets.
    #[error("invalid permutation of {len} in-flight packets: {order:?}")]
    InvalidPermutation {
        /// Number of packets on the bus.
        len: usize,
        /// The requested order.
        order: Vec<usize>,
    },

    /// A scenario refers to a name that was never defined.
    #[error("unknown name {0}")]
    UnknownName(String),

    /// A scenario could not be parsed.
    #[error("invalid scenario: {0}")]
    Scenario(#[from] toml::de::Error),

    /// A scenario expectation does not hold.
    #[error("step {step}: {reason}")]
    Expectation {
        /// Index of the failing step.
        step: usize,
        /// What went wrong.
        reason: String,
    },

    /// A scenario step failed.
    #[error("step {step} failed: {err}")]
    StepFailed {
        /// Index of the failing step.
        step: usize,
        /// The failure.
        #[source]
        err: Box<OrchestratorError>,
    },

    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl OrchestratorError {
    /// Wraps an error of the Gateway on `chain`.
    pub const fn gateway(chain: ChainId, err: GatewayError) -> Self {
        Self::Gateway { chain, err }
    }

    /// Whether the failed operation may succeed later, after a gate opens or with more gas.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Hub(err) => err.class().is_retryable(),
            Self::Gateway { err, .. } => err.class().is_retryable(),
            Self::Transport(err) => err.is_transient(),
            _ => false,
        }
    }

    /// Unwraps an execution failure of a message delivered to the Hub.
    pub fn from_hub_execution(err: ExecuteError<HubError>) -> Self {
        match err {
            ExecuteError::Transport(err) => Self::Transport(err),
            ExecuteError::Reverted(err) => Self::Hub(err),
        }
    }

    /// Unwraps an execution failure of a message delivered to the Gateway on `chain`.
    pub fn from_gateway_execution(chain: ChainId, err: ExecuteError<GatewayError>) -> Self {
        match err {
            ExecuteError::Transport(err) => Self::Transport(err),
            ExecuteError::Reverted(err) => Self::gateway(chain, err),
        }
    }
}

/// Result type of the orchestrator.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
