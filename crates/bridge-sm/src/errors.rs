//! Classification shared by the controller errors.

use serde::{Deserialize, Serialize};

/// How an error should be handled by whoever observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// A misconfiguration or an unauthorized call. Retrying will not help until an owner acts.
    Configuration,

    /// A pause, threshold or balance gate. Inside message processing this leaves the message
    /// stuck until the gate opens.
    Gate,

    /// The payload could not be understood or did not come from a peer.
    Malformed,

    /// The transport refused the call, for instance because the fee was too low.
    Transport,

    /// Arithmetic overflow or an inconsistent ledger.
    Accounting,
}

impl ErrorClass {
    /// Whether a failed message of this class may succeed when retried after an admin action.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Gate | Self::Configuration)
    }
}
