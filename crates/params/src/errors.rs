//! Errors for the bridge parameters.

use thiserror::Error;

/// Inconsistent bridge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// A batch length is zero or above the codec limit.
    #[error("{name} must be between 1 and {max}, got {len}", max = crate::default::MAX_BATCH_LEN)]
    BatchLenOutOfRange {
        /// The offending parameter.
        name: &'static str,
        /// Its value.
        len: usize,
    },

    /// The endpoint cannot carry even an empty message.
    #[error("max_message_size of {0} bytes cannot hold a message header")]
    MessageSizeTooSmall(usize),

    /// The default gas limit does not cover the base execution cost.
    #[error("default_gas_limit {limit} is below exec_base_gas {base}")]
    GasLimitBelowBase {
        /// Configured default limit.
        limit: u64,
        /// Configured base execution gas.
        base: u64,
    },
}
