//! Errors emitted while decoding a payload.

use thiserror::Error;

/// Failure to decode a payload into a [`BridgeMessage`](crate::BridgeMessage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The payload ended before all expected words were read.
    #[error("payload truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Number of bytes required.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// The payload has bytes left over after the last item.
    #[error("payload has {0} trailing bytes")]
    TrailingBytes(usize),

    /// The kind tag is not known to this codec.
    #[error("unknown message kind {0}")]
    UnknownKind(u64),

    /// The kind tag belongs to a message kind this bridge does not process.
    #[error("unsupported message kind {0}")]
    UnsupportedKind(u8),

    /// A word does not hold a canonical encoding of the expected type.
    #[error("non-canonical encoding of {field} at word {index}")]
    NonCanonical {
        /// Name of the field being decoded.
        field: &'static str,
        /// Index of the offending word.
        index: usize,
    },

    /// The batch has no items.
    #[error("message carries no items")]
    EmptyBatch,

    /// The batch exceeds [`MAX_BATCH_LEN`](crate::MAX_BATCH_LEN).
    #[error("batch of {0} items exceeds the limit of {max}", max = crate::MAX_BATCH_LEN)]
    BatchTooLarge(u64),

    /// The link acknowledgement status code is not known.
    #[error("unknown link status code {0}")]
    UnknownLinkStatus(u8),
}
