//! Wire format of the messages exchanged between the Hub and its Gateways.
//!
//! Every payload is a sequence of 32-byte big-endian words:
//!
//! ```text
//! word 0        kind
//! word 1        recipient (20-byte address, left zero-padded)
//! word 2        number of items `n`
//! word 3..      `n` fixed-size items, laid out according to the kind
//! ```
//!
//! Deposit and Unlock items are `(token, amount)`. LinkRequest and LinkAck items carry the token
//! configuration, see [`LinkRequestItem`] and [`LinkAckItem`].

mod codec;
pub mod errors;
pub mod message;

pub use errors::WireError;
pub use message::{
    BridgeMessage, LinkAckItem, LinkAckStatus, LinkRejection, LinkRequestItem, MessageKind,
};

/// Size in bytes of a single word in the payload.
pub const WORD_SIZE: usize = 32;

/// Hard upper bound on the number of items in a single message.
pub const MAX_BATCH_LEN: usize = 64;
