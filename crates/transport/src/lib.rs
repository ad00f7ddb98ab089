//! A simulated omnichain messaging layer.
//!
//! Each chain runs one [`Endpoint`]. Sending a message assigns it the next outbound nonce of its
//! `(sender, destination, receiver)` path. On the destination, a relayer first *verifies* the
//! packet, which records its payload hash against the inbound channel, and then *executes* it,
//! which hands the payload to the receiving application. Execution is strictly ordered per
//! channel: nonce `n + 1` can only run once nonce `n` has been executed or skipped.
//!
//! Applications plug into the endpoint through [`MessageReceiver`] and are reached through
//! [`MessageSender`].

pub mod channel;
pub mod endpoint;
pub mod errors;
pub mod peers;
pub mod receiver;
pub mod types;

pub use channel::{Channel, NonceState, PendingMessage};
pub use endpoint::{Delivery, Endpoint, PeerRejection, Verification};
pub use errors::{ExecuteError, TransportError};
pub use peers::PeerRegistry;
pub use receiver::{MessageReceiver, MessageSender};
pub use types::{
    ChannelKey, Guid, MessagingFee, MessagingReceipt, Origin, Packet, PayloadHash, SendOptions,
};
