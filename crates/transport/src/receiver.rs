//! Seams between the transport and the applications using it.

use omnibridge_primitives::{
    types::{Address, ChainId},
    U256,
};

use crate::{
    errors::TransportError,
    peers::PeerRegistry,
    types::{Guid, MessagingFee, MessagingReceipt, Origin, SendOptions},
};

/// An application that accepts messages from an [`Endpoint`](crate::Endpoint).
///
/// [`receive`](Self::receive) must be atomic: when it returns an error, the application's state
/// is exactly as before the call, so the message can be retried.
pub trait MessageReceiver {
    /// Result of a successful delivery.
    type Output;

    /// Reason a delivery was rejected.
    type Error: std::error::Error;

    /// Address of the application on its chain.
    fn address(&self) -> Address;

    /// Account allowed to skip or clear messages addressed to the application.
    fn owner(&self) -> Address;

    /// Remote applications the receiver trusts.
    fn peers(&self) -> &PeerRegistry;

    /// Whether a message from `origin` may enter the channel at all.
    fn allow_initialize_path(&self, origin: &Origin) -> bool {
        self.peers().is_peer(origin.src_chain, &origin.sender)
    }

    /// Applies a message.
    fn receive(
        &mut self,
        origin: &Origin,
        guid: &Guid,
        message: &[u8],
    ) -> Result<Self::Output, Self::Error>;
}

/// Something that can deliver messages to other chains.
pub trait MessageSender {
    /// The chain messages are sent from.
    fn chain_id(&self) -> ChainId;

    /// Price of sending `message_len` bytes to `dst_chain`.
    fn quote(
        &self,
        dst_chain: ChainId,
        message_len: usize,
        options: &SendOptions,
    ) -> Result<MessagingFee, TransportError>;

    /// Sends `message` from `sender` to `receiver` on `dst_chain`, paying `fee`.
    fn send(
        &mut self,
        sender: Address,
        dst_chain: ChainId,
        receiver: Address,
        message: Vec<u8>,
        options: &SendOptions,
        fee: U256,
    ) -> Result<MessagingReceipt, TransportError>;
}
