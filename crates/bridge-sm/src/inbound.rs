//! The envelope of a message handed to a controller by the transport.

use std::fmt;

use omnibridge_transport::{Guid, Origin};
use omnibridge_wire::BridgeMessage;

/// A decoded message together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Source chain, sender and nonce.
    pub origin: Origin,

    /// Id of the message.
    pub guid: Guid,

    /// The decoded payload.
    pub message: BridgeMessage,
}

impl fmt::Display for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.message.kind(), self.origin)
    }
}
