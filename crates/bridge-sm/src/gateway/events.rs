//! The events that are relevant to the Gateway controller.

use std::fmt;

use crate::inbound::InboundMessage;

/// The external events that affect a Gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A verified message was delivered by the transport.
    MessageReceived(InboundMessage),
}

impl From<InboundMessage> for GatewayEvent {
    fn from(message: InboundMessage) -> Self {
        Self::MessageReceived(message)
    }
}

impl fmt::Display for GatewayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayEvent::MessageReceived(message) => write!(f, "MessageReceived({message})"),
        }
    }
}
