//! The events that are relevant to the Hub controller.

use std::fmt;

use crate::inbound::InboundMessage;

/// The external events that affect the Hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// A verified message was delivered by the transport.
    MessageReceived(InboundMessage),
}

impl From<InboundMessage> for HubEvent {
    fn from(message: InboundMessage) -> Self {
        Self::MessageReceived(message)
    }
}

impl fmt::Display for HubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubEvent::MessageReceived(message) => write!(f, "MessageReceived({message})"),
        }
    }
}
