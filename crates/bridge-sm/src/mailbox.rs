//! Plugs a controller into a transport endpoint.

use std::fmt;

use omnibridge_primitives::types::Address;
use omnibridge_transport::{Guid, MessageReceiver, Origin, PeerRegistry};
use omnibridge_wire::{BridgeMessage, WireError};

use crate::{
    inbound::InboundMessage,
    state_machine::{SMOutput, StateMachine},
};

/// A state machine that lives at an address on some chain and consumes bridge messages.
pub trait Application: StateMachine {
    /// Address of the controller on its chain.
    fn address(&self) -> Address;

    /// Account allowed to administer the controller.
    fn owner(&self) -> Address;

    /// Trusted remote controllers.
    fn peers(&self) -> &PeerRegistry;

    /// Wraps a delivered message into an event.
    fn inbound_event(message: InboundMessage) -> Self::Event;
}

/// A controller together with its configuration, ready to receive messages from an endpoint.
///
/// Payloads are decoded here; a payload that does not decode fails the delivery like any other
/// error, so the message stays verified on the channel.
pub struct Mailbox<'a, SM: Application> {
    sm: &'a mut SM,
    cfg: SM::Config,
}

impl<'a, SM: Application> Mailbox<'a, SM> {
    /// Creates a mailbox for `sm`.
    pub const fn new(sm: &'a mut SM, cfg: SM::Config) -> Self {
        Self { sm, cfg }
    }
}

impl<SM: Application> fmt::Debug for Mailbox<'_, SM> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("address", &self.sm.address())
            .finish_non_exhaustive()
    }
}

impl<SM> MessageReceiver for Mailbox<'_, SM>
where
    SM: Application,
    SM::Config: Clone,
    SM::Error: From<WireError> + std::error::Error,
{
    type Output = SMOutput<SM::Duty, SM::OutgoingSignal>;
    type Error = SM::Error;

    fn address(&self) -> Address {
        self.sm.address()
    }

    fn owner(&self) -> Address {
        self.sm.owner()
    }

    fn peers(&self) -> &PeerRegistry {
        self.sm.peers()
    }

    fn receive(
        &mut self,
        origin: &Origin,
        guid: &Guid,
        message: &[u8],
    ) -> Result<Self::Output, Self::Error> {
        let message = BridgeMessage::decode(message)?;
        let event = SM::inbound_event(InboundMessage {
            origin: *origin,
            guid: *guid,
            message,
        });

        self.sm.process_event(self.cfg.clone(), event)
    }
}
