//! The Gateway State Machine.
//!
//! Responsible for releasing tokens on unlocks and for tracking the Hub's answers to link
//! requests. Deposits, link requests and administration are exposed as methods, see
//! [`transitions`](super::transitions).

use std::sync::Arc;

use omnibridge_primitives::{
    types::{Address, ChainId},
    U256,
};
use omnibridge_transport::{Origin, PeerRegistry};
use omnibridge_wire::BridgeMessage;
use serde::Serialize;

use crate::{
    gateway::{
        config::GatewayCfg,
        duties::GatewayDuty,
        errors::{GatewayError, GatewayResult},
        events::GatewayEvent,
        state::{GatewayState, GatewayTokenEntry},
    },
    inbound::InboundMessage,
    ledger::AssetBook,
    mailbox::Application,
    reconcile::{self, Drift, LinkView},
    signals::GatewaySignal,
    state_machine::{SMOutput, StateMachine},
};

/// Where a Gateway lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatewayCtx {
    /// The Gateway's chain.
    pub chain_id: ChainId,
    /// Address of the Gateway controller, which also holds the locked tokens.
    pub address: Address,
    /// The Hub chain.
    pub hub_chain: ChainId,
}

/// A Gateway controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewaySM {
    /// Identity of this Gateway.
    pub context: GatewayCtx,
    /// The current state.
    pub state: GatewayState,
}

/// The output of a Gateway after processing an event.
pub type GatewayOutput = SMOutput<GatewayDuty, GatewaySignal>;

impl StateMachine for GatewaySM {
    type Config = Arc<GatewayCfg>;
    type Duty = GatewayDuty;
    type OutgoingSignal = GatewaySignal;
    type Event = GatewayEvent;
    type Error = GatewayError;

    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<SMOutput<Self::Duty, Self::OutgoingSignal>, Self::Error> {
        match event {
            GatewayEvent::MessageReceived(InboundMessage {
                origin, message, ..
            }) => {
                self.check_peer(&origin)?;

                match message {
                    BridgeMessage::Unlock { recipient, assets } => {
                        self.process_unlock(&cfg, &origin, recipient, assets)
                    }
                    BridgeMessage::LinkAck { items } => self.process_link_ack(&origin, items),
                    other => Err(GatewayError::UnexpectedMessageKind(other.kind())),
                }
            }
        }
    }
}

impl Application for GatewaySM {
    fn address(&self) -> Address {
        self.context.address
    }

    fn owner(&self) -> Address {
        self.state.owner
    }

    fn peers(&self) -> &PeerRegistry {
        &self.state.peers
    }

    fn inbound_event(message: InboundMessage) -> GatewayEvent {
        GatewayEvent::MessageReceived(message)
    }
}

impl GatewaySM {
    /// Creates an empty Gateway at `address` on `chain_id`, bridging to the Hub on `hub_chain`.
    pub fn new(chain_id: ChainId, address: Address, hub_chain: ChainId, owner: Address) -> Self {
        Self {
            context: GatewayCtx {
                chain_id,
                address,
                hub_chain,
            },
            state: GatewayState::new(owner),
        }
    }

    /// Returns a reference to the Gateway's context.
    pub const fn context(&self) -> &GatewayCtx {
        &self.context
    }

    /// Returns a reference to the current state.
    pub const fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Whether the Gateway is paused.
    pub const fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Number of entries in the token table.
    pub fn available_token_length(&self) -> usize {
        self.state.tokens.len()
    }

    /// The entry of `token`.
    pub fn token_entry(&self, token: &Address) -> Option<&GatewayTokenEntry> {
        self.state.tokens.get(token)
    }

    /// All entries in token order.
    pub fn tokens(&self) -> impl Iterator<Item = &GatewayTokenEntry> + '_ {
        self.state.tokens.values()
    }

    /// The token contracts of the chain.
    pub const fn ledgers(&self) -> &AssetBook {
        &self.state.assets
    }

    /// The token contracts of the chain, for users to hold, approve and move tokens.
    pub fn ledgers_mut(&mut self) -> &mut AssetBook {
        &mut self.state.assets
    }

    /// Balance of `holder` in the local `token`.
    pub fn balance_of(&self, token: &Address, holder: &Address) -> U256 {
        self.state.assets.balance_of(token, holder)
    }

    /// Amount of `token` the Gateway holds on behalf of the Hub.
    pub fn locked_balance(&self, token: &Address) -> U256 {
        self.token_entry(token)
            .map(|entry| entry.locked)
            .unwrap_or_default()
    }

    /// Compares the token table against the Hub's links to this chain.
    pub fn reconcile(&self, hub_view: &[LinkView]) -> Vec<Drift> {
        reconcile::reconcile(self.tokens(), hub_view)
    }

    /// Checks that `caller` owns the Gateway, otherwise returns [`GatewayError::NotOwner`].
    pub(crate) fn check_owner(&self, caller: &Address) -> GatewayResult<()> {
        if *caller != self.state.owner {
            return Err(GatewayError::NotOwner(*caller));
        }

        Ok(())
    }

    /// Checks that a message comes from the configured peer of its source chain.
    pub(crate) fn check_peer(&self, origin: &Origin) -> GatewayResult<()> {
        if !self.state.peers.is_peer(origin.src_chain, &origin.sender) {
            return Err(GatewayError::UnknownPeer {
                chain: origin.src_chain,
                sender: origin.sender,
            });
        }

        Ok(())
    }
}
