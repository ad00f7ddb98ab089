//! The Hub State Machine.
//!
//! Responsible for minting synthetic tokens for verified deposits and answering link requests.
//! Withdrawals and administration are exposed as methods, see [`transitions`](super::transitions).

use std::sync::Arc;

use omnibridge_primitives::{
    types::{Address, ChainId, TokenIdx},
    U256,
};
use omnibridge_transport::{Origin, PeerRegistry};
use omnibridge_wire::BridgeMessage;
use serde::Serialize;

use crate::{
    hub::{
        config::HubCfg,
        duties::HubDuty,
        errors::{HubError, HubResult},
        events::HubEvent,
        registry::{LinkEntry, LinkRegistry},
        state::HubState,
    },
    inbound::InboundMessage,
    ledger::TokenLedger,
    mailbox::Application,
    reconcile::LinkView,
    signals::HubSignal,
    state_machine::{SMOutput, StateMachine},
};

/// Where the Hub lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubCtx {
    /// The Hub chain.
    pub chain_id: ChainId,
    /// Address of the Hub controller.
    pub address: Address,
}

/// The Hub controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubSM {
    /// Identity of this Hub.
    pub context: HubCtx,
    /// The current state.
    pub state: HubState,
}

/// The output of the Hub after processing an event.
pub type HubOutput = SMOutput<HubDuty, HubSignal>;

/// A synthetic token together with its supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticTokenInfo {
    /// 1-based index.
    pub index: TokenIdx,
    /// Address on the Hub.
    pub address: Address,
    /// Ticker symbol.
    pub symbol: String,
    /// `"Synthetic {symbol}"`.
    pub name: String,
    /// Number of decimals.
    pub decimals: u8,
    /// Amount in circulation.
    pub total_supply: U256,
}

impl StateMachine for HubSM {
    type Config = Arc<HubCfg>;
    type Duty = HubDuty;
    type OutgoingSignal = HubSignal;
    type Event = HubEvent;
    type Error = HubError;

    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<SMOutput<Self::Duty, Self::OutgoingSignal>, Self::Error> {
        match event {
            HubEvent::MessageReceived(InboundMessage {
                origin, message, ..
            }) => {
                self.check_peer(&origin)?;

                match message {
                    BridgeMessage::Deposit { recipient, assets } => {
                        self.process_deposit(&cfg, &origin, recipient, assets)
                    }
                    BridgeMessage::LinkRequest { items } => {
                        self.process_link_request(&cfg, &origin, items)
                    }
                    other => Err(HubError::UnexpectedMessageKind(other.kind())),
                }
            }
        }
    }
}

impl Application for HubSM {
    fn address(&self) -> Address {
        self.context.address
    }

    fn owner(&self) -> Address {
        self.state.owner
    }

    fn peers(&self) -> &PeerRegistry {
        &self.state.peers
    }

    fn inbound_event(message: InboundMessage) -> HubEvent {
        HubEvent::MessageReceived(message)
    }
}

impl HubSM {
    /// Creates an empty Hub at `address` on `chain_id`, administered by `owner`.
    pub fn new(chain_id: ChainId, address: Address, owner: Address) -> Self {
        Self {
            context: HubCtx { chain_id, address },
            state: HubState::new(owner),
        }
    }

    /// Returns a reference to the Hub's context.
    pub const fn context(&self) -> &HubCtx {
        &self.context
    }

    /// Returns a reference to the current state.
    pub const fn state(&self) -> &HubState {
        &self.state
    }

    /// The registry of synthetic tokens and links.
    pub const fn registry(&self) -> &LinkRegistry {
        &self.state.registry
    }

    /// Whether the Hub is paused.
    pub const fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Number of synthetic tokens.
    pub fn synthetic_token_count(&self) -> usize {
        self.state.registry.token_count()
    }

    /// Index of the synthetic token at `address`.
    pub fn synthetic_token_index(&self, address: &Address) -> Option<TokenIdx> {
        self.state.registry.token_index(address)
    }

    /// Information about the synthetic tokens with the given indices, or about all of them if
    /// `indices` is empty.
    pub fn synthetic_tokens_info(&self, indices: &[TokenIdx]) -> HubResult<Vec<SyntheticTokenInfo>> {
        let registry = &self.state.registry;
        let selected: Vec<TokenIdx> = if indices.is_empty() {
            registry.tokens().iter().map(|token| token.index).collect()
        } else {
            indices.to_vec()
        };

        selected
            .into_iter()
            .map(|index| {
                let token = registry
                    .token(index)
                    .ok_or(HubError::UnknownTokenIndex(index))?;
                let ledger = self.synthetic_ledger(&token.address)?;

                Ok(SyntheticTokenInfo {
                    index,
                    address: token.address,
                    symbol: token.symbol.clone(),
                    name: ledger.name().to_string(),
                    decimals: token.decimals,
                    total_supply: ledger.total_supply(),
                })
            })
            .collect()
    }

    /// The link of `synthetic` to `chain`.
    pub fn remote_token_info(&self, synthetic: &Address, chain: ChainId) -> Option<&LinkEntry> {
        let index = self.state.registry.token_index(synthetic)?;
        self.state
            .registry
            .link_by_synthetic(index, chain)
            .map(|(_, entry)| entry)
    }

    /// The synthetic token linked to `remote_token` on `chain`.
    pub fn synthetic_by_remote(&self, chain: ChainId, remote_token: &Address) -> Option<Address> {
        let registry = &self.state.registry;
        let (_, entry) = registry.link_by_remote(chain, remote_token)?;
        registry.token(entry.synthetic).map(|token| token.address)
    }

    /// The remote token `synthetic` is linked to on `chain`.
    pub fn remote_by_synthetic(&self, synthetic: &Address, chain: ChainId) -> Option<Address> {
        self.remote_token_info(synthetic, chain)
            .map(|entry| entry.remote_token)
    }

    /// The gateway registered for `chain`.
    pub fn gateway_for(&self, chain: ChainId) -> Option<Address> {
        self.state.registry.gateway_for(chain)
    }

    /// Whether `remote_token` on `chain` is linked to a synthetic token.
    pub fn is_token_registered(&self, chain: ChainId, remote_token: &Address) -> bool {
        self.state
            .registry
            .link_by_remote(chain, remote_token)
            .is_some()
    }

    /// Chains `synthetic` is linked to.
    pub fn linked_chains(&self, synthetic: &Address) -> Vec<ChainId> {
        self.state
            .registry
            .token_index(synthetic)
            .map(|index| self.state.registry.linked_chains(index))
            .unwrap_or_default()
    }

    /// The ledger of a synthetic token.
    pub fn synthetic_ledger(&self, synthetic: &Address) -> HubResult<&TokenLedger> {
        Ok(self.state.ledgers.get(synthetic)?)
    }

    /// Balance of `holder` in `synthetic`.
    pub fn balance_of(&self, synthetic: &Address, holder: &Address) -> U256 {
        self.state.ledgers.balance_of(synthetic, holder)
    }

    /// The Hub's view of every link to `chain`, for gateway reconciliation.
    pub fn link_views(&self, chain: ChainId) -> Vec<LinkView> {
        let registry = &self.state.registry;
        registry
            .links()
            .iter()
            .filter(|entry| entry.chain == chain)
            .filter_map(|entry| {
                let token = registry.token(entry.synthetic)?;
                Some(LinkView {
                    token: entry.remote_token,
                    synthetic_token: token.address,
                    decimals_delta: entry.decimals_delta,
                    min_bridge_amount: entry.min_bridge_amount,
                    paused: entry.paused,
                    locked: entry.cumulative_locked,
                })
            })
            .collect()
    }

    /// Checks that `caller` owns the Hub, otherwise returns [`HubError::NotOwner`].
    pub(crate) fn check_owner(&self, caller: &Address) -> HubResult<()> {
        if *caller != self.state.owner {
            return Err(HubError::NotOwner(*caller));
        }

        Ok(())
    }

    /// Checks that a message comes from the configured peer of its source chain.
    pub(crate) fn check_peer(&self, origin: &Origin) -> HubResult<()> {
        if !self.state.peers.is_peer(origin.src_chain, &origin.sender) {
            return Err(HubError::UnknownPeer {
                chain: origin.src_chain,
                sender: origin.sender,
            });
        }

        Ok(())
    }
}
