//! The network registry: holds the Hub and Gateway nodes and the bus between them.

use std::{collections::BTreeMap, sync::Arc};

use omnibridge_params::BridgeParams;
use omnibridge_primitives::{
    types::{Address, ChainId, Nonce},
    U256,
};
use omnibridge_sm::{
    gateway::{config::GatewayCfg, machine::GatewaySM},
    hub::{config::HubCfg, machine::HubSM},
    ledger::TokenLedger,
    signals::Signal,
};
use omnibridge_transport::{ChannelKey, Endpoint, MessagingReceipt, Packet};
use tracing::info;

use crate::{
    bus::{InMemoryBus, MessageBus},
    duty_dispatcher::{DispatchFailure, DutyDispatcher},
    errors::{OrchestratorError, OrchestratorResult},
    node_types::{NodeId, UnifiedDuty},
};

/// Static configuration shared by all nodes.
#[derive(Debug, Clone)]
pub struct NetworkCfg {
    /// The protocol parameters.
    pub params: BridgeParams,
    /// Configuration of the Hub controller.
    pub hub: Arc<HubCfg>,
    /// Configuration of all Gateway controllers.
    pub gateway: Arc<GatewayCfg>,
}

impl NetworkCfg {
    /// Derives the controller configurations from the protocol parameters.
    pub fn new(params: BridgeParams) -> Self {
        Self {
            hub: Arc::new(HubCfg::new(params.hub)),
            gateway: Arc::new(GatewayCfg::new(params.gateway)),
            params,
        }
    }
}

/// A controller together with the endpoint of its chain.
#[derive(Debug, Clone)]
pub struct Node<SM> {
    /// The controller.
    pub sm: SM,
    /// The messaging endpoint of the node's chain.
    pub endpoint: Endpoint,
}

/// The Hub node.
pub type HubNode = Node<HubSM>;

/// A Gateway node.
pub type GatewayNode = Node<GatewaySM>;

/// One Hub, any number of Gateways and the bus connecting them.
#[derive(Debug)]
pub struct Network<B: MessageBus = InMemoryBus> {
    pub(crate) cfg: NetworkCfg,
    pub(crate) hub: HubNode,
    pub(crate) gateways: BTreeMap<ChainId, GatewayNode>,
    pub(crate) bus: B,
    pub(crate) dispatcher: DutyDispatcher,
    /// Every packet that passed verification, so that it can be executed or retried later.
    pub(crate) verified: BTreeMap<(ChainId, ChannelKey, Nonce), Packet>,
    /// Signals emitted by the controllers, in emission order.
    pub(crate) signals: Vec<Signal>,
    /// Duties that could not be carried out.
    pub(crate) dispatch_failures: Vec<DispatchFailure>,
}

impl Network<InMemoryBus> {
    /// Creates a network with a Hub at `address` on `hub_chain` and an in-memory bus.
    pub fn new(params: BridgeParams, hub_chain: ChainId, address: Address, owner: Address) -> Self {
        Self::with_bus(params, hub_chain, address, owner, InMemoryBus::new())
    }
}

impl<B: MessageBus> Network<B> {
    /// Creates a network with a Hub at `address` on `hub_chain` and the given bus.
    pub fn with_bus(
        params: BridgeParams,
        hub_chain: ChainId,
        address: Address,
        owner: Address,
        bus: B,
    ) -> Self {
        let cfg = NetworkCfg::new(params);
        let hub = HubNode {
            sm: HubSM::new(hub_chain, address, owner),
            endpoint: Endpoint::new(hub_chain, cfg.params.transport),
        };
        info!(%hub_chain, %address, "created hub");

        Self {
            cfg,
            hub,
            gateways: BTreeMap::new(),
            bus,
            dispatcher: DutyDispatcher::default(),
            verified: BTreeMap::new(),
            signals: Vec::new(),
            dispatch_failures: Vec::new(),
        }
    }

    /// Adds a Gateway at `address` on `chain`.
    pub fn add_gateway(
        &mut self,
        chain: ChainId,
        address: Address,
        owner: Address,
    ) -> OrchestratorResult<()> {
        if chain == self.hub_chain() || self.gateways.contains_key(&chain) {
            return Err(OrchestratorError::DuplicateChain(chain));
        }

        let node = GatewayNode {
            sm: GatewaySM::new(chain, address, self.hub_chain(), owner),
            endpoint: Endpoint::new(chain, self.cfg.params.transport),
        };
        self.gateways.insert(chain, node);
        info!(%chain, %address, "added gateway");

        Ok(())
    }

    /// Deploys a token contract on the chain of a Gateway.
    pub fn create_local_token(
        &mut self,
        chain: ChainId,
        token: Address,
        symbol: &str,
        decimals: u8,
    ) -> OrchestratorResult<()> {
        let node = self.gateway_node_mut(chain)?;
        node.sm
            .ledgers_mut()
            .insert(TokenLedger::new(token, symbol, symbol, decimals))
            .map_err(|err| OrchestratorError::gateway(chain, err.into()))?;

        Ok(())
    }

    /// Makes the Hub and the Gateway on `chain` trust each other, acting as both owners.
    pub fn connect(&mut self, chain: ChainId) -> OrchestratorResult<()> {
        let hub_chain = self.hub_chain();
        let hub_address = self.hub.sm.context().address;

        let gateway = self.gateway_node_mut(chain)?;
        let gateway_address = gateway.sm.context().address;
        let gateway_owner = gateway.sm.state().owner;
        gateway
            .sm
            .set_peer(&gateway_owner, hub_chain, hub_address)
            .map_err(|err| OrchestratorError::gateway(chain, err))?;

        let hub_owner = self.hub.sm.state().owner;
        self.hub.sm.set_peer(&hub_owner, chain, gateway_address)?;

        Ok(())
    }

    /// Changes the minimum of the Hub's link of `synthetic` to `chain` and sends the new values
    /// to its Gateway. Returns `None` if the acknowledgement could not be sent.
    pub fn set_min_bridge_amount(
        &mut self,
        caller: &Address,
        synthetic: &Address,
        chain: ChainId,
        min_bridge_amount: U256,
    ) -> OrchestratorResult<Option<MessagingReceipt>> {
        let duty = self
            .hub
            .sm
            .set_min_bridge_amount(caller, synthetic, chain, min_bridge_amount)?;

        Ok(self.dispatch_duty(UnifiedDuty::Hub(duty)))
    }

    /// The configuration shared by the nodes.
    pub const fn cfg(&self) -> &NetworkCfg {
        &self.cfg
    }

    /// The chain of the Hub.
    pub const fn hub_chain(&self) -> ChainId {
        self.hub.sm.context().chain_id
    }

    /// Gets the IDs of all the nodes, the Hub first.
    pub fn node_ids(&self) -> Vec<NodeId> {
        std::iter::once(NodeId::Hub(self.hub_chain()))
            .chain(self.gateways.keys().map(|chain| NodeId::Gateway(*chain)))
            .collect()
    }

    /// Gets the chains that have a Gateway.
    pub fn gateway_chains(&self) -> Vec<ChainId> {
        self.gateways.keys().copied().collect()
    }

    /// The Hub node.
    pub const fn hub(&self) -> &HubNode {
        &self.hub
    }

    /// The Hub node, for direct calls on the controller or the endpoint.
    pub fn hub_mut(&mut self) -> &mut HubNode {
        &mut self.hub
    }

    /// The Gateway node on `chain`.
    pub fn gateway(&self, chain: ChainId) -> OrchestratorResult<&GatewayNode> {
        self.gateways
            .get(&chain)
            .ok_or(OrchestratorError::UnknownChain(chain))
    }

    /// The Gateway node on `chain`, for direct calls on the controller or the endpoint.
    pub fn gateway_node_mut(&mut self, chain: ChainId) -> OrchestratorResult<&mut GatewayNode> {
        self.gateways
            .get_mut(&chain)
            .ok_or(OrchestratorError::UnknownChain(chain))
    }

    /// The endpoint of `chain`.
    pub fn endpoint(&self, chain: ChainId) -> OrchestratorResult<&Endpoint> {
        if chain == self.hub_chain() {
            return Ok(&self.hub.endpoint);
        }

        self.gateway(chain).map(|node| &node.endpoint)
    }

    /// Address of the controller on `chain`.
    pub fn controller_address(&self, chain: ChainId) -> OrchestratorResult<Address> {
        if chain == self.hub_chain() {
            return Ok(self.hub.sm.context().address);
        }

        self.gateway(chain).map(|node| node.sm.context().address)
    }

    /// The bus.
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// The bus, to hold, release or reorder packets.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Signals emitted by the controllers so far.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn lists_nodes_hub_first() {
        let mut network = network();
        network.add_gateway(ROGUE_CHAIN, ROGUE_GATEWAY, OWNER).unwrap();

        assert_eq!(
            network.node_ids(),
            vec![
                NodeId::Hub(HUB_CHAIN),
                NodeId::Gateway(GATEWAY_CHAIN),
                NodeId::Gateway(ROGUE_CHAIN)
            ]
        );
        assert_eq!(network.gateway_chains(), vec![GATEWAY_CHAIN, ROGUE_CHAIN]);
        assert_eq!(network.controller_address(ROGUE_CHAIN).unwrap(), ROGUE_GATEWAY);
        assert_eq!(network.controller_address(HUB_CHAIN).unwrap(), HUB);
        assert!(network.endpoint(ROGUE_CHAIN).unwrap().channels().next().is_none());
    }

    #[test]
    fn rejects_a_second_node_on_a_chain() {
        let mut network = network();

        for chain in [HUB_CHAIN, GATEWAY_CHAIN] {
            assert!(matches!(
                network.add_gateway(chain, ROGUE_GATEWAY, OWNER),
                Err(OrchestratorError::DuplicateChain(c)) if c == chain
            ));
        }
        assert!(matches!(
            network.gateway(ROGUE_CHAIN),
            Err(OrchestratorError::UnknownChain(ROGUE_CHAIN))
        ));
    }

    #[test]
    fn connect_makes_both_sides_peers() {
        let network = network();

        assert_eq!(
            network.hub().sm.state().peers.get(GATEWAY_CHAIN),
            Some(GATEWAY)
        );
        assert_eq!(
            network
                .gateway(GATEWAY_CHAIN)
                .unwrap()
                .sm
                .state()
                .peers
                .get(HUB_CHAIN),
            Some(HUB)
        );
    }

    #[test]
    fn local_token_symbols_are_unique_per_address() {
        let mut network = network();

        assert!(network
            .create_local_token(GATEWAY_CHAIN, USDC, "USDC", 6)
            .is_err());
        assert!(network
            .create_local_token(ROGUE_CHAIN, USDC, "USDC", 6)
            .is_err());
    }
}
