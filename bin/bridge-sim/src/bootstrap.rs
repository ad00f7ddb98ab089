//! Builds the simulated network described by the config.

use anyhow::{bail, Context};
use omnibridge_orchestrator::network::Network;
use omnibridge_params::BridgeParams;
use tracing::{debug, info};

use crate::config::Config;

/// Creates the Hub and every Gateway, deploys the local tokens with their initial balances and
/// connects the Gateways that ask for it.
pub(crate) fn bootstrap(params: BridgeParams, config: &Config) -> anyhow::Result<Network> {
    params.validate().context("invalid params")?;

    let hub = &config.hub;
    let mut network = Network::new(params, hub.chain, hub.address, hub.owner);
    info!(chain = hub.chain, address = %hub.address, "created hub");

    for gateway in &config.gateways {
        let chain = gateway.controller.chain;
        network
            .add_gateway(chain, gateway.controller.address, gateway.controller.owner)
            .with_context(|| format!("failed to add gateway on chain {chain}"))?;

        for token in &gateway.tokens {
            network
                .create_local_token(chain, token.address, &token.symbol, token.decimals)
                .with_context(|| format!("failed to deploy {} on chain {chain}", token.symbol))?;

            let ledger = network
                .gateway_node_mut(chain)?
                .sm
                .ledgers_mut()
                .get_mut(&token.address)?;
            for (holder, balance) in &token.balances {
                ledger
                    .mint(holder, balance.0)
                    .with_context(|| format!("failed to fund {holder} with {}", token.symbol))?;
                debug!(%chain, token = %token.symbol, %holder, amount = %balance.0, "funded holder");
            }
        }

        if gateway.connect {
            network
                .connect(chain)
                .with_context(|| format!("failed to connect gateway on chain {chain}"))?;
        }
    }

    if network.gateway_chains().is_empty() {
        bail!("the network has no gateways");
    }

    Ok(network)
}
