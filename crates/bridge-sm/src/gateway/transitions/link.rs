//! Link requests sent by the Gateway owner.

use std::collections::BTreeSet;

use omnibridge_primitives::{
    decimals::DecimalsDelta,
    types::{Address, Amount},
    U256,
};
use omnibridge_transport::{MessageSender, MessagingFee, MessagingReceipt, SendOptions};
use omnibridge_wire::{BridgeMessage, LinkRequestItem};
use serde::Deserialize;
use tracing::info;

use crate::gateway::{
    config::GatewayCfg,
    errors::{GatewayError, GatewayResult},
    machine::GatewaySM,
    state::{GatewayTokenEntry, LinkStatus},
    transitions::check_batch_len,
};

/// The owner's configuration of a local token to be linked on the Hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenConfig {
    /// The real token on this chain.
    pub token: Address,
    /// The synthetic token on the Hub it should back.
    pub synthetic_token: Address,
    /// Decimals of the synthetic token.
    pub synthetic_decimals: u8,
    /// Smallest deposit accepted.
    #[serde(with = "ethnum::serde::permissive")]
    pub min_bridge_amount: Amount,
    /// Whether deposits start paused.
    #[serde(default)]
    pub paused: bool,
}

impl GatewaySM {
    /// Prices a link request without sending it.
    pub fn quote_link_token_to_hub(
        &self,
        cfg: &GatewayCfg,
        caller: &Address,
        configs: &[TokenConfig],
        options: &SendOptions,
        transport: &impl MessageSender,
    ) -> GatewayResult<MessagingFee> {
        let (_, message) = self.prepare_link_request(cfg, caller, configs)?;

        Ok(transport.quote(self.context.hub_chain, message.encoded_len(), options)?)
    }

    /// Asks the Hub to link local tokens to synthetic tokens.
    ///
    /// The entries are `Pending` until the Hub's acknowledgement arrives. Rejected entries may
    /// be requested again; confirmed ones may not.
    pub fn link_token_to_hub(
        &mut self,
        cfg: &GatewayCfg,
        caller: &Address,
        configs: &[TokenConfig],
        options: &SendOptions,
        fee: U256,
        transport: &mut impl MessageSender,
    ) -> GatewayResult<MessagingReceipt> {
        let (items, message) = self.prepare_link_request(cfg, caller, configs)?;

        let hub = self.state.peers.require(self.context.hub_chain)?;
        let receipt = transport.send(
            self.context.address,
            self.context.hub_chain,
            hub,
            message.encode(),
            options,
            fee,
        )?;

        for item in items {
            let locked = self
                .state
                .tokens
                .get(&item.token)
                .map(|entry| entry.locked)
                .unwrap_or_default();

            self.state.tokens.insert(
                item.token,
                GatewayTokenEntry {
                    token: item.token,
                    synthetic_token: item.synthetic_token,
                    synthetic_decimals: item.synthetic_decimals,
                    decimals_delta: item.decimals_delta,
                    min_bridge_amount: item.min_bridge_amount,
                    paused: item.paused,
                    locked,
                    status: LinkStatus::Pending,
                },
            );
        }

        info!(%caller, guid = %receipt.guid, nonce = %receipt.nonce, items = configs.len(), "requested token links");

        Ok(receipt)
    }

    /// Same as [`link_token_to_hub`](Self::link_token_to_hub).
    pub fn register_token(
        &mut self,
        cfg: &GatewayCfg,
        caller: &Address,
        configs: &[TokenConfig],
        options: &SendOptions,
        fee: U256,
        transport: &mut impl MessageSender,
    ) -> GatewayResult<MessagingReceipt> {
        self.link_token_to_hub(cfg, caller, configs, options, fee, transport)
    }

    fn prepare_link_request(
        &self,
        cfg: &GatewayCfg,
        caller: &Address,
        configs: &[TokenConfig],
    ) -> GatewayResult<(Vec<LinkRequestItem>, BridgeMessage)> {
        self.check_owner(caller)?;
        check_batch_len(configs.len(), cfg.max_batch_len())?;

        let mut seen = BTreeSet::new();
        let mut items = Vec::with_capacity(configs.len());
        for config in configs {
            if config.token.is_zero() || config.synthetic_token.is_zero() {
                return Err(GatewayError::ZeroAddress);
            }
            if !seen.insert(config.token) {
                return Err(GatewayError::DuplicateToken(config.token));
            }
            if self
                .state
                .tokens
                .get(&config.token)
                .is_some_and(GatewayTokenEntry::is_confirmed)
            {
                return Err(GatewayError::AlreadyLinked(config.token));
            }

            let ledger = self.state.assets.get(&config.token)?;
            let decimals_delta =
                DecimalsDelta::between(config.synthetic_decimals, ledger.decimals())?;

            items.push(LinkRequestItem {
                token: config.token,
                synthetic_decimals: config.synthetic_decimals,
                synthetic_token: config.synthetic_token,
                decimals_delta,
                min_bridge_amount: config.min_bridge_amount,
                paused: config.paused,
            });
        }

        let message = BridgeMessage::LinkRequest {
            items: items.clone(),
        };

        Ok((items, message))
    }
}
