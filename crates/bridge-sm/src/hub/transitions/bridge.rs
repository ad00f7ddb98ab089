//! Withdrawal of synthetic tokens to a remote chain.
//!
//! The Hub validates the whole batch, sends the `Unlock` message and only then burns the
//! synthetic tokens. All checks that could fail the burn run before the send, so a successful
//! send is always followed by a burn. Once sent, the unlock cannot be recalled: if the gateway
//! refuses it, the tokens stay burned on the Hub until the message is retried there.

use std::collections::BTreeMap;

use omnibridge_primitives::{
    types::{Address, Asset, ChainId, LinkIdx},
    U256,
};
use omnibridge_transport::{MessageSender, MessagingFee, MessagingReceipt, SendOptions};
use omnibridge_wire::BridgeMessage;
use serde::Serialize;
use tracing::info;

use crate::hub::{
    config::HubCfg,
    errors::{HubError, HubResult},
    machine::HubSM,
    transitions::check_batch_len,
};

/// Price and outcome of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeQuote {
    /// Fee charged by the transport.
    pub fee: MessagingFee,
    /// Amounts released on the destination chain, in remote units.
    pub assets: Vec<Asset>,
}

/// Result of a successful [`HubSM::bridge_tokens`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeReceipt {
    /// Receipt of the `Unlock` message.
    pub receipt: MessagingReceipt,
    /// Burned synthetic amounts, after dust removal.
    pub burned: Vec<Asset>,
    /// Amounts released on the destination chain, in remote units.
    pub sent: Vec<Asset>,
}

#[derive(Debug, Clone, Copy)]
struct PlannedBurn {
    link: LinkIdx,
    synthetic: Address,
    burn: U256,
    remote: Asset,
}

impl HubSM {
    /// Prices a withdrawal without executing it.
    pub fn quote_bridge_tokens(
        &self,
        cfg: &HubCfg,
        recipient: Address,
        assets: &[Asset],
        dst_chain: ChainId,
        options: &SendOptions,
        transport: &impl MessageSender,
    ) -> HubResult<BridgeQuote> {
        let (_, planned) = self.plan_withdrawal(cfg, recipient, assets, dst_chain)?;
        let message = unlock_message(recipient, &planned);
        let fee = transport.quote(dst_chain, message.encoded_len(), options)?;

        Ok(BridgeQuote {
            fee,
            assets: planned.iter().map(|plan| plan.remote).collect(),
        })
    }

    /// Burns `caller`'s synthetic tokens and sends an `Unlock` of the matching remote tokens to
    /// the gateway on `dst_chain`.
    ///
    /// Amounts are rounded down to what the remote token can represent; the remainder stays with
    /// the caller.
    #[expect(clippy::too_many_arguments)]
    pub fn bridge_tokens(
        &mut self,
        cfg: &HubCfg,
        caller: &Address,
        recipient: Address,
        assets: &[Asset],
        dst_chain: ChainId,
        options: &SendOptions,
        fee: U256,
        transport: &mut impl MessageSender,
    ) -> HubResult<BridgeReceipt> {
        let (receiver, planned) = self.plan_withdrawal(cfg, recipient, assets, dst_chain)?;
        self.check_burns(caller, &planned)?;

        let message = unlock_message(recipient, &planned);
        let receipt = transport.send(
            self.context.address,
            dst_chain,
            receiver,
            message.encode(),
            options,
            fee,
        )?;

        for plan in &planned {
            self.state
                .ledgers
                .get_mut(&plan.synthetic)?
                .burn(caller, plan.burn)?;

            if let Some(entry) = self.state.registry.link_mut(plan.link) {
                entry.cumulative_locked = entry
                    .cumulative_locked
                    .checked_sub(plan.remote.amount)
                    .ok_or(HubError::Overflow("cumulative locked"))?;
            }
        }

        info!(%caller, %recipient, %dst_chain, guid = %receipt.guid, nonce = %receipt.nonce, items = planned.len(), "bridged tokens");

        Ok(BridgeReceipt {
            receipt,
            burned: planned
                .iter()
                .map(|plan| Asset::new(plan.synthetic, plan.burn))
                .collect(),
            sent: planned.iter().map(|plan| plan.remote).collect(),
        })
    }

    /// Validates a withdrawal and returns the receiving gateway and the per-asset plan.
    fn plan_withdrawal(
        &self,
        cfg: &HubCfg,
        recipient: Address,
        assets: &[Asset],
        dst_chain: ChainId,
    ) -> HubResult<(Address, Vec<PlannedBurn>)> {
        if self.state.paused {
            return Err(HubError::HubPaused);
        }
        check_batch_len(assets.len(), cfg.max_batch_len())?;
        if recipient.is_zero() {
            return Err(HubError::ZeroAddress);
        }

        let registry = &self.state.registry;
        let gateway = registry
            .gateway_for(dst_chain)
            .ok_or(HubError::NoGatewayForChain(dst_chain))?;
        let peer = self.state.peers.require(dst_chain)?;
        if peer != gateway {
            return Err(HubError::GatewayMismatch {
                chain: dst_chain,
                expected: gateway,
                got: peer,
            });
        }

        let mut planned = Vec::with_capacity(assets.len());
        for asset in assets {
            let index = registry
                .token_index(&asset.token)
                .ok_or(HubError::UnknownSyntheticToken(asset.token))?;
            let (link, entry) =
                registry
                    .link_by_synthetic(index, dst_chain)
                    .ok_or(HubError::TokenNotLinkedToDestChain {
                        token: asset.token,
                        chain: dst_chain,
                    })?;

            if entry.paused {
                return Err(HubError::TokenPaused {
                    chain: dst_chain,
                    token: entry.remote_token,
                });
            }

            let burn = entry.decimals_delta.remove_synthetic_dust(asset.amount)?;
            let remote = entry.decimals_delta.to_remote(burn)?;
            if remote == U256::ZERO {
                return Err(HubError::AmountIsTooSmall(asset.token));
            }

            planned.push(PlannedBurn {
                link,
                synthetic: asset.token,
                burn,
                remote: Asset::new(entry.remote_token, remote),
            });
        }

        let mut released: BTreeMap<LinkIdx, U256> = BTreeMap::new();
        for plan in &planned {
            let total = released.entry(plan.link).or_default();
            *total = total
                .checked_add(plan.remote.amount)
                .ok_or(HubError::Overflow("withdrawal"))?;

            let available = registry
                .link(plan.link)
                .map(|entry| entry.cumulative_locked)
                .unwrap_or_default();
            if *total > available {
                return Err(HubError::InsufficientBalanceOnDestChain {
                    token: plan.remote.token,
                    chain: dst_chain,
                    requested: *total,
                    available,
                });
            }
        }

        Ok((peer, planned))
    }

    /// Ensures `caller` holds enough of every synthetic token for all burns together.
    fn check_burns(&self, caller: &Address, planned: &[PlannedBurn]) -> HubResult<()> {
        let mut burned: BTreeMap<Address, U256> = BTreeMap::new();
        for plan in planned {
            let total = burned.entry(plan.synthetic).or_default();
            *total = total
                .checked_add(plan.burn)
                .ok_or(HubError::Overflow("withdrawal"))?;

            self.synthetic_ledger(&plan.synthetic)?
                .check_balance(caller, *total)?;
        }

        Ok(())
    }
}

fn unlock_message(recipient: Address, planned: &[PlannedBurn]) -> BridgeMessage {
    BridgeMessage::Unlock {
        recipient,
        assets: planned.iter().map(|plan| plan.remote).collect(),
    }
}
