use std::collections::BTreeMap;

use omnibridge_params::controller::BatchPolicy;
use omnibridge_primitives::{
    types::{Address, Asset, LinkIdx},
    U256,
};
use omnibridge_transport::Origin;
use tracing::{info, warn};

use crate::{
    hub::{
        config::HubCfg,
        errors::{HubError, HubResult},
        machine::{HubOutput, HubSM},
        transitions::check_batch_len,
    },
    signals::HubSignal,
};

/// What a single accepted deposit item does to the Hub.
#[derive(Debug, Clone, Copy)]
struct PlannedMint {
    link: LinkIdx,
    synthetic: Address,
    /// Synthetic units minted to the recipient.
    minted: U256,
    /// Remote units added to the link's locked balance.
    credited: U256,
}

impl HubSM {
    /// Processes a deposit of tokens locked in the sending gateway.
    ///
    /// Every item is validated before any token is minted. Under [`BatchPolicy::AllOrNothing`]
    /// the first failing item fails the message; under [`BatchPolicy::PerItem`] failing items are
    /// reported with [`HubSignal::DepositItemRejected`] and the message only fails if no item is
    /// left.
    pub(crate) fn process_deposit(
        &mut self,
        cfg: &HubCfg,
        origin: &Origin,
        recipient: Address,
        assets: Vec<Asset>,
    ) -> HubResult<HubOutput> {
        if self.state.paused {
            return Err(HubError::HubPaused);
        }
        check_batch_len(assets.len(), cfg.max_batch_len())?;
        if recipient.is_zero() {
            return Err(HubError::ZeroAddress);
        }

        let mut planned = Vec::with_capacity(assets.len());
        let mut signals = Vec::new();
        let mut first_rejection = None;

        for asset in &assets {
            match self.plan_mint(origin, asset) {
                Ok(plan) => planned.push(plan),
                Err(err) if cfg.deposit_policy() == BatchPolicy::AllOrNothing => {
                    warn!(%origin, token = %asset.token, amount = %asset.amount, %err, "deposit rejected");
                    return Err(err);
                }
                Err(err) => {
                    warn!(%origin, token = %asset.token, amount = %asset.amount, %err, "deposit item rejected");
                    signals.push(HubSignal::DepositItemRejected {
                        src_chain: origin.src_chain,
                        token: asset.token,
                        amount: asset.amount,
                        reason: err.to_string(),
                    });
                    if first_rejection.is_none() {
                        first_rejection = Some(err);
                    }
                }
            }
        }

        if planned.is_empty() {
            let rejected = signals.len();
            return Err(match first_rejection {
                Some(first) => HubError::BatchRejected {
                    rejected,
                    first: Box::new(first),
                },
                None => HubError::EmptyBatch,
            });
        }

        self.check_mint_totals(&planned)?;

        for plan in &planned {
            self.state
                .ledgers
                .get_mut(&plan.synthetic)?
                .mint(&recipient, plan.minted)?;

            if let Some(entry) = self.state.registry.link_mut(plan.link) {
                entry.cumulative_locked += plan.credited;
            }

            info!(%origin, synthetic = %plan.synthetic, %recipient, minted = %plan.minted, "minted synthetic tokens");
            signals.push(HubSignal::Minted {
                src_chain: origin.src_chain,
                synthetic_token: plan.synthetic,
                recipient,
                amount: plan.minted,
            });
        }

        Ok(HubOutput::with_signals(signals))
    }

    fn plan_mint(&self, origin: &Origin, asset: &Asset) -> HubResult<PlannedMint> {
        let registry = &self.state.registry;
        let (link, entry) = registry
            .link_by_remote(origin.src_chain, &asset.token)
            .ok_or(HubError::TokenNotRegistered {
                chain: origin.src_chain,
                token: asset.token,
            })?;

        if entry.gateway != origin.sender {
            return Err(HubError::GatewayMismatch {
                chain: origin.src_chain,
                expected: entry.gateway,
                got: origin.sender,
            });
        }

        if entry.paused {
            return Err(HubError::TokenPaused {
                chain: origin.src_chain,
                token: asset.token,
            });
        }

        if asset.amount < entry.min_bridge_amount {
            return Err(HubError::BelowMinimumBridgeAmount {
                token: asset.token,
                amount: asset.amount,
                min: entry.min_bridge_amount,
            });
        }

        let minted = entry.decimals_delta.to_synthetic(asset.amount)?;
        if minted == U256::ZERO {
            return Err(HubError::AmountIsTooSmall(asset.token));
        }
        let credited = entry.decimals_delta.to_remote(minted)?;

        let synthetic = registry
            .token(entry.synthetic)
            .ok_or(HubError::UnknownTokenIndex(entry.synthetic))?
            .address;

        Ok(PlannedMint {
            link,
            synthetic,
            minted,
            credited,
        })
    }

    /// Ensures that neither a total supply nor a locked balance overflows once all items apply.
    fn check_mint_totals(&self, planned: &[PlannedMint]) -> HubResult<()> {
        let mut minted: BTreeMap<Address, U256> = BTreeMap::new();
        let mut credited: BTreeMap<LinkIdx, U256> = BTreeMap::new();

        for plan in planned {
            let supply = match minted.get(&plan.synthetic) {
                Some(total) => *total,
                None => self.synthetic_ledger(&plan.synthetic)?.total_supply(),
            };
            let supply = supply
                .checked_add(plan.minted)
                .ok_or(HubError::Overflow("total supply"))?;
            minted.insert(plan.synthetic, supply);

            let locked = match credited.get(&plan.link) {
                Some(total) => *total,
                None => self
                    .state
                    .registry
                    .link(plan.link)
                    .map(|entry| entry.cumulative_locked)
                    .unwrap_or_default(),
            };
            let locked = locked
                .checked_add(plan.credited)
                .ok_or(HubError::Overflow("cumulative locked"))?;
            credited.insert(plan.link, locked);
        }

        Ok(())
    }
}
