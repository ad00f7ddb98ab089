use std::collections::BTreeMap;

use omnibridge_primitives::{
    types::{Address, Asset},
    U256,
};
use omnibridge_transport::Origin;
use tracing::{info, warn};

use crate::{
    gateway::{
        config::GatewayCfg,
        errors::{GatewayError, GatewayResult},
        machine::{GatewayOutput, GatewaySM},
        transitions::check_batch_len,
    },
    signals::GatewaySignal,
};

impl GatewaySM {
    /// Processes an unlock of tokens burned on the Hub.
    ///
    /// Unlocks are all or nothing: if any asset cannot be released, the message fails and stays
    /// verified until the Gateway is unpaused or holds enough locked tokens.
    pub(crate) fn process_unlock(
        &mut self,
        cfg: &GatewayCfg,
        origin: &Origin,
        recipient: Address,
        assets: Vec<Asset>,
    ) -> GatewayResult<GatewayOutput> {
        if let Err(err) = self.check_unlock(cfg, recipient, &assets) {
            warn!(%origin, %recipient, %err, "unlock rejected");
            return Err(err);
        }

        let gateway = self.context.address;
        let mut signals = Vec::with_capacity(assets.len());
        for asset in assets {
            self.state
                .assets
                .get_mut(&asset.token)?
                .transfer(&gateway, &recipient, asset.amount)?;

            if let Some(entry) = self.state.tokens.get_mut(&asset.token) {
                entry.locked -= asset.amount;
            }

            info!(%origin, token = %asset.token, %recipient, amount = %asset.amount, "released tokens");
            signals.push(GatewaySignal::Released {
                token: asset.token,
                recipient,
                amount: asset.amount,
            });
        }

        Ok(GatewayOutput::with_signals(signals))
    }

    fn check_unlock(
        &self,
        cfg: &GatewayCfg,
        recipient: Address,
        assets: &[Asset],
    ) -> GatewayResult<()> {
        if self.state.paused {
            return Err(GatewayError::GatewayPaused);
        }
        check_batch_len(assets.len(), cfg.max_batch_len())?;
        if recipient.is_zero() {
            return Err(GatewayError::ZeroAddress);
        }

        let mut totals: BTreeMap<Address, U256> = BTreeMap::new();
        for asset in assets {
            let entry = self
                .state
                .tokens
                .get(&asset.token)
                .ok_or(GatewayError::TokenNotRegistered(asset.token))?;

            let total = totals.entry(asset.token).or_default();
            *total = total
                .checked_add(asset.amount)
                .ok_or(GatewayError::Overflow("unlock"))?;

            if *total > entry.locked {
                return Err(GatewayError::InsufficientLockedBalance {
                    token: asset.token,
                    requested: *total,
                    locked: entry.locked,
                });
            }

            self.state
                .assets
                .get(&asset.token)?
                .check_balance(&self.context.address, *total)?;
        }

        Ok(())
    }
}
