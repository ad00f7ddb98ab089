//! Deposits of real tokens into the Gateway.
//!
//! Every asset passes the gate before anything moves. The Gateway then sends the `Deposit` to the
//! Hub and only afterwards pulls the tokens into custody, so a refused send leaves the caller's
//! balances untouched.

use std::collections::BTreeMap;

use omnibridge_primitives::{
    types::{Address, Asset},
    U256,
};
use omnibridge_transport::{MessageSender, MessagingFee, MessagingReceipt, SendOptions};
use omnibridge_wire::BridgeMessage;
use serde::Serialize;
use tracing::{info, warn};

use crate::gateway::{
    config::GatewayCfg,
    errors::{GatewayError, GatewayResult},
    machine::GatewaySM,
    transitions::check_batch_len,
};

/// Price and content of a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositQuote {
    /// Fee charged by the transport.
    pub fee: MessagingFee,
    /// Amounts that would be locked, after dust removal.
    pub assets: Vec<Asset>,
}

/// Result of a successful [`GatewaySM::deposit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositReceipt {
    /// Receipt of the `Deposit` message.
    pub receipt: MessagingReceipt,
    /// Locked amounts, after dust removal.
    pub locked: Vec<Asset>,
}

impl GatewaySM {
    /// Prices a deposit without executing it.
    pub fn quote_deposit(
        &self,
        cfg: &GatewayCfg,
        caller: &Address,
        recipient: Address,
        assets: &[Asset],
        options: &SendOptions,
        transport: &impl MessageSender,
    ) -> GatewayResult<DepositQuote> {
        let locked = self.check_deposit(cfg, caller, recipient, assets)?;
        let message = BridgeMessage::Deposit {
            recipient,
            assets: locked.clone(),
        };
        let fee = transport.quote(self.context.hub_chain, message.encoded_len(), options)?;

        Ok(DepositQuote {
            fee,
            assets: locked,
        })
    }

    /// Locks `caller`'s tokens and sends a `Deposit` to the Hub, which mints the synthetic
    /// counterparts to `recipient`.
    ///
    /// The caller must have approved the Gateway for the amounts. For tokens with more decimals
    /// than their synthetic counterpart, only the part the Hub can represent is pulled.
    #[expect(clippy::too_many_arguments)]
    pub fn deposit(
        &mut self,
        cfg: &GatewayCfg,
        caller: &Address,
        recipient: Address,
        assets: &[Asset],
        options: &SendOptions,
        fee: U256,
        transport: &mut impl MessageSender,
    ) -> GatewayResult<DepositReceipt> {
        let locked = match self.check_deposit(cfg, caller, recipient, assets) {
            Ok(locked) => locked,
            Err(err) => {
                warn!(%caller, %recipient, %err, "deposit rejected");
                return Err(err);
            }
        };

        let hub = self.state.peers.require(self.context.hub_chain)?;
        let message = BridgeMessage::Deposit {
            recipient,
            assets: locked.clone(),
        };
        let receipt = transport.send(
            self.context.address,
            self.context.hub_chain,
            hub,
            message.encode(),
            options,
            fee,
        )?;

        let gateway = self.context.address;
        for asset in &locked {
            self.state
                .assets
                .get_mut(&asset.token)?
                .transfer_from(&gateway, caller, &gateway, asset.amount)?;

            if let Some(entry) = self.state.tokens.get_mut(&asset.token) {
                entry.locked += asset.amount;
            }
        }

        info!(%caller, %recipient, guid = %receipt.guid, nonce = %receipt.nonce, items = locked.len(), "deposited tokens");

        Ok(DepositReceipt { receipt, locked })
    }

    /// Runs the deposit gate and returns the dust-free amounts to lock.
    fn check_deposit(
        &self,
        cfg: &GatewayCfg,
        caller: &Address,
        recipient: Address,
        assets: &[Asset],
    ) -> GatewayResult<Vec<Asset>> {
        if self.state.paused {
            return Err(GatewayError::GatewayPaused);
        }
        check_batch_len(assets.len(), cfg.max_batch_len())?;
        if recipient.is_zero() {
            return Err(GatewayError::ZeroAddress);
        }

        let mut locked = Vec::with_capacity(assets.len());
        let mut totals: BTreeMap<Address, U256> = BTreeMap::new();
        for asset in assets {
            let entry = self
                .state
                .tokens
                .get(&asset.token)
                .ok_or(GatewayError::TokenNotRegistered(asset.token))?;

            if !entry.is_confirmed() {
                return Err(GatewayError::TokenNotConfirmed {
                    token: asset.token,
                    status: entry.status,
                });
            }
            if entry.paused {
                return Err(GatewayError::TokenPaused(asset.token));
            }

            // the minimum applies to the dust-free amount, as on the Hub
            let amount = entry.decimals_delta.remove_remote_dust(asset.amount)?;
            if amount == U256::ZERO {
                return Err(GatewayError::AmountIsTooSmall(asset.token));
            }
            if amount < entry.min_bridge_amount {
                return Err(GatewayError::BelowMinimumBridgeAmount {
                    token: asset.token,
                    amount,
                    min: entry.min_bridge_amount,
                });
            }

            let total = totals.entry(asset.token).or_default();
            *total = total
                .checked_add(amount)
                .ok_or(GatewayError::Overflow("deposit"))?;

            self.state.assets.get(&asset.token)?.check_transfer_from(
                &self.context.address,
                caller,
                *total,
            )?;
            entry
                .locked
                .checked_add(*total)
                .ok_or(GatewayError::Overflow("locked balance"))?;

            locked.push(Asset::new(asset.token, amount));
        }

        Ok(locked)
    }
}
