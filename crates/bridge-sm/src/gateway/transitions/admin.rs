//! Owner operations of the Gateway.

use omnibridge_primitives::{
    types::{Address, ChainId},
    U256,
};
use tracing::info;

use crate::gateway::{
    errors::{GatewayError, GatewayResult},
    machine::GatewaySM,
};

impl GatewaySM {
    /// Sets the trusted controller on `chain`.
    pub fn set_peer(&mut self, caller: &Address, chain: ChainId, peer: Address) -> GatewayResult<()> {
        self.check_owner(caller)?;
        self.state.peers.set(chain, peer)?;

        info!(%chain, %peer, "set peer");
        Ok(())
    }

    /// Pauses or unpauses deposits of a single token.
    pub fn set_token_paused(
        &mut self,
        caller: &Address,
        token: &Address,
        paused: bool,
    ) -> GatewayResult<()> {
        self.check_owner(caller)?;
        let entry = self
            .state
            .tokens
            .get_mut(token)
            .ok_or(GatewayError::TokenNotRegistered(*token))?;
        entry.paused = paused;

        info!(%token, %paused, "set token pause");
        Ok(())
    }

    /// Pauses or unpauses the whole Gateway, deposits and unlocks alike.
    pub fn set_paused(&mut self, caller: &Address, paused: bool) -> GatewayResult<()> {
        self.check_owner(caller)?;
        self.state.paused = paused;

        info!(%paused, "set gateway pause");
        Ok(())
    }

    /// Hands the Gateway to a new owner.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> GatewayResult<()> {
        self.check_owner(caller)?;
        if new_owner.is_zero() {
            return Err(GatewayError::ZeroAddress);
        }
        self.state.owner = new_owner;

        info!(%new_owner, "transferred ownership");
        Ok(())
    }

    /// Custody balance of `token` that does not back any synthetic tokens, e.g. tokens sent to
    /// the Gateway directly.
    pub fn stranded_balance(&self, token: &Address) -> U256 {
        self.balance_of(token, &self.context.address)
            .saturating_sub(self.locked_balance(token))
    }

    /// Sends stranded tokens to `to`. Locked tokens can never be rescued.
    pub fn rescue_tokens(
        &mut self,
        caller: &Address,
        token: &Address,
        amount: U256,
        to: Address,
    ) -> GatewayResult<()> {
        self.check_owner(caller)?;
        if to.is_zero() {
            return Err(GatewayError::ZeroAddress);
        }

        let stranded = self.stranded_balance(token);
        if amount > stranded {
            return Err(GatewayError::RescueExceedsStranded {
                token: *token,
                requested: amount,
                stranded,
            });
        }

        let gateway = self.context.address;
        self.state
            .assets
            .get_mut(token)?
            .transfer(&gateway, &to, amount)?;

        info!(%token, %amount, %to, "rescued stranded tokens");
        Ok(())
    }
}
