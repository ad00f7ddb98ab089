//! Calls made directly by the owner of the Hub, and plain token transfers.

use omnibridge_primitives::{
    decimals::DecimalsDelta,
    types::{Address, ChainId, LinkIdx},
    U256,
};
use omnibridge_wire::{LinkAckItem, LinkAckStatus};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    hub::{
        duties::HubDuty,
        errors::{HubError, HubResult},
        machine::HubSM,
        registry::{LinkEntry, NewLink},
    },
    ledger::TokenLedger,
};

/// Domain separator of derived synthetic token addresses.
const SYNTHETIC_TOKEN_DOMAIN: &[u8] = b"omnibridge/synthetic";

/// Derives the address of the synthetic token `symbol` created by the Hub at `hub`.
pub fn synthetic_token_address(hub: &Address, symbol: &str) -> Address {
    let digest = Sha256::new()
        .chain_update(SYNTHETIC_TOKEN_DOMAIN)
        .chain_update(hub.as_bytes())
        .chain_update(symbol.as_bytes())
        .finalize();

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    Address::new(bytes)
}

impl HubSM {
    /// Creates a synthetic token and returns its address.
    pub fn create_synthetic_token(
        &mut self,
        caller: &Address,
        symbol: &str,
        decimals: u8,
    ) -> HubResult<Address> {
        self.check_owner(caller)?;

        let address = synthetic_token_address(&self.context.address, symbol);
        if self.state.ledgers.contains(&address) {
            return Err(HubError::SymbolTaken(symbol.to_string()));
        }

        let index = self
            .state
            .registry
            .create_token(address, symbol, decimals)?;
        self.state.ledgers.insert(TokenLedger::new(
            address,
            symbol,
            format!("Synthetic {symbol}"),
            decimals,
        ))?;

        info!(%symbol, %address, %index, %decimals, "created synthetic token");
        Ok(address)
    }

    /// Links `synthetic` to `remote_token` held by `gateway` on `chain`.
    #[expect(clippy::too_many_arguments)]
    pub fn link_remote_token(
        &mut self,
        caller: &Address,
        synthetic: &Address,
        chain: ChainId,
        remote_token: Address,
        gateway: Address,
        decimals_delta: i8,
        min_bridge_amount: U256,
    ) -> HubResult<LinkIdx> {
        self.check_owner(caller)?;

        let decimals_delta = DecimalsDelta::new(decimals_delta)?;
        let index = self
            .state
            .registry
            .token_index(synthetic)
            .ok_or(HubError::UnknownSyntheticToken(*synthetic))?;

        let link = self.state.registry.insert_link(
            index,
            NewLink {
                chain,
                remote_token,
                gateway,
                decimals_delta,
                min_bridge_amount,
                paused: false,
            },
        )?;

        info!(%synthetic, %chain, %remote_token, %gateway, %decimals_delta, "linked remote token");
        Ok(link)
    }

    /// Trusts `peer` as the gateway of `chain`.
    pub fn set_peer(&mut self, caller: &Address, chain: ChainId, peer: Address) -> HubResult<()> {
        self.check_owner(caller)?;
        self.state.peers.set(chain, peer)?;

        info!(%chain, %peer, "set peer");
        Ok(())
    }

    /// Pauses or resumes deposits and withdrawals over the link of `synthetic` to `chain`.
    pub fn set_link_paused(
        &mut self,
        caller: &Address,
        synthetic: &Address,
        chain: ChainId,
        paused: bool,
    ) -> HubResult<()> {
        self.check_owner(caller)?;

        let (link, _) = self.linked_entry(synthetic, chain)?;
        if let Some(entry) = self.state.registry.link_mut(link) {
            entry.paused = paused;
        }

        info!(%synthetic, %chain, %paused, "set link pause");
        Ok(())
    }

    /// Changes the smallest deposit accepted over the link of `synthetic` to `chain`.
    ///
    /// Returns the acknowledgement carrying the link's new values to its gateway, which adopts
    /// them on delivery. Until then the gateway keeps gating deposits on the old minimum.
    pub fn set_min_bridge_amount(
        &mut self,
        caller: &Address,
        synthetic: &Address,
        chain: ChainId,
        min_bridge_amount: U256,
    ) -> HubResult<HubDuty> {
        self.check_owner(caller)?;

        let (link, _) = self.linked_entry(synthetic, chain)?;
        let entry = self
            .state
            .registry
            .link_mut(link)
            .ok_or(HubError::TokenNotLinkedToDestChain {
                token: *synthetic,
                chain,
            })?;
        entry.min_bridge_amount = min_bridge_amount;

        info!(%synthetic, %chain, %min_bridge_amount, "set minimum bridge amount");
        Ok(HubDuty::SendLinkAck {
            dst_chain: chain,
            receiver: entry.gateway,
            items: vec![LinkAckItem {
                token: entry.remote_token,
                status: LinkAckStatus::Existing,
                synthetic_token: *synthetic,
                decimals_delta: entry.decimals_delta,
                min_bridge_amount: entry.min_bridge_amount,
                paused: entry.paused,
            }],
        })
    }

    fn linked_entry(
        &self,
        synthetic: &Address,
        chain: ChainId,
    ) -> HubResult<(LinkIdx, &LinkEntry)> {
        let index = self
            .state
            .registry
            .token_index(synthetic)
            .ok_or(HubError::UnknownSyntheticToken(*synthetic))?;

        self.state
            .registry
            .link_by_synthetic(index, chain)
            .ok_or(HubError::TokenNotLinkedToDestChain {
                token: *synthetic,
                chain,
            })
    }

    /// Pauses or resumes the whole Hub.
    pub fn set_paused(&mut self, caller: &Address, paused: bool) -> HubResult<()> {
        self.check_owner(caller)?;
        self.state.paused = paused;

        info!(%paused, "set hub pause");
        Ok(())
    }

    /// Hands the Hub over to `new_owner`.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> HubResult<()> {
        self.check_owner(caller)?;
        if new_owner.is_zero() {
            return Err(HubError::ZeroAddress);
        }

        self.state.owner = new_owner;
        info!(%new_owner, "transferred ownership");
        Ok(())
    }

    /// Moves synthetic tokens between accounts on the Hub.
    pub fn transfer(
        &mut self,
        caller: &Address,
        synthetic: &Address,
        to: &Address,
        amount: U256,
    ) -> HubResult<()> {
        if to.is_zero() {
            return Err(HubError::ZeroAddress);
        }

        self.state
            .ledgers
            .get_mut(synthetic)?
            .transfer(caller, to, amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_addresses_depend_on_hub_and_symbol() {
        let hub = Address::from_low_u64_be(1);
        let other = Address::from_low_u64_be(2);

        assert_eq!(
            synthetic_token_address(&hub, "USDC"),
            synthetic_token_address(&hub, "USDC")
        );
        assert_ne!(
            synthetic_token_address(&hub, "USDC"),
            synthetic_token_address(&hub, "USDT")
        );
        assert_ne!(
            synthetic_token_address(&hub, "USDC"),
            synthetic_token_address(&other, "USDC")
        );
    }
}
