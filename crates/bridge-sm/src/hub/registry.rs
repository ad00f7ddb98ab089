//! The registry of synthetic tokens and their links to remote tokens.
//!
//! Tokens and links live in arenas indexed by [`TokenIdx`] and [`LinkIdx`]. Links are never
//! removed, so indices stay valid for the lifetime of the registry. Two secondary indices enforce
//! that each `(chain, remote token)` and each `(synthetic token, chain)` is linked at most once.

use std::collections::BTreeMap;

use omnibridge_primitives::{
    decimals::DecimalsDelta,
    types::{Address, ChainId, LinkIdx, TokenIdx},
    U256,
};
use serde::{Deserialize, Serialize};

use crate::hub::errors::{HubError, HubResult};

/// A synthetic token created by the Hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticToken {
    /// 1-based index in creation order.
    pub index: TokenIdx,
    /// Address of the token on the Hub.
    pub address: Address,
    /// Ticker symbol, unique among synthetic tokens.
    pub symbol: String,
    /// Number of decimals, fixed at creation.
    pub decimals: u8,
}

/// Binds a synthetic token to a token on a remote chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// The synthetic token.
    pub synthetic: TokenIdx,
    /// The remote chain.
    pub chain: ChainId,
    /// The real token on the remote chain.
    pub remote_token: Address,
    /// The gateway holding the real token.
    pub gateway: Address,
    /// `synthetic decimals - remote decimals`; immutable.
    pub decimals_delta: DecimalsDelta,
    /// Smallest deposit accepted, in remote units.
    #[serde(with = "ethnum::serde::permissive")]
    pub min_bridge_amount: U256,
    /// Whether deposits and withdrawals over the link are paused.
    pub paused: bool,
    /// Amount locked in the gateway on behalf of the Hub, in remote units.
    #[serde(with = "ethnum::serde::permissive")]
    pub cumulative_locked: U256,
}

/// Parameters of a link about to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLink {
    /// The remote chain.
    pub chain: ChainId,
    /// The real token on the remote chain.
    pub remote_token: Address,
    /// The gateway holding the real token.
    pub gateway: Address,
    /// `synthetic decimals - remote decimals`.
    pub decimals_delta: DecimalsDelta,
    /// Smallest deposit accepted, in remote units.
    pub min_bridge_amount: U256,
    /// Whether the link starts out paused.
    pub paused: bool,
}

/// Outcome of [`LinkRegistry::check_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCheck {
    /// The link can be created.
    New,
    /// The same mapping exists already at this index.
    Identical(LinkIdx),
}

/// Synthetic tokens and their links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkRegistry {
    tokens: Vec<SyntheticToken>,
    links: Vec<LinkEntry>,
    gateways: BTreeMap<ChainId, Address>,

    #[serde(skip)]
    by_symbol: BTreeMap<String, TokenIdx>,
    #[serde(skip)]
    by_address: BTreeMap<Address, TokenIdx>,
    #[serde(skip)]
    by_synthetic: BTreeMap<(TokenIdx, ChainId), LinkIdx>,
    #[serde(skip)]
    by_remote: BTreeMap<(ChainId, Address), LinkIdx>,
}

impl LinkRegistry {
    /// Registers a new synthetic token and returns its index.
    pub fn create_token(
        &mut self,
        address: Address,
        symbol: &str,
        decimals: u8,
    ) -> HubResult<TokenIdx> {
        if self.by_symbol.contains_key(symbol) || self.by_address.contains_key(&address) {
            return Err(HubError::SymbolTaken(symbol.to_string()));
        }

        let index = self.tokens.len() as TokenIdx + 1;
        self.tokens.push(SyntheticToken {
            index,
            address,
            symbol: symbol.to_string(),
            decimals,
        });
        self.by_symbol.insert(symbol.to_string(), index);
        self.by_address.insert(address, index);

        Ok(index)
    }

    /// Number of synthetic tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// All synthetic tokens in creation order.
    pub fn tokens(&self) -> &[SyntheticToken] {
        &self.tokens
    }

    /// The synthetic token with `index`.
    pub fn token(&self, index: TokenIdx) -> Option<&SyntheticToken> {
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        self.tokens.get(slot)
    }

    /// Index of the synthetic token at `address`.
    pub fn token_index(&self, address: &Address) -> Option<TokenIdx> {
        self.by_address.get(address).copied()
    }

    /// All links in creation order.
    pub fn links(&self) -> &[LinkEntry] {
        &self.links
    }

    /// The link with `index`.
    pub fn link(&self, index: LinkIdx) -> Option<&LinkEntry> {
        self.links.get(index as usize)
    }

    pub(crate) fn link_mut(&mut self, index: LinkIdx) -> Option<&mut LinkEntry> {
        self.links.get_mut(index as usize)
    }

    /// The link of a remote token.
    pub fn link_by_remote(
        &self,
        chain: ChainId,
        token: &Address,
    ) -> Option<(LinkIdx, &LinkEntry)> {
        let index = *self.by_remote.get(&(chain, *token))?;
        self.link(index).map(|entry| (index, entry))
    }

    /// The link of a synthetic token to `chain`.
    pub fn link_by_synthetic(
        &self,
        synthetic: TokenIdx,
        chain: ChainId,
    ) -> Option<(LinkIdx, &LinkEntry)> {
        let index = *self.by_synthetic.get(&(synthetic, chain))?;
        self.link(index).map(|entry| (index, entry))
    }

    /// Chains a synthetic token is linked to, in ascending order.
    pub fn linked_chains(&self, synthetic: TokenIdx) -> Vec<ChainId> {
        self.by_synthetic
            .range((synthetic, ChainId::MIN)..=(synthetic, ChainId::MAX))
            .map(|((_, chain), _)| *chain)
            .collect()
    }

    /// The gateway registered for `chain`.
    pub fn gateway_for(&self, chain: ChainId) -> Option<Address> {
        self.gateways.get(&chain).copied()
    }

    /// Checks whether `link` can be created for `synthetic`.
    pub fn check_link(&self, synthetic: TokenIdx, link: &NewLink) -> HubResult<LinkCheck> {
        if link.remote_token.is_zero() || link.gateway.is_zero() {
            return Err(HubError::ZeroAddress);
        }

        if self.token(synthetic).is_none() {
            return Err(HubError::UnknownTokenIndex(synthetic));
        }

        let already_linked = HubError::AlreadyLinked {
            chain: link.chain,
            token: link.remote_token,
        };

        if let Some((index, existing)) = self.link_by_remote(link.chain, &link.remote_token) {
            let identical = existing.synthetic == synthetic
                && existing.gateway == link.gateway
                && existing.decimals_delta == link.decimals_delta;

            return if identical {
                Ok(LinkCheck::Identical(index))
            } else {
                Err(already_linked)
            };
        }

        if self.by_synthetic.contains_key(&(synthetic, link.chain)) {
            return Err(already_linked);
        }

        match self.gateway_for(link.chain) {
            Some(expected) if expected != link.gateway => Err(HubError::GatewayMismatch {
                chain: link.chain,
                expected,
                got: link.gateway,
            }),
            _ => Ok(LinkCheck::New),
        }
    }

    /// Creates a link. Fails with [`HubError::AlreadyLinked`] even if an identical one exists.
    pub fn insert_link(&mut self, synthetic: TokenIdx, link: NewLink) -> HubResult<LinkIdx> {
        if let LinkCheck::Identical(_) = self.check_link(synthetic, &link)? {
            return Err(HubError::AlreadyLinked {
                chain: link.chain,
                token: link.remote_token,
            });
        }

        let index = self.links.len() as LinkIdx;
        self.links.push(LinkEntry {
            synthetic,
            chain: link.chain,
            remote_token: link.remote_token,
            gateway: link.gateway,
            decimals_delta: link.decimals_delta,
            min_bridge_amount: link.min_bridge_amount,
            paused: link.paused,
            cumulative_locked: U256::ZERO,
        });
        self.by_synthetic.insert((synthetic, link.chain), index);
        self.by_remote.insert((link.chain, link.remote_token), index);
        self.gateways.entry(link.chain).or_insert(link.gateway);

        Ok(index)
    }
}
