//! Fungible token ledgers.
//!
//! On the Hub these hold the synthetic tokens, which only the Hub mints and burns. On a Gateway's
//! chain they stand in for the real token contracts the Gateway takes custody of.
//!
//! Every operation checks all of its preconditions before changing anything.

use std::collections::BTreeMap;

use omnibridge_primitives::{types::Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No ledger exists for the token.
    #[error("unknown token {0}")]
    UnknownToken(Address),

    /// A ledger for the token exists already.
    #[error("token {0} already exists")]
    TokenExists(Address),

    /// The holder's balance is too low.
    #[error("{holder} holds {available} of {token}, needs {needed}")]
    InsufficientBalance {
        /// The token.
        token: Address,
        /// The account being debited.
        holder: Address,
        /// Amount to debit.
        needed: U256,
        /// Current balance.
        available: U256,
    },

    /// The spender's allowance is too low.
    #[error("{spender} may spend {available} of {token} for {holder}, needs {needed}")]
    InsufficientAllowance {
        /// The token.
        token: Address,
        /// The account being debited.
        holder: Address,
        /// The account spending on the holder's behalf.
        spender: Address,
        /// Amount to spend.
        needed: U256,
        /// Current allowance.
        available: U256,
    },

    /// The total supply would exceed 256 bits.
    #[error("supply of {0} overflows")]
    SupplyOverflow(Address),
}

/// The balances of a single token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    address: Address,
    symbol: String,
    name: String,
    decimals: u8,
    total_supply: U256,
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<Address, BTreeMap<Address, U256>>,
}

impl TokenLedger {
    /// Creates an empty ledger.
    pub fn new(
        address: Address,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            total_supply: U256::ZERO,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// Address of the token.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of decimals of the base unit.
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Sum of all balances.
    pub const fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Balance of `holder`.
    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    /// Amount `spender` may move out of `holder`'s balance.
    pub fn allowance(&self, holder: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(holder)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    /// Accounts with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &U256)> + '_ {
        self.balances.iter()
    }

    /// Fails unless `holder` can be debited `amount`.
    pub fn check_balance(&self, holder: &Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: self.address,
                holder: *holder,
                needed: amount,
                available,
            });
        }

        Ok(())
    }

    /// Fails unless `spender` can move `amount` out of `holder`'s balance.
    pub fn check_transfer_from(
        &self,
        spender: &Address,
        holder: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.allowance(holder, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                token: self.address,
                holder: *holder,
                spender: *spender,
                needed: amount,
                available,
            });
        }

        self.check_balance(holder, amount)
    }

    /// Creates `amount` new tokens for `to`.
    pub fn mint(&mut self, to: &Address, amount: U256) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow(self.address))?;

        self.total_supply = supply;
        // balances are bounded by the supply
        *self.balances.entry(*to).or_default() += amount;

        Ok(())
    }

    /// Destroys `amount` tokens held by `from`.
    pub fn burn(&mut self, from: &Address, amount: U256) -> Result<(), LedgerError> {
        self.check_balance(from, amount)?;

        self.debit(from, amount);
        self.total_supply -= amount;

        Ok(())
    }

    /// Moves `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.check_balance(from, amount)?;

        self.debit(from, amount);
        *self.balances.entry(*to).or_default() += amount;

        Ok(())
    }

    /// Sets the amount `spender` may move out of `holder`'s balance.
    pub fn approve(&mut self, holder: &Address, spender: &Address, amount: U256) {
        self.allowances
            .entry(*holder)
            .or_default()
            .insert(*spender, amount);
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.check_transfer_from(spender, from, amount)?;

        let remaining = self.allowance(from, spender) - amount;
        self.approve(from, spender, remaining);
        self.transfer(from, to, amount)
    }

    fn debit(&mut self, holder: &Address, amount: U256) {
        if let Some(balance) = self.balances.get_mut(holder) {
            *balance -= amount;
            if *balance == U256::ZERO {
                self.balances.remove(holder);
            }
        }
    }
}

/// The token ledgers of one chain, keyed by token address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBook(BTreeMap<Address, TokenLedger>);

impl AssetBook {
    /// Adds a new token.
    pub fn insert(&mut self, ledger: TokenLedger) -> Result<(), LedgerError> {
        let address = ledger.address();
        if self.0.contains_key(&address) {
            return Err(LedgerError::TokenExists(address));
        }

        self.0.insert(address, ledger);
        Ok(())
    }

    /// The ledger of `token`.
    pub fn get(&self, token: &Address) -> Result<&TokenLedger, LedgerError> {
        self.0.get(token).ok_or(LedgerError::UnknownToken(*token))
    }

    /// The mutable ledger of `token`.
    pub fn get_mut(&mut self, token: &Address) -> Result<&mut TokenLedger, LedgerError> {
        self.0.get_mut(token).ok_or(LedgerError::UnknownToken(*token))
    }

    /// Whether a ledger exists for `token`.
    pub fn contains(&self, token: &Address) -> bool {
        self.0.contains_key(token)
    }

    /// Balance of `holder` in `token`, zero for unknown tokens.
    pub fn balance_of(&self, token: &Address, holder: &Address) -> U256 {
        self.0
            .get(token)
            .map(|ledger| ledger.balance_of(holder))
            .unwrap_or_default()
    }

    /// All ledgers in address order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenLedger> + '_ {
        self.0.values()
    }
}
