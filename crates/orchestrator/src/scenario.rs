//! Declarative scenarios that drive a [`Network`].
//!
//! A scenario is a TOML document with a name, a table of named accounts and a list of steps:
//!
//! ```toml
//! name = "deposit USDC"
//!
//! [accounts]
//! alice = "0x000000000000000000000000000000000000a11c"
//!
//! [[steps]]
//! action = "create_synthetic"
//! symbol = "sUSDC"
//! decimals = 18
//!
//! [[steps]]
//! action = "deposit"
//! chain = 10
//! from = "alice"
//! recipient = "alice"
//! assets = [{ token = "USDC", amount = 999_999 }]
//! expect_error = "BelowMinimumBridgeAmount"
//! ```
//!
//! Wherever an address is expected, a step may name an account, a local token symbol of the
//! step's chain, a synthetic token symbol, `hub`, `gateway` or a hex address. Administrative
//! actions act as the owner of the controller they target.

use std::collections::BTreeMap;

use omnibridge_primitives::{
    types::{Address, Asset, ChainId, Nonce},
    U256,
};
use omnibridge_sm::gateway::transitions::link::TokenConfig;
use omnibridge_transport::{ChannelKey, Delivery, SendOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    bus::MessageBus,
    errors::{OrchestratorError, OrchestratorResult},
    network::Network,
};

/// A named list of steps.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Name of the scenario, for reports.
    pub name: String,

    /// Named accounts the steps refer to.
    #[serde(default)]
    pub accounts: BTreeMap<String, Address>,

    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single action, optionally expected to fail.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// What to do.
    #[serde(flatten)]
    pub action: Action,

    /// The step must fail with an error whose name or message contains this text.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// A token named in a step together with an amount.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    /// Name or address of the token.
    pub token: String,

    /// Amount in the token's base units.
    #[serde(with = "ethnum::serde::permissive")]
    pub amount: U256,
}

/// A local token a Gateway asks the Hub to link.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkEntry {
    /// Local token.
    pub token: String,

    /// Synthetic token on the Hub.
    pub synthetic: String,

    /// Smallest deposit, in local units.
    #[serde(with = "ethnum::serde::permissive")]
    pub min_bridge_amount: U256,

    /// Whether deposits start paused.
    #[serde(default)]
    pub paused: bool,
}

/// Everything a scenario can do.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Creates a synthetic token on the Hub.
    CreateSynthetic {
        /// Ticker symbol.
        symbol: String,
        /// Decimals.
        decimals: u8,
    },

    /// Makes the Hub and the Gateway on `chain` peers of each other.
    Connect {
        /// Chain of the Gateway.
        chain: ChainId,
    },

    /// Sends a link request from the Gateway on `chain`.
    LinkTokens {
        /// Chain of the Gateway.
        chain: ChainId,
        /// Tokens to link.
        tokens: Vec<LinkEntry>,
        /// Gas to buy on the Hub.
        #[serde(default)]
        gas_limit: Option<u64>,
    },

    /// Mints local tokens on a Gateway's chain.
    Mint {
        /// Chain of the Gateway.
        chain: ChainId,
        /// The local token.
        token: String,
        /// Receiver.
        to: String,
        /// Amount.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Approves the Gateway on `chain` to pull `holder`'s tokens.
    Approve {
        /// Chain of the Gateway.
        chain: ChainId,
        /// The local token.
        token: String,
        /// The approving account.
        holder: String,
        /// Allowance.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Deposits local tokens into the Gateway on `chain`, paying the quoted fee.
    Deposit {
        /// Chain of the Gateway.
        chain: ChainId,
        /// Depositor.
        from: String,
        /// Receiver of the synthetic tokens on the Hub.
        recipient: String,
        /// Deposited tokens.
        assets: Vec<AssetEntry>,
        /// Gas to buy on the Hub.
        #[serde(default)]
        gas_limit: Option<u64>,
    },

    /// Withdraws synthetic tokens to `dst_chain`, paying the quoted fee.
    Bridge {
        /// Holder of the synthetic tokens.
        from: String,
        /// Receiver of the released tokens.
        recipient: String,
        /// Chain to release the tokens on.
        dst_chain: ChainId,
        /// Synthetic tokens to withdraw.
        assets: Vec<AssetEntry>,
        /// Gas to buy on the destination.
        #[serde(default)]
        gas_limit: Option<u64>,
    },

    /// Relays the next packet on the bus.
    RelayNext,

    /// Relays until the bus is empty.
    RelayAll,

    /// Holds back the next packet on the bus.
    HoldNext,

    /// Returns every held packet to the bus.
    ReleaseAll,

    /// Pauses or resumes the Hub.
    PauseHub {
        /// New pause flag.
        paused: bool,
    },

    /// Pauses or resumes the Gateway on `chain`.
    PauseGateway {
        /// Chain of the Gateway.
        chain: ChainId,
        /// New pause flag.
        paused: bool,
    },

    /// Pauses or resumes the Hub's link of `synthetic` to `chain`.
    PauseLink {
        /// The synthetic token.
        synthetic: String,
        /// The linked chain.
        chain: ChainId,
        /// New pause flag.
        paused: bool,
    },

    /// Changes the minimum of the Hub's link of `synthetic` to `chain`.
    SetMinBridgeAmount {
        /// The synthetic token.
        synthetic: String,
        /// The linked chain.
        chain: ChainId,
        /// New minimum, in remote units.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Pauses or resumes deposits of `token` on the Gateway on `chain`.
    PauseToken {
        /// Chain of the Gateway.
        chain: ChainId,
        /// The local token.
        token: String,
        /// New pause flag.
        paused: bool,
    },

    /// Retries a stuck message sent from `src_chain` to `chain`.
    Retry {
        /// Destination chain.
        chain: ChainId,
        /// Source chain.
        src_chain: ChainId,
        /// Nonce of the message.
        nonce: Nonce,
        /// Gas limit to execute with instead of the paid one.
        #[serde(default)]
        gas_limit: Option<u64>,
    },

    /// Skips a stuck message, as the receiver's owner.
    Skip {
        /// Destination chain.
        chain: ChainId,
        /// Source chain.
        src_chain: ChainId,
        /// Nonce of the message.
        nonce: Nonce,
    },

    /// Clears a stuck message without running it, as the receiver's owner.
    Clear {
        /// Destination chain.
        chain: ChainId,
        /// Source chain.
        src_chain: ChainId,
        /// Nonce of the message.
        nonce: Nonce,
    },

    /// Checks a balance on any chain.
    ExpectBalance {
        /// The chain.
        chain: ChainId,
        /// The token.
        token: String,
        /// The holder.
        holder: String,
        /// Expected balance.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Checks the locked balance of a Gateway.
    ExpectLocked {
        /// Chain of the Gateway.
        chain: ChainId,
        /// The local token.
        token: String,
        /// Expected locked balance.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Checks the amount the Hub believes is locked behind a link.
    ExpectCumulativeLocked {
        /// The synthetic token.
        synthetic: String,
        /// The linked chain.
        chain: ChainId,
        /// Expected amount in remote units.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Checks the total supply of a synthetic token.
    ExpectSupply {
        /// The synthetic token.
        synthetic: String,
        /// Expected supply.
        #[serde(with = "ethnum::serde::permissive")]
        amount: U256,
    },

    /// Checks the counters of the channel from `src_chain` into `chain`.
    ExpectNonce {
        /// Destination chain.
        chain: ChainId,
        /// Source chain.
        src_chain: ChainId,
        /// Expected inbound nonce.
        #[serde(default)]
        inbound_nonce: Option<Nonce>,
        /// Expected verified nonce.
        #[serde(default)]
        verified_nonce: Option<Nonce>,
    },

    /// Checks the number of packets dropped for not coming from a peer.
    ExpectPeerRejections {
        /// Expected number of rejections over all endpoints.
        count: usize,
    },
}

impl Action {
    /// The name of the action as written in scenarios.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateSynthetic { .. } => "create_synthetic",
            Self::Connect { .. } => "connect",
            Self::LinkTokens { .. } => "link_tokens",
            Self::Mint { .. } => "mint",
            Self::Approve { .. } => "approve",
            Self::Deposit { .. } => "deposit",
            Self::Bridge { .. } => "bridge",
            Self::RelayNext => "relay_next",
            Self::RelayAll => "relay_all",
            Self::HoldNext => "hold_next",
            Self::ReleaseAll => "release_all",
            Self::PauseHub { .. } => "pause_hub",
            Self::PauseGateway { .. } => "pause_gateway",
            Self::PauseLink { .. } => "pause_link",
            Self::PauseToken { .. } => "pause_token",
            Self::SetMinBridgeAmount { .. } => "set_min_bridge_amount",
            Self::Retry { .. } => "retry",
            Self::Skip { .. } => "skip",
            Self::Clear { .. } => "clear",
            Self::ExpectBalance { .. } => "expect_balance",
            Self::ExpectLocked { .. } => "expect_locked",
            Self::ExpectCumulativeLocked { .. } => "expect_cumulative_locked",
            Self::ExpectSupply { .. } => "expect_supply",
            Self::ExpectNonce { .. } => "expect_nonce",
            Self::ExpectPeerRejections { .. } => "expect_peer_rejections",
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Index of the step.
    pub index: usize,
    /// Name of the action.
    pub action: &'static str,
    /// What the action returned, if anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    /// The expected error the step failed with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Name of the scenario.
    pub name: String,
    /// One entry per step.
    pub steps: Vec<StepReport>,
}

impl Scenario {
    /// Parses a scenario from TOML.
    pub fn from_toml(s: &str) -> OrchestratorResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Runs every step against `network`, stopping at the first unexpected outcome.
    pub fn run<B: MessageBus>(&self, network: &mut Network<B>) -> OrchestratorResult<ScenarioReport> {
        info!(name = %self.name, steps = self.steps.len(), "running scenario");

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let action = step.action.name();
            let result = self.apply(network, index, &step.action);

            let report = match (result, &step.expect_error) {
                (Ok(detail), None) => StepReport {
                    index,
                    action,
                    detail,
                    error: None,
                },
                (Ok(_), Some(expected)) => {
                    return Err(OrchestratorError::Expectation {
                        step: index,
                        reason: format!("{action} succeeded, expected an error matching {expected:?}"),
                    });
                }
                (Err(err), Some(expected)) if error_matches(&err, expected) => StepReport {
                    index,
                    action,
                    detail: None,
                    error: Some(err.to_string()),
                },
                (Err(err), Some(expected)) => {
                    return Err(OrchestratorError::Expectation {
                        step: index,
                        reason: format!("{action} failed with {err}, expected {expected:?}"),
                    });
                }
                (Err(err), None) => {
                    error!(step = index, %action, %err, "scenario step failed");
                    return Err(OrchestratorError::StepFailed {
                        step: index,
                        err: Box::new(err),
                    });
                }
            };

            steps.push(report);
        }

        info!(name = %self.name, "scenario completed");
        Ok(ScenarioReport {
            name: self.name.clone(),
            steps,
        })
    }

    fn apply<B: MessageBus>(
        &self,
        network: &mut Network<B>,
        index: usize,
        action: &Action,
    ) -> OrchestratorResult<Option<Value>> {
        let hub_chain = network.hub_chain();

        match action {
            Action::CreateSynthetic { symbol, decimals } => {
                let owner = network.hub().sm.state().owner;
                let address = network
                    .hub_mut()
                    .sm
                    .create_synthetic_token(&owner, symbol, *decimals)?;

                Ok(Some(json!({ "address": address })))
            }

            Action::Connect { chain } => {
                network.connect(*chain)?;
                Ok(None)
            }

            Action::LinkTokens {
                chain,
                tokens,
                gas_limit,
            } => {
                let configs = tokens
                    .iter()
                    .map(|link| -> OrchestratorResult<TokenConfig> {
                        let synthetic_token = self.resolve(network, hub_chain, &link.synthetic)?;
                        let synthetic_decimals =
                            network.hub().sm.synthetic_ledger(&synthetic_token)?.decimals();

                        Ok(TokenConfig {
                            token: self.resolve(network, *chain, &link.token)?,
                            synthetic_token,
                            synthetic_decimals,
                            min_bridge_amount: link.min_bridge_amount,
                            paused: link.paused,
                        })
                    })
                    .collect::<OrchestratorResult<Vec<_>>>()?;

                let options = send_options(*gas_limit);
                let cfg = network.cfg().gateway.clone();
                let node = network.gateway_node_mut(*chain)?;
                let owner = node.sm.state().owner;
                let receipt = node
                    .sm
                    .quote_link_token_to_hub(&cfg, &owner, &configs, &options, &node.endpoint)
                    .and_then(|fee| {
                        node.sm.link_token_to_hub(
                            &cfg,
                            &owner,
                            &configs,
                            &options,
                            fee.native_fee,
                            &mut node.endpoint,
                        )
                    })
                    .map_err(|err| OrchestratorError::gateway(*chain, err))?;

                Ok(Some(serde_json::to_value(receipt)?))
            }

            Action::Mint {
                chain,
                token,
                to,
                amount,
            } => {
                let token = self.resolve(network, *chain, token)?;
                let to = self.resolve(network, *chain, to)?;
                network
                    .gateway_node_mut(*chain)?
                    .sm
                    .ledgers_mut()
                    .get_mut(&token)
                    .and_then(|ledger| ledger.mint(&to, *amount))
                    .map_err(|err| OrchestratorError::gateway(*chain, err.into()))?;

                Ok(None)
            }

            Action::Approve {
                chain,
                token,
                holder,
                amount,
            } => {
                let token = self.resolve(network, *chain, token)?;
                let holder = self.resolve(network, *chain, holder)?;
                let node = network.gateway_node_mut(*chain)?;
                let spender = node.sm.context().address;
                node.sm
                    .ledgers_mut()
                    .get_mut(&token)
                    .map(|ledger| ledger.approve(&holder, &spender, *amount))
                    .map_err(|err| OrchestratorError::gateway(*chain, err.into()))?;

                Ok(None)
            }

            Action::Deposit {
                chain,
                from,
                recipient,
                assets,
                gas_limit,
            } => {
                let caller = self.resolve(network, *chain, from)?;
                let recipient = self.resolve(network, hub_chain, recipient)?;
                let assets = self.resolve_assets(network, *chain, assets)?;

                let options = send_options(*gas_limit);
                let cfg = network.cfg().gateway.clone();
                let node = network.gateway_node_mut(*chain)?;
                let receipt = node
                    .sm
                    .quote_deposit(&cfg, &caller, recipient, &assets, &options, &node.endpoint)
                    .and_then(|quote| {
                        node.sm.deposit(
                            &cfg,
                            &caller,
                            recipient,
                            &assets,
                            &options,
                            quote.fee.native_fee,
                            &mut node.endpoint,
                        )
                    })
                    .map_err(|err| OrchestratorError::gateway(*chain, err))?;

                Ok(Some(serde_json::to_value(receipt)?))
            }

            Action::Bridge {
                from,
                recipient,
                dst_chain,
                assets,
                gas_limit,
            } => {
                let caller = self.resolve(network, hub_chain, from)?;
                let recipient = self.resolve(network, *dst_chain, recipient)?;
                let assets = self.resolve_assets(network, hub_chain, assets)?;

                let options = send_options(*gas_limit);
                let cfg = network.cfg().hub.clone();
                let hub = network.hub_mut();
                let quote = hub.sm.quote_bridge_tokens(
                    &cfg,
                    recipient,
                    &assets,
                    *dst_chain,
                    &options,
                    &hub.endpoint,
                )?;
                let receipt = hub.sm.bridge_tokens(
                    &cfg,
                    &caller,
                    recipient,
                    &assets,
                    *dst_chain,
                    &options,
                    quote.fee.native_fee,
                    &mut hub.endpoint,
                )?;

                Ok(Some(serde_json::to_value(receipt)?))
            }

            Action::RelayNext => {
                let outcome = network.relay_next()?;
                Ok(Some(serde_json::to_value(outcome)?))
            }

            Action::RelayAll => {
                let outcomes = network.relay_all()?;
                Ok(Some(serde_json::to_value(outcomes)?))
            }

            Action::HoldNext => Ok(Some(json!({ "held": network.hold_next() }))),

            Action::ReleaseAll => Ok(Some(json!({ "released": network.release_all() }))),

            Action::PauseHub { paused } => {
                let hub = network.hub_mut();
                let owner = hub.sm.state().owner;
                hub.sm.set_paused(&owner, *paused)?;

                Ok(None)
            }

            Action::PauseGateway { chain, paused } => {
                let node = network.gateway_node_mut(*chain)?;
                let owner = node.sm.state().owner;
                node.sm
                    .set_paused(&owner, *paused)
                    .map_err(|err| OrchestratorError::gateway(*chain, err))?;

                Ok(None)
            }

            Action::PauseLink {
                synthetic,
                chain,
                paused,
            } => {
                let synthetic = self.resolve(network, hub_chain, synthetic)?;
                let hub = network.hub_mut();
                let owner = hub.sm.state().owner;
                hub.sm
                    .set_link_paused(&owner, &synthetic, *chain, *paused)?;

                Ok(None)
            }

            Action::SetMinBridgeAmount {
                synthetic,
                chain,
                amount,
            } => {
                let synthetic = self.resolve(network, hub_chain, synthetic)?;
                let owner = network.hub().sm.state().owner;
                let receipt = network.set_min_bridge_amount(&owner, &synthetic, *chain, *amount)?;

                Ok(Some(serde_json::to_value(receipt)?))
            }

            Action::PauseToken {
                chain,
                token,
                paused,
            } => {
                let token = self.resolve(network, *chain, token)?;
                let node = network.gateway_node_mut(*chain)?;
                let owner = node.sm.state().owner;
                node.sm
                    .set_token_paused(&owner, &token, *paused)
                    .map_err(|err| OrchestratorError::gateway(*chain, err))?;

                Ok(None)
            }

            Action::Retry {
                chain,
                src_chain,
                nonce,
                gas_limit,
            } => {
                let channel = channel_between(network, *src_chain, *chain)?;
                let detail = match network.retry(*chain, channel, *nonce, *gas_limit)? {
                    Delivery::Executed(report) => json!({ "executed": report }),
                    Delivery::AlreadyExecuted => json!("already_executed"),
                };

                Ok(Some(detail))
            }

            Action::Skip {
                chain,
                src_chain,
                nonce,
            } => {
                let channel = channel_between(network, *src_chain, *chain)?;
                let owner = receiver_owner(network, *chain)?;
                let report = network.skip(&owner, *chain, channel, *nonce)?;

                Ok(Some(serde_json::to_value(report)?))
            }

            Action::Clear {
                chain,
                src_chain,
                nonce,
            } => {
                let channel = channel_between(network, *src_chain, *chain)?;
                let owner = receiver_owner(network, *chain)?;
                let report = network.clear(&owner, *chain, channel, *nonce)?;

                Ok(Some(serde_json::to_value(report)?))
            }

            Action::ExpectBalance {
                chain,
                token,
                holder,
                amount,
            } => {
                let token = self.resolve(network, *chain, token)?;
                let holder = self.resolve(network, *chain, holder)?;
                let actual = if *chain == hub_chain {
                    network.hub().sm.balance_of(&token, &holder)
                } else {
                    network.gateway(*chain)?.sm.balance_of(&token, &holder)
                };

                expect_eq(index, "balance", *amount, actual)
            }

            Action::ExpectLocked {
                chain,
                token,
                amount,
            } => {
                let token = self.resolve(network, *chain, token)?;
                let actual = network.gateway(*chain)?.sm.locked_balance(&token);

                expect_eq(index, "locked balance", *amount, actual)
            }

            Action::ExpectCumulativeLocked {
                synthetic,
                chain,
                amount,
            } => {
                let synthetic = self.resolve(network, hub_chain, synthetic)?;
                let actual = network
                    .hub()
                    .sm
                    .remote_token_info(&synthetic, *chain)
                    .map(|link| link.cumulative_locked)
                    .unwrap_or_default();

                expect_eq(index, "cumulative locked", *amount, actual)
            }

            Action::ExpectSupply { synthetic, amount } => {
                let synthetic = self.resolve(network, hub_chain, synthetic)?;
                let actual = network.hub().sm.synthetic_ledger(&synthetic)?.total_supply();

                expect_eq(index, "total supply", *amount, actual)
            }

            Action::ExpectNonce {
                chain,
                src_chain,
                inbound_nonce,
                verified_nonce,
            } => {
                let channel = channel_between(network, *src_chain, *chain)?;
                let endpoint = network.endpoint(*chain)?;
                if let Some(expected) = inbound_nonce {
                    expect_eq(index, "inbound nonce", *expected, endpoint.inbound_nonce(&channel))?;
                }
                if let Some(expected) = verified_nonce {
                    expect_eq(index, "verified nonce", *expected, endpoint.verified_nonce(&channel))?;
                }

                Ok(None)
            }

            Action::ExpectPeerRejections { count } => {
                let actual = network.report().peer_rejections.len();
                expect_eq(index, "peer rejections", *count, actual)
            }
        }
    }

    /// Resolves a name used on `chain` to an address.
    fn resolve<B: MessageBus>(
        &self,
        network: &Network<B>,
        chain: ChainId,
        name: &str,
    ) -> OrchestratorResult<Address> {
        if let Some(address) = self.accounts.get(name) {
            return Ok(*address);
        }
        if let Ok(address) = name.parse::<Address>() {
            return Ok(address);
        }

        match name {
            "hub" => return network.controller_address(network.hub_chain()),
            "gateway" => return network.controller_address(chain),
            _ => {}
        }

        if chain != network.hub_chain() {
            let local = network
                .gateway(chain)?
                .sm
                .ledgers()
                .iter()
                .find(|ledger| ledger.symbol() == name)
                .map(|ledger| ledger.address());
            if let Some(address) = local {
                return Ok(address);
            }
        }

        network
            .hub()
            .sm
            .registry()
            .tokens()
            .iter()
            .find(|token| token.symbol == name)
            .map(|token| token.address)
            .ok_or_else(|| OrchestratorError::UnknownName(name.to_string()))
    }

    fn resolve_assets<B: MessageBus>(
        &self,
        network: &Network<B>,
        chain: ChainId,
        assets: &[AssetEntry],
    ) -> OrchestratorResult<Vec<Asset>> {
        assets
            .iter()
            .map(|asset| -> OrchestratorResult<Asset> {
                Ok(Asset::new(self.resolve(network, chain, &asset.token)?, asset.amount))
            })
            .collect()
    }
}

fn send_options(gas_limit: Option<u64>) -> SendOptions {
    SendOptions { gas_limit }
}

/// The inbound channel on `dst_chain` carrying messages from the controller on `src_chain`.
fn channel_between<B: MessageBus>(
    network: &Network<B>,
    src_chain: ChainId,
    dst_chain: ChainId,
) -> OrchestratorResult<ChannelKey> {
    Ok(ChannelKey {
        receiver: network.controller_address(dst_chain)?,
        src_chain,
        sender: network.controller_address(src_chain)?,
    })
}

fn receiver_owner<B: MessageBus>(network: &Network<B>, chain: ChainId) -> OrchestratorResult<Address> {
    if chain == network.hub_chain() {
        return Ok(network.hub().sm.state().owner);
    }

    Ok(network.gateway(chain)?.sm.state().owner)
}

fn expect_eq<T>(step: usize, what: &str, expected: T, actual: T) -> OrchestratorResult<Option<Value>>
where
    T: PartialEq + std::fmt::Display,
{
    if expected != actual {
        return Err(OrchestratorError::Expectation {
            step,
            reason: format!("{what} is {actual}, expected {expected}"),
        });
    }

    Ok(None)
}

fn error_matches(err: &OrchestratorError, expected: &str) -> bool {
    err.to_string().contains(expected) || format!("{err:?}").contains(expected)
}
