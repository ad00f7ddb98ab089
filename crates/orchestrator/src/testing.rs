//! Shared test helpers for the orchestrator crate.
//!
//! Every fixture builds the same topology: a Hub on [`HUB_CHAIN`] and a Gateway on
//! [`GATEWAY_CHAIN`] holding USDC (6 decimals) and DAI (18 decimals), with Alice funded and the
//! Gateway approved to pull her tokens.

use omnibridge_params::BridgeParams;
use omnibridge_primitives::{
    types::{Address, Asset, ChainId},
    U256,
};
use omnibridge_sm::{
    gateway::{
        errors::GatewayResult,
        state::LinkStatus,
        transitions::{deposit::DepositReceipt, link::TokenConfig},
    },
    hub::{errors::HubResult, transitions::bridge::BridgeReceipt},
};
use omnibridge_transport::{ChannelKey, SendOptions};

use crate::network::Network;

// ===== Test Constants =====

pub(crate) const HUB_CHAIN: ChainId = 1;
pub(crate) const GATEWAY_CHAIN: ChainId = 10;
/// A chain with a Gateway that is not a peer of the Hub.
pub(crate) const ROGUE_CHAIN: ChainId = 30;

pub(crate) const HUB: Address = Address::from_low_u64_be(0x4b0b);
pub(crate) const GATEWAY: Address = Address::from_low_u64_be(0x6a7e);
pub(crate) const ROGUE_GATEWAY: Address = Address::from_low_u64_be(0x0bad_6a7e);
pub(crate) const OWNER: Address = Address::from_low_u64_be(0x0e0e);

pub(crate) const USDC: Address = Address::from_low_u64_be(0x05dc);
pub(crate) const DAI: Address = Address::from_low_u64_be(0x0da1);

pub(crate) const ALICE: Address = Address::from_low_u64_be(0xa11ce);
pub(crate) const BOB: Address = Address::from_low_u64_be(0xb0b);

/// Minimum deposit of USDC, one token.
pub(crate) const USDC_MIN: u128 = 1_000_000;
/// Minimum deposit of DAI, one millionth of a token.
pub(crate) const DAI_MIN: u128 = 1_000_000_000_000;
/// USDC minted to Alice.
pub(crate) const ALICE_USDC: u128 = 1_000 * USDC_MIN;
/// DAI minted to Alice.
pub(crate) const ALICE_DAI: u128 = 1_000_000_000_000_000_000_000;
/// `10^18`.
pub(crate) const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

// ===== Fixtures =====

/// A connected Hub and Gateway with funded local tokens and no links.
pub(crate) fn network() -> Network {
    let mut network = Network::new(BridgeParams::default(), HUB_CHAIN, HUB, OWNER);
    network
        .add_gateway(GATEWAY_CHAIN, GATEWAY, OWNER)
        .expect("must add gateway");
    network
        .create_local_token(GATEWAY_CHAIN, USDC, "USDC", 6)
        .expect("must create USDC");
    network
        .create_local_token(GATEWAY_CHAIN, DAI, "DAI", 18)
        .expect("must create DAI");
    network.connect(GATEWAY_CHAIN).expect("must connect");

    let ledgers = network
        .gateway_node_mut(GATEWAY_CHAIN)
        .expect("gateway exists")
        .sm
        .ledgers_mut();
    for (token, amount) in [(USDC, ALICE_USDC), (DAI, ALICE_DAI)] {
        let ledger = ledgers.get_mut(&token).expect("token exists");
        ledger.mint(&ALICE, U256::new(amount)).expect("must mint");
        ledger.approve(&ALICE, &GATEWAY, U256::MAX);
    }

    network
}

/// [`network`] with USDC linked to sUSDC (18 decimals) and DAI linked to sDAI (6 decimals).
pub(crate) fn linked_network() -> Network {
    let mut network = network();

    let hub = network.hub_mut();
    let susdc = hub
        .sm
        .create_synthetic_token(&OWNER, "sUSDC", 18)
        .expect("must create sUSDC");
    let sdai = hub
        .sm
        .create_synthetic_token(&OWNER, "sDAI", 6)
        .expect("must create sDAI");

    let configs = [
        TokenConfig {
            token: USDC,
            synthetic_token: susdc,
            synthetic_decimals: 18,
            min_bridge_amount: U256::new(USDC_MIN),
            paused: false,
        },
        TokenConfig {
            token: DAI,
            synthetic_token: sdai,
            synthetic_decimals: 6,
            min_bridge_amount: U256::new(DAI_MIN),
            paused: false,
        },
    ];

    let cfg = network.cfg().gateway.clone();
    let node = network
        .gateway_node_mut(GATEWAY_CHAIN)
        .expect("gateway exists");
    let options = SendOptions::default();
    let fee = node
        .sm
        .quote_link_token_to_hub(&cfg, &OWNER, &configs, &options, &node.endpoint)
        .expect("must quote link request");
    node.sm
        .link_token_to_hub(
            &cfg,
            &OWNER,
            &configs,
            &options,
            fee.native_fee,
            &mut node.endpoint,
        )
        .expect("must send link request");

    network.relay_all().expect("must relay link request and ack");

    let gateway = &network.gateway(GATEWAY_CHAIN).expect("gateway exists").sm;
    for token in [USDC, DAI] {
        assert_eq!(
            gateway.token_entry(&token).map(|entry| entry.status),
            Some(LinkStatus::Confirmed),
            "link of {token} must be confirmed"
        );
    }

    network
}

/// Address of a synthetic token by symbol.
pub(crate) fn synthetic(network: &Network, symbol: &str) -> Address {
    network
        .hub()
        .sm
        .registry()
        .tokens()
        .iter()
        .find(|token| token.symbol == symbol)
        .map(|token| token.address)
        .expect("synthetic token exists")
}

/// Deposits from `from` on the Gateway on `chain`, paying the quoted fee with default options.
pub(crate) fn deposit(
    network: &mut Network,
    chain: ChainId,
    from: Address,
    recipient: Address,
    assets: &[Asset],
) -> GatewayResult<DepositReceipt> {
    deposit_with(network, chain, from, recipient, assets, SendOptions::default())
}

/// Same as [`deposit`] with explicit send options.
pub(crate) fn deposit_with(
    network: &mut Network,
    chain: ChainId,
    from: Address,
    recipient: Address,
    assets: &[Asset],
    options: SendOptions,
) -> GatewayResult<DepositReceipt> {
    let cfg = network.cfg().gateway.clone();
    let node = network.gateway_node_mut(chain).expect("gateway exists");
    let quote = node
        .sm
        .quote_deposit(&cfg, &from, recipient, assets, &options, &node.endpoint)?;

    node.sm.deposit(
        &cfg,
        &from,
        recipient,
        assets,
        &options,
        quote.fee.native_fee,
        &mut node.endpoint,
    )
}

/// Withdraws `caller`'s synthetic tokens to `dst_chain`, paying the quoted fee.
pub(crate) fn withdraw(
    network: &mut Network,
    caller: Address,
    recipient: Address,
    assets: &[Asset],
    dst_chain: ChainId,
) -> HubResult<BridgeReceipt> {
    let cfg = network.cfg().hub.clone();
    let options = SendOptions::default();
    let hub = network.hub_mut();
    let quote = hub
        .sm
        .quote_bridge_tokens(&cfg, recipient, assets, dst_chain, &options, &hub.endpoint)?;

    hub.sm.bridge_tokens(
        &cfg,
        &caller,
        recipient,
        assets,
        dst_chain,
        &options,
        quote.fee.native_fee,
        &mut hub.endpoint,
    )
}

/// The Hub's inbound channel from the Gateway on [`GATEWAY_CHAIN`].
pub(crate) const fn hub_inbound() -> ChannelKey {
    ChannelKey {
        receiver: HUB,
        src_chain: GATEWAY_CHAIN,
        sender: GATEWAY,
    }
}

/// The Gateway's inbound channel from the Hub.
pub(crate) const fn gateway_inbound() -> ChannelKey {
    ChannelKey {
        receiver: GATEWAY,
        src_chain: HUB_CHAIN,
        sender: HUB,
    }
}

pub(crate) fn usdc(amount: u128) -> Asset {
    Asset::new(USDC, U256::new(amount))
}

pub(crate) fn dai(amount: u128) -> Asset {
    Asset::new(DAI, U256::new(amount))
}
