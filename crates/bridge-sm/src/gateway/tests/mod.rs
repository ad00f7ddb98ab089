//! Testing utilities specific to the Gateway State Machine.
//!
//! Fixtures build Gateways on [`GATEWAY_CHAIN`] holding real USDC and DAI, and strategies generate
//! the messages a Hub (or an impostor) could deliver.

mod process_link_ack;

use std::sync::Arc;

use omnibridge_params::{controller::GatewayParams, transport::TransportParams};
use omnibridge_primitives::{
    decimals::DecimalsDelta,
    types::{Address, Asset, ChainId, Nonce},
    U256,
};
use omnibridge_transport::{Endpoint, Guid, Origin, SendOptions};
use omnibridge_wire::{BridgeMessage, LinkAckItem, LinkAckStatus, LinkRejection};
use proptest::prelude::*;

use crate::{
    gateway::{
        config::GatewayCfg,
        events::GatewayEvent,
        machine::{GatewayCtx, GatewaySM},
        state::GatewayState,
        transitions::link::TokenConfig,
    },
    inbound::InboundMessage,
    ledger::TokenLedger,
    state_machine::StateMachine,
};

// ===== Test Constants =====

/// Chain the Hub lives on.
pub(super) const HUB_CHAIN: ChainId = 1;
/// Chain of the Gateway under test.
pub(super) const GATEWAY_CHAIN: ChainId = 10;

/// The Hub controller, peer of the Gateway.
pub(super) const HUB: Address = Address::from_low_u64_be(0x4b0b);
/// Someone pretending to be the Hub.
pub(super) const IMPOSTOR: Address = Address::from_low_u64_be(0x4b0c);
/// Address of the Gateway controller.
pub(super) const GATEWAY: Address = Address::from_low_u64_be(0x6a7e);
/// Owner of the Gateway.
pub(super) const OWNER: Address = Address::from_low_u64_be(0x0e0e);

/// Real USDC with 6 decimals, backing an 18-decimal synthetic.
pub(super) const USDC: Address = Address::from_low_u64_be(0x05dc);
/// Real DAI with 18 decimals, backing a 6-decimal synthetic.
pub(super) const DAI: Address = Address::from_low_u64_be(0x0da1);
/// A token without a ledger on the chain.
pub(super) const UNKNOWN_TOKEN: Address = Address::from_low_u64_be(0x0bad);

pub(super) const SUSDC: Address = Address::from_low_u64_be(0x5dc);
pub(super) const SDAI: Address = Address::from_low_u64_be(0x5da1);

pub(super) const ALICE: Address = Address::from_low_u64_be(0xa11ce);
pub(super) const BOB: Address = Address::from_low_u64_be(0xb0b);

/// Minimum deposit of USDC.
pub(super) const USDC_MIN: u128 = 1_000_000;
/// Minimum deposit of DAI.
pub(super) const DAI_MIN: u128 = 1_000_000_000_000;
/// What [`gateway`] mints to [`ALICE`] of each token, in base units.
pub(super) const ALICE_USDC: u128 = 1_000 * USDC_MIN;
pub(super) const ALICE_DAI: u128 = 1_000_000_000_000_000_000_000;

/// Pays any quote.
pub(super) const FEE: U256 = U256::MAX;

// ===== Fixtures =====

pub(super) fn test_cfg() -> Arc<GatewayCfg> {
    Arc::new(GatewayCfg::new(GatewayParams::default()))
}

pub(super) const fn test_ctx() -> GatewayCtx {
    GatewayCtx {
        chain_id: GATEWAY_CHAIN,
        address: GATEWAY,
        hub_chain: HUB_CHAIN,
    }
}

pub(super) const fn create_sm(state: GatewayState) -> GatewaySM {
    GatewaySM {
        context: test_ctx(),
        state,
    }
}

pub(super) const fn get_state(sm: &GatewaySM) -> &GatewayState {
    sm.state()
}

pub(super) fn endpoint() -> Endpoint {
    Endpoint::new(GATEWAY_CHAIN, TransportParams::default())
}

pub(super) fn usdc(amount: u128) -> Asset {
    Asset::new(USDC, U256::new(amount))
}

pub(super) fn dai(amount: u128) -> Asset {
    Asset::new(DAI, U256::new(amount))
}

pub(super) const fn usdc_config() -> TokenConfig {
    TokenConfig {
        token: USDC,
        synthetic_token: SUSDC,
        synthetic_decimals: 18,
        min_bridge_amount: U256::new(USDC_MIN),
        paused: false,
    }
}

pub(super) const fn dai_config() -> TokenConfig {
    TokenConfig {
        token: DAI,
        synthetic_token: SDAI,
        synthetic_decimals: 6,
        min_bridge_amount: U256::new(DAI_MIN),
        paused: false,
    }
}

/// A Gateway trusting [`HUB`], with USDC and DAI ledgers where [`ALICE`] holds and has approved
/// [`ALICE_USDC`] and [`ALICE_DAI`]. No token is linked yet.
pub(super) fn gateway() -> GatewaySM {
    let mut gateway = GatewaySM::new(GATEWAY_CHAIN, GATEWAY, HUB_CHAIN, OWNER);
    gateway.set_peer(&OWNER, HUB_CHAIN, HUB).unwrap();

    for (token, symbol, decimals, amount) in [
        (USDC, "USDC", 6, ALICE_USDC),
        (DAI, "DAI", 18, ALICE_DAI),
    ] {
        let mut ledger = TokenLedger::new(token, symbol, symbol, decimals);
        ledger.mint(&ALICE, U256::new(amount)).unwrap();
        ledger.approve(&ALICE, &GATEWAY, U256::MAX);
        gateway.ledgers_mut().insert(ledger).unwrap();
    }

    gateway
}

/// [`gateway`] after the Hub confirmed both links.
pub(super) fn linked_gateway() -> GatewaySM {
    let mut gateway = gateway();
    gateway
        .link_token_to_hub(
            &test_cfg(),
            &OWNER,
            &[usdc_config(), dai_config()],
            &SendOptions::default(),
            FEE,
            &mut endpoint(),
        )
        .unwrap();
    gateway
        .process_event(
            test_cfg(),
            ack_event(1, vec![linked_ack(USDC), linked_ack(DAI)]),
        )
        .unwrap();

    gateway
}

/// [`linked_gateway`] after [`ALICE`] deposited `amount` USDC.
pub(super) fn funded_gateway(amount: u128) -> GatewaySM {
    let mut gateway = linked_gateway();
    gateway
        .deposit(
            &test_cfg(),
            &ALICE,
            ALICE,
            &[usdc(amount)],
            &SendOptions::default(),
            FEE,
            &mut endpoint(),
        )
        .unwrap();

    gateway
}

pub(super) const fn origin(nonce: Nonce) -> Origin {
    Origin {
        src_chain: HUB_CHAIN,
        sender: HUB,
        nonce,
    }
}

pub(super) fn inbound(origin: Origin, message: BridgeMessage) -> GatewayEvent {
    let guid = Guid::derive(
        origin.nonce,
        origin.src_chain,
        &origin.sender,
        GATEWAY_CHAIN,
        &GATEWAY,
    );

    GatewayEvent::MessageReceived(InboundMessage {
        origin,
        guid,
        message,
    })
}

pub(super) fn unlock_event(nonce: Nonce, recipient: Address, assets: Vec<Asset>) -> GatewayEvent {
    inbound(origin(nonce), BridgeMessage::Unlock { recipient, assets })
}

pub(super) fn ack_event(nonce: Nonce, items: Vec<LinkAckItem>) -> GatewayEvent {
    inbound(origin(nonce), BridgeMessage::LinkAck { items })
}

/// The Hub's acknowledgement of `token` with the values of [`usdc_config`] or [`dai_config`].
pub(super) fn linked_ack(token: Address) -> LinkAckItem {
    let (synthetic_token, delta, min) = if token == DAI {
        (SDAI, -12, DAI_MIN)
    } else {
        (SUSDC, 12, USDC_MIN)
    };

    LinkAckItem {
        token,
        status: LinkAckStatus::Linked,
        synthetic_token,
        decimals_delta: DecimalsDelta::new(delta).unwrap(),
        min_bridge_amount: U256::new(min),
        paused: false,
    }
}

pub(super) fn rejected_ack(token: Address, reason: LinkRejection) -> LinkAckItem {
    LinkAckItem {
        status: LinkAckStatus::Rejected(reason),
        ..linked_ack(token)
    }
}

// ===== Strategies =====

fn arb_asset() -> impl Strategy<Value = Asset> {
    (
        prop_oneof![Just(USDC), Just(DAI), Just(UNKNOWN_TOKEN)],
        0u128..10_000_000_000,
    )
        .prop_map(|(token, amount)| Asset::new(token, U256::new(amount)))
}

fn arb_ack_item() -> impl Strategy<Value = LinkAckItem> {
    let status = prop_oneof![
        Just(LinkAckStatus::Linked),
        Just(LinkAckStatus::Existing),
        Just(LinkAckStatus::Rejected(LinkRejection::AlreadyLinked)),
        Just(LinkAckStatus::Rejected(LinkRejection::DecimalsMismatch)),
    ];

    (
        prop_oneof![Just(USDC), Just(DAI), Just(UNKNOWN_TOKEN)],
        status,
        any::<bool>(),
    )
        .prop_map(|(token, status, paused)| LinkAckItem {
            status,
            paused,
            ..linked_ack(token)
        })
}

/// Gateways with pending or confirmed links, with and without locked USDC, possibly paused.
pub(super) fn arb_gateway_state() -> impl Strategy<Value = GatewayState> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0u128..10_000_000_000).prop_map(
        |(confirmed, gateway_paused, usdc_paused, deposited)| {
            let mut gateway = if confirmed && deposited >= USDC_MIN {
                funded_gateway(deposited)
            } else if confirmed {
                linked_gateway()
            } else {
                let mut gateway = gateway();
                gateway
                    .link_token_to_hub(
                        &test_cfg(),
                        &OWNER,
                        &[usdc_config()],
                        &SendOptions::default(),
                        FEE,
                        &mut endpoint(),
                    )
                    .unwrap();
                gateway
            };
            gateway
                .set_token_paused(&OWNER, &USDC, usdc_paused)
                .unwrap();
            gateway.set_paused(&OWNER, gateway_paused).unwrap();

            gateway.state
        },
    )
}

/// Messages from the Hub and from an impostor, of every kind.
pub(super) fn arb_gateway_event() -> impl Strategy<Value = GatewayEvent> {
    let message = prop_oneof![
        (
            prop::bool::weighted(0.1),
            prop::collection::vec(arb_asset(), 0..4)
        )
            .prop_map(|(zero_recipient, assets)| BridgeMessage::Unlock {
                recipient: if zero_recipient { Address::ZERO } else { BOB },
                assets,
            }),
        prop::collection::vec(arb_ack_item(), 0..3)
            .prop_map(|items| BridgeMessage::LinkAck { items }),
        prop::collection::vec(arb_asset(), 1..3).prop_map(|assets| BridgeMessage::Deposit {
            recipient: BOB,
            assets
        }),
    ];

    (
        prop_oneof![4 => Just(HUB), 1 => Just(IMPOSTOR)],
        1u64..10,
        message,
    )
        .prop_map(|(sender, nonce, message)| {
            inbound(
                Origin {
                    src_chain: HUB_CHAIN,
                    sender,
                    nonce,
                },
                message,
            )
        })
}
