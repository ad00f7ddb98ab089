//! Testing utilities specific to the Hub State Machine.
//!
//! This module provides fixtures and proptest strategies for testing the HubSM across multiple
//! transition functions.

mod bridge_tokens;
mod prop_tests;

use std::sync::Arc;

use omnibridge_params::controller::{BatchPolicy, HubParams};
use omnibridge_primitives::{
    decimals::DecimalsDelta,
    types::{Address, Asset, ChainId, Nonce},
    U256,
};
use omnibridge_transport::{Guid, Origin};
use omnibridge_wire::{BridgeMessage, LinkRequestItem};
use proptest::prelude::*;

use crate::{
    hub::{
        config::HubCfg,
        events::HubEvent,
        machine::{HubCtx, HubSM},
        state::HubState,
        transitions::admin::synthetic_token_address,
    },
    inbound::InboundMessage,
    state_machine::StateMachine,
};

// ===== Test Constants =====

/// Chain the Hub lives on.
pub(super) const HUB_CHAIN: ChainId = 1;
/// Chain of the gateway linked in [`linked_hub`].
pub(super) const GATEWAY_CHAIN: ChainId = 10;
/// A chain without links in [`linked_hub`].
pub(super) const OTHER_CHAIN: ChainId = 20;

/// Address of the Hub controller.
pub(super) const HUB: Address = Address::from_low_u64_be(0x4b0b);
/// Owner of the Hub.
pub(super) const OWNER: Address = Address::from_low_u64_be(0x0e0e);
/// The gateway on [`GATEWAY_CHAIN`].
pub(super) const GATEWAY: Address = Address::from_low_u64_be(0x6a7e);
/// A second gateway, not a peer in [`linked_hub`].
pub(super) const OTHER_GATEWAY: Address = Address::from_low_u64_be(0x6a7f);

/// Remote USDC with 6 decimals.
pub(super) const USDC: Address = Address::from_low_u64_be(0x05dc);
/// Remote DAI with 18 decimals.
pub(super) const DAI: Address = Address::from_low_u64_be(0x0da1);
/// A remote token the Hub does not know.
pub(super) const UNKNOWN_TOKEN: Address = Address::from_low_u64_be(0x0bad);

pub(super) const ALICE: Address = Address::from_low_u64_be(0xa11ce);
pub(super) const BOB: Address = Address::from_low_u64_be(0xb0b);

/// Minimum deposit of USDC in remote units.
pub(super) const USDC_MIN: u128 = 1_000_000;
/// Synthetic USDC has 18 decimals, remote USDC 6.
pub(super) const USDC_DELTA: i8 = 12;
/// `10^18`, one synthetic token.
pub(super) const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

// ===== Fixtures =====

pub(super) fn test_cfg() -> Arc<HubCfg> {
    Arc::new(HubCfg::new(HubParams::default()))
}

pub(super) fn cfg_with_policies(deposit_policy: BatchPolicy, link_policy: BatchPolicy) -> Arc<HubCfg> {
    Arc::new(HubCfg::new(HubParams {
        deposit_policy,
        link_policy,
        ..HubParams::default()
    }))
}

pub(super) const fn test_ctx() -> HubCtx {
    HubCtx {
        chain_id: HUB_CHAIN,
        address: HUB,
    }
}

pub(super) const fn create_sm(state: HubState) -> HubSM {
    HubSM {
        context: test_ctx(),
        state,
    }
}

pub(super) const fn get_state(sm: &HubSM) -> &HubState {
    sm.state()
}

pub(super) fn susdc() -> Address {
    synthetic_token_address(&HUB, "USDC")
}

pub(super) fn sdai() -> Address {
    synthetic_token_address(&HUB, "DAI")
}

pub(super) fn usdc(amount: u128) -> Asset {
    Asset::new(USDC, U256::new(amount))
}

pub(super) fn dai(amount: u128) -> Asset {
    Asset::new(DAI, U256::new(amount))
}

/// A Hub trusting [`GATEWAY`] with synthetic USDC and DAI, both with 18 decimals, linked to the
/// real tokens on [`GATEWAY_CHAIN`].
pub(super) fn linked_hub() -> HubSM {
    let mut hub = HubSM::new(HUB_CHAIN, HUB, OWNER);
    hub.set_peer(&OWNER, GATEWAY_CHAIN, GATEWAY).unwrap();

    let susdc = hub.create_synthetic_token(&OWNER, "USDC", 18).unwrap();
    hub.link_remote_token(
        &OWNER,
        &susdc,
        GATEWAY_CHAIN,
        USDC,
        GATEWAY,
        USDC_DELTA,
        U256::new(USDC_MIN),
    )
    .unwrap();

    let sdai = hub.create_synthetic_token(&OWNER, "DAI", 18).unwrap();
    hub.link_remote_token(&OWNER, &sdai, GATEWAY_CHAIN, DAI, GATEWAY, 0, U256::ONE)
        .unwrap();

    hub
}

/// [`linked_hub`] after `recipient` received synthetic USDC for a deposit of `amount`.
pub(super) fn funded_hub(recipient: Address, amount: u128) -> HubSM {
    let mut hub = linked_hub();
    hub.process_event(test_cfg(), deposit_event(1, recipient, vec![usdc(amount)]))
        .unwrap();
    hub
}

pub(super) const fn origin(nonce: Nonce) -> Origin {
    Origin {
        src_chain: GATEWAY_CHAIN,
        sender: GATEWAY,
        nonce,
    }
}

pub(super) fn inbound(origin: Origin, message: BridgeMessage) -> HubEvent {
    let guid = Guid::derive(
        origin.nonce,
        origin.src_chain,
        &origin.sender,
        HUB_CHAIN,
        &HUB,
    );

    HubEvent::MessageReceived(InboundMessage {
        origin,
        guid,
        message,
    })
}

pub(super) fn deposit_event(nonce: Nonce, recipient: Address, assets: Vec<Asset>) -> HubEvent {
    inbound(origin(nonce), BridgeMessage::Deposit { recipient, assets })
}

pub(super) fn link_item(
    token: Address,
    synthetic_token: Address,
    synthetic_decimals: u8,
    decimals_delta: i8,
) -> LinkRequestItem {
    LinkRequestItem {
        token,
        synthetic_decimals,
        synthetic_token,
        decimals_delta: DecimalsDelta::new(decimals_delta).unwrap(),
        min_bridge_amount: U256::new(1_000),
        paused: false,
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

fn arb_link_item() -> impl Strategy<Value = LinkRequestItem> {
    (
        prop_oneof![Just(USDC), Just(DAI), Just(UNKNOWN_TOKEN), Just(Address::ZERO)],
        prop_oneof![Just(susdc()), Just(sdai()), Just(UNKNOWN_TOKEN)],
        prop_oneof![Just(6u8), Just(18u8)],
        -12i8..=12,
        any::<bool>(),
    )
        .prop_map(|(token, synthetic_token, synthetic_decimals, delta, paused)| {
            LinkRequestItem {
                paused,
                ..link_item(token, synthetic_token, synthetic_decimals, delta)
            }
        })
}

/// Hubs with and without minted supply, with the Hub or the USDC link paused.
pub(super) fn arb_hub_state() -> impl Strategy<Value = HubState> {
    (any::<bool>(), any::<bool>(), 0u128..10_000_000_000).prop_map(
        |(hub_paused, usdc_paused, deposited)| {
            let mut hub = if deposited >= USDC_MIN {
                funded_hub(ALICE, deposited)
            } else {
                linked_hub()
            };
            hub.set_link_paused(&OWNER, &susdc(), GATEWAY_CHAIN, usdc_paused)
                .unwrap();
            hub.set_paused(&OWNER, hub_paused).unwrap();

            hub.state
        },
    )
}

/// Messages from the peer and from a stranger, of every kind.
pub(super) fn arb_hub_event() -> impl Strategy<Value = HubEvent> {
    let message = prop_oneof![
        (
            prop::bool::weighted(0.1),
            prop::collection::vec(arb_asset(), 0..4)
        )
            .prop_map(|(zero_recipient, assets)| BridgeMessage::Deposit {
                recipient: if zero_recipient { Address::ZERO } else { ALICE },
                assets,
            }),
        prop::collection::vec(arb_link_item(), 0..4)
            .prop_map(|items| BridgeMessage::LinkRequest { items }),
        prop::collection::vec(arb_asset(), 1..3).prop_map(|assets| BridgeMessage::Unlock {
            recipient: ALICE,
            assets
        }),
    ];

    (
        prop_oneof![4 => Just(GATEWAY), 1 => Just(OTHER_GATEWAY)],
        1u64..10,
        message,
    )
        .prop_map(|(sender, nonce, message)| {
            inbound(
                Origin {
                    src_chain: GATEWAY_CHAIN,
                    sender,
                    nonce,
                },
                message,
            )
        })
}
