//! Unit Tests for bridge_tokens and quote_bridge_tokens
#[cfg(test)]
mod tests {
    use omnibridge_params::transport::TransportParams;
    use omnibridge_primitives::{
        types::{Address, Asset},
        U256,
    };
    use omnibridge_transport::{
        Endpoint, MessageSender, SendOptions, TransportError,
    };
    use omnibridge_wire::BridgeMessage;

    use crate::{
        hub::{errors::HubError, machine::HubSM, tests::*},
        ledger::LedgerError,
    };

    fn endpoint() -> Endpoint {
        Endpoint::new(HUB_CHAIN, TransportParams::default())
    }

    fn synthetic(amount: u128) -> Asset {
        Asset::new(susdc(), U256::new(amount))
    }

    /// Bridges `assets` to `dst_chain` paying the quoted fee.
    fn bridge(
        hub: &mut HubSM,
        endpoint: &mut Endpoint,
        caller: Address,
        assets: &[Asset],
        dst_chain: u32,
    ) -> Result<crate::hub::transitions::bridge::BridgeReceipt, HubError> {
        let cfg = test_cfg();
        let options = SendOptions::default();
        let fee = endpoint
            .quote(dst_chain, 96 + 64 * assets.len(), &options)
            .unwrap()
            .native_fee;

        hub.bridge_tokens(&cfg, &caller, BOB, assets, dst_chain, &options, fee, endpoint)
    }

    #[test]
    fn test_withdrawal_burns_and_sends_unlock() {
        let mut hub = funded_hub(ALICE, 2 * USDC_MIN);
        let mut endpoint = endpoint();

        // 1.123456789 tokens only bridge 1.123456
        let receipt = bridge(
            &mut hub,
            &mut endpoint,
            ALICE,
            &[synthetic(1_123_456_789_000_000_000)],
            GATEWAY_CHAIN,
        )
        .unwrap();

        assert_eq!(receipt.receipt.nonce, 1);
        assert_eq!(receipt.burned, vec![synthetic(1_123_456_000_000_000_000)]);
        assert_eq!(receipt.sent, vec![usdc(1_123_456)]);

        assert_eq!(
            hub.balance_of(&susdc(), &ALICE),
            U256::new(2 * ONE_TOKEN - 1_123_456_000_000_000_000)
        );
        assert_eq!(
            hub.remote_token_info(&susdc(), GATEWAY_CHAIN)
                .unwrap()
                .cumulative_locked,
            U256::new(2 * USDC_MIN - 1_123_456)
        );

        let packets = endpoint.drain_outbox();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].receiver, GATEWAY);
        assert_eq!(packets[0].guid, receipt.receipt.guid);
        assert_eq!(
            BridgeMessage::decode(&packets[0].message).unwrap(),
            BridgeMessage::Unlock {
                recipient: BOB,
                assets: vec![usdc(1_123_456)],
            }
        );
    }

    #[test]
    fn test_quote_reports_fee_and_remote_amounts() {
        let hub = funded_hub(ALICE, USDC_MIN);
        let endpoint = endpoint();
        let options = SendOptions::default();

        let quote = hub
            .quote_bridge_tokens(
                &test_cfg(),
                BOB,
                &[synthetic(ONE_TOKEN + 5)],
                GATEWAY_CHAIN,
                &options,
                &endpoint,
            )
            .unwrap();

        assert_eq!(quote.assets, vec![usdc(USDC_MIN)]);
        assert_eq!(quote.fee, endpoint.quote(GATEWAY_CHAIN, 160, &options).unwrap());
    }

    #[test]
    fn test_withdrawal_with_too_low_fee_changes_nothing() {
        let mut hub = funded_hub(ALICE, USDC_MIN);
        let before = hub.state.clone();
        let mut endpoint = endpoint();

        let err = hub
            .bridge_tokens(
                &test_cfg(),
                &ALICE,
                BOB,
                &[synthetic(ONE_TOKEN)],
                GATEWAY_CHAIN,
                &SendOptions::default(),
                U256::ONE,
                &mut endpoint,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            HubError::Transport(TransportError::InsufficientFee { .. })
        ));
        assert_eq!(hub.state, before);
        assert_eq!(endpoint.outbox_len(), 0);
    }

    #[test]
    fn test_withdrawal_gates() {
        let mut endpoint = endpoint();

        let mut hub = funded_hub(ALICE, USDC_MIN);
        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(999_999_999_999)], GATEWAY_CHAIN),
            Err(HubError::AmountIsTooSmall(susdc()))
        );
        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(ONE_TOKEN)], 99),
            Err(HubError::NoGatewayForChain(99))
        );
        assert_eq!(
            bridge(&mut hub, &mut endpoint, BOB, &[synthetic(ONE_TOKEN)], GATEWAY_CHAIN),
            Err(HubError::Ledger(LedgerError::InsufficientBalance {
                token: susdc(),
                holder: BOB,
                needed: U256::new(ONE_TOKEN),
                available: U256::ZERO,
            }))
        );
        assert!(matches!(
            bridge(&mut hub, &mut endpoint, ALICE, &[Asset::new(UNKNOWN_TOKEN, U256::ONE)], GATEWAY_CHAIN),
            Err(HubError::UnknownSyntheticToken(token)) if token == UNKNOWN_TOKEN
        ));

        hub.set_link_paused(&OWNER, &susdc(), GATEWAY_CHAIN, true)
            .unwrap();
        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(ONE_TOKEN)], GATEWAY_CHAIN),
            Err(HubError::TokenPaused {
                chain: GATEWAY_CHAIN,
                token: USDC
            })
        );

        hub.set_paused(&OWNER, true).unwrap();
        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(ONE_TOKEN)], GATEWAY_CHAIN),
            Err(HubError::HubPaused)
        );

        assert_eq!(endpoint.outbox_len(), 0);
    }

    #[test]
    fn test_withdrawal_is_bounded_by_locked_balance_of_destination() {
        // synthetic USDC is backed on GATEWAY_CHAIN only
        let mut hub = funded_hub(ALICE, USDC_MIN);
        hub.set_peer(&OWNER, OTHER_CHAIN, OTHER_GATEWAY).unwrap();
        let other_usdc = Address::from_low_u64_be(0x15dc);
        hub.link_remote_token(
            &OWNER,
            &susdc(),
            OTHER_CHAIN,
            other_usdc,
            OTHER_GATEWAY,
            USDC_DELTA,
            U256::ONE,
        )
        .unwrap();
        let mut endpoint = endpoint();

        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(ONE_TOKEN)], OTHER_CHAIN),
            Err(HubError::InsufficientBalanceOnDestChain {
                token: other_usdc,
                chain: OTHER_CHAIN,
                requested: U256::new(USDC_MIN),
                available: U256::ZERO,
            })
        );

        // DAI was never linked to the other chain
        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[Asset::new(sdai(), U256::ONE)], OTHER_CHAIN),
            Err(HubError::TokenNotLinkedToDestChain {
                token: sdai(),
                chain: OTHER_CHAIN
            })
        );
    }

    #[test]
    fn test_repeated_assets_are_checked_together() {
        let mut hub = funded_hub(ALICE, USDC_MIN);
        let mut endpoint = endpoint();

        let half = ONE_TOKEN / 2;
        assert!(matches!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(half), synthetic(half + 1_000_000_000_000)], GATEWAY_CHAIN),
            Err(HubError::InsufficientBalanceOnDestChain { requested, .. }) if requested == U256::new(USDC_MIN + 1)
        ));

        let receipt = bridge(
            &mut hub,
            &mut endpoint,
            ALICE,
            &[synthetic(half), synthetic(half)],
            GATEWAY_CHAIN,
        )
        .unwrap();
        assert_eq!(receipt.sent, vec![usdc(USDC_MIN / 2), usdc(USDC_MIN / 2)]);
        assert_eq!(hub.synthetic_ledger(&susdc()).unwrap().total_supply(), U256::ZERO);
    }

    #[test]
    fn test_withdrawal_requires_peer_to_be_the_gateway() {
        let mut hub = funded_hub(ALICE, USDC_MIN);
        hub.set_peer(&OWNER, GATEWAY_CHAIN, OTHER_GATEWAY).unwrap();
        let mut endpoint = endpoint();

        assert_eq!(
            bridge(&mut hub, &mut endpoint, ALICE, &[synthetic(ONE_TOKEN)], GATEWAY_CHAIN),
            Err(HubError::GatewayMismatch {
                chain: GATEWAY_CHAIN,
                expected: GATEWAY,
                got: OTHER_GATEWAY
            })
        );
    }
}
