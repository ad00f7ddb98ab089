//! Unit Tests for process_link_ack
#[cfg(test)]
mod tests {
    use omnibridge_primitives::{decimals::DecimalsDelta, types::Address, U256};
    use omnibridge_transport::SendOptions;
    use omnibridge_wire::{LinkAckItem, LinkAckStatus, LinkRejection};

    use crate::{
        gateway::{errors::GatewayError, machine::GatewaySM, state::LinkStatus, tests::*},
        signals::GatewaySignal,
        state_machine::StateMachine,
        testing::transition::*,
    };

    /// [`gateway`] with pending USDC and DAI entries.
    fn pending_gateway() -> GatewaySM {
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
    }

    fn confirmed(token: Address) -> GatewaySignal {
        GatewaySignal::LinkConfirmed {
            token,
            synthetic_token: if token == DAI { SDAI } else { SUSDC },
        }
    }

    #[test]
    fn test_ack_confirms_pending_entries() {
        let initial = pending_gateway().state;

        let mut expected = initial.clone();
        for entry in expected.tokens.values_mut() {
            entry.status = LinkStatus::Confirmed;
        }

        test_transition(
            create_sm,
            get_state,
            test_cfg(),
            Transition {
                from_state: initial,
                event: ack_event(1, vec![linked_ack(USDC), linked_ack(DAI)]),
                expected_state: expected,
                expected_duties: vec![],
                expected_signals: vec![confirmed(USDC), confirmed(DAI)],
            },
        );
    }

    #[test]
    fn test_ack_adopts_hub_values() {
        let mut gateway = pending_gateway();

        // the hub already had USDC linked with a higher minimum and paused
        let ack = LinkAckItem {
            status: LinkAckStatus::Existing,
            min_bridge_amount: U256::new(5 * USDC_MIN),
            paused: true,
            ..linked_ack(USDC)
        };
        gateway.process_event(test_cfg(), ack_event(1, vec![ack])).unwrap();

        let entry = gateway.token_entry(&USDC).unwrap();
        assert!(entry.is_confirmed());
        assert_eq!(entry.min_bridge_amount, U256::new(5 * USDC_MIN));
        assert!(entry.paused);
        assert_eq!(entry.decimals_delta, DecimalsDelta::new(12).unwrap());

        // DAI was not acknowledged yet
        assert_eq!(gateway.token_entry(&DAI).unwrap().status, LinkStatus::Pending);
    }

    #[test]
    fn test_rejection_marks_entry() {
        let initial = pending_gateway().state;

        let mut expected = initial.clone();
        expected.tokens.get_mut(&USDC).unwrap().status = LinkStatus::Confirmed;
        expected.tokens.get_mut(&DAI).unwrap().status =
            LinkStatus::Rejected(LinkRejection::DecimalsMismatch);

        test_transition(
            create_sm,
            get_state,
            test_cfg(),
            Transition {
                from_state: initial,
                event: ack_event(
                    1,
                    vec![
                        linked_ack(USDC),
                        rejected_ack(DAI, LinkRejection::DecimalsMismatch),
                    ],
                ),
                expected_state: expected,
                expected_duties: vec![],
                expected_signals: vec![
                    confirmed(USDC),
                    GatewaySignal::LinkRejected {
                        token: DAI,
                        reason: LinkRejection::DecimalsMismatch,
                    },
                ],
            },
        );
    }

    #[test]
    fn test_rejection_does_not_downgrade_confirmed_entry() {
        let mut gateway = linked_gateway();

        let output = gateway
            .process_event(
                test_cfg(),
                ack_event(2, vec![rejected_ack(USDC, LinkRejection::AlreadyLinked)]),
            )
            .unwrap();

        assert_eq!(
            output.signals,
            vec![GatewaySignal::LinkRejected {
                token: USDC,
                reason: LinkRejection::AlreadyLinked,
            }]
        );
        assert!(gateway.token_entry(&USDC).unwrap().is_confirmed());
    }

    #[test]
    fn test_ack_for_unrequested_token_fails() {
        test_invalid_transition(
            create_sm,
            get_state,
            test_cfg(),
            InvalidTransition {
                from_state: pending_gateway().state,
                event: ack_event(1, vec![linked_ack(USDC), linked_ack(UNKNOWN_TOKEN)]),
                expected_error: |err| {
                    matches!(err, GatewayError::UnexpectedLinkAck(token) if *token == UNKNOWN_TOKEN)
                },
            },
        );
    }

    #[test]
    fn test_empty_ack_fails() {
        test_invalid_transition(
            create_sm,
            get_state,
            test_cfg(),
            InvalidTransition {
                from_state: pending_gateway().state,
                event: ack_event(1, vec![]),
                expected_error: |err| matches!(err, GatewayError::EmptyBatch),
            },
        );
    }

    #[test]
    fn test_ack_is_not_gated_by_pause() {
        let mut gateway = pending_gateway();
        gateway.set_paused(&OWNER, true).unwrap();

        gateway
            .process_event(test_cfg(), ack_event(1, vec![linked_ack(USDC)]))
            .unwrap();

        assert!(gateway.token_entry(&USDC).unwrap().is_confirmed());
    }
}
