//! Property-based tests for the Hub State Machine.
#[cfg(test)]
mod tests {
    use omnibridge_params::transport::TransportParams;
    use omnibridge_primitives::{types::Asset, U256};
    use omnibridge_transport::{Endpoint, MessageSender, SendOptions};
    use proptest::prelude::*;

    use crate::{
        hub::{machine::HubSM, tests::*},
        prop_deterministic, prop_no_silent_acceptance,
        state_machine::StateMachine,
    };

    // Property: State machine is deterministic
    prop_deterministic!(
        HubSM,
        create_sm,
        get_state,
        test_cfg(),
        arb_hub_state(),
        arb_hub_event()
    );

    // Property: No silent acceptance, and rejected messages leave no trace
    prop_no_silent_acceptance!(
        HubSM,
        create_sm,
        get_state,
        test_cfg(),
        arb_hub_state(),
        arb_hub_event()
    );

    #[derive(Debug, Clone)]
    enum Op {
        Deposit(Asset),
        Withdraw(Asset),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        let remote = (prop_oneof![Just(USDC), Just(DAI)], 0u128..5_000_000)
            .prop_map(|(token, amount)| Asset::new(token, U256::new(amount)));
        let synthetic = (
            prop_oneof![Just(susdc()), Just(sdai())],
            0u128..5 * ONE_TOKEN,
        )
            .prop_map(|(token, amount)| Asset::new(token, U256::new(amount)));

        prop_oneof![remote.prop_map(Op::Deposit), synthetic.prop_map(Op::Withdraw)]
    }

    /// Supply of every synthetic token equals what its links lock, converted to synthetic units.
    fn assert_conserved(hub: &HubSM) -> Result<(), TestCaseError> {
        for token in hub.registry().tokens() {
            let mut backed = U256::ZERO;
            for chain in hub.linked_chains(&token.address) {
                let entry = hub
                    .remote_token_info(&token.address, chain)
                    .expect("linked chain has a link");
                backed += entry
                    .decimals_delta
                    .to_synthetic(entry.cumulative_locked)
                    .expect("locked balances convert");
            }

            let supply = hub
                .synthetic_ledger(&token.address)
                .expect("synthetic tokens have ledgers")
                .total_supply();
            prop_assert_eq!(supply, backed, "supply of {} is not backed", token.symbol);
        }

        Ok(())
    }

    proptest! {
        #[test]
        fn supply_is_backed_by_locked_balances(ops in prop::collection::vec(arb_op(), 1..24)) {
            let cfg = test_cfg();
            let mut hub = linked_hub();
            let mut endpoint = Endpoint::new(HUB_CHAIN, TransportParams::default());
            let options = SendOptions::default();

            for (nonce, op) in (1u64..).zip(ops) {
                match op {
                    Op::Deposit(asset) => {
                        let _ = hub.process_event(cfg.clone(), deposit_event(nonce, ALICE, vec![asset]));
                    }
                    Op::Withdraw(asset) => {
                        let fee = endpoint
                            .quote(GATEWAY_CHAIN, 160, &options)
                            .expect("fee can be quoted")
                            .native_fee;
                        let _ = hub.bridge_tokens(&cfg, &ALICE, BOB, &[asset], GATEWAY_CHAIN, &options, fee, &mut endpoint);
                    }
                }

                assert_conserved(&hub)?;
            }
        }
    }
}
