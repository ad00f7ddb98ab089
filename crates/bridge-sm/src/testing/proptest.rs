//! Laws every controller must obey, checked over arbitrary states and inbound messages.
//!
//! Both macros take the controller type, a constructor from a state, a state getter, the config
//! and two strategies: one for states and one for events.

/// Two controllers in the same state given the same message end up in the same state and emit
/// the same output, or fail with the same error.
#[macro_export]
macro_rules! prop_deterministic {
    ($sm_type:ty, $create_fn:expr, $get_state_fn:expr, $config:expr, $state_strategy:expr, $event_strategy:expr) => {
        proptest::proptest! {
            #[test]
            fn same_message_same_outcome(
                state in $state_strategy,
                event in $event_strategy,
            ) {
                use $crate::state_machine::StateMachine;

                let cfg = $config;
                let mut left: $sm_type = $create_fn(state.clone());
                let mut right: $sm_type = $create_fn(state);

                let left_result = left.process_event(cfg.clone(), event.clone());
                let right_result = right.process_event(cfg, event);

                proptest::prop_assert_eq!(left_result, right_result);
                proptest::prop_assert_eq!($get_state_fn(&left), $get_state_fn(&right));
            }
        }
    };
}

/// An accepted message changes the state or emits something. A rejected message leaves the
/// state untouched, so a stuck message can be retried as often as needed.
#[macro_export]
macro_rules! prop_no_silent_acceptance {
    ($sm_type:ty, $create_fn:expr, $get_state_fn:expr, $config:expr, $state_strategy:expr, $event_strategy:expr) => {
        proptest::proptest! {
            #[test]
            fn message_has_effect_or_is_rejected_cleanly(
                state in $state_strategy,
                event in $event_strategy,
            ) {
                use $crate::state_machine::StateMachine;

                let before = state.clone();
                let mut sm: $sm_type = $create_fn(state);

                let result = sm.process_event($config, event);
                let after = $get_state_fn(&sm);

                match result {
                    Ok(output) => proptest::prop_assert!(
                        &before != after || !output.is_empty(),
                        "message accepted without any effect"
                    ),
                    Err(err) => proptest::prop_assert_eq!(
                        &before,
                        after,
                        "state changed although the message was rejected with {:?}",
                        err
                    ),
                }
            }
        }
    };
}
