//! Test tooling shared by the Hub and Gateway controllers.
//!
//! [`transition`] checks concrete messages against their expected effects, for example a deposit
//! of one USDC that must mint `10^18` sUSDC and nothing else:
//!
//! ```rust,ignore
//! test_transition(
//!     create_sm,
//!     get_state,
//!     test_cfg(),
//!     Transition {
//!         from_state: linked_hub().state,
//!         event: deposit_event(1, ALICE, vec![usdc(USDC_MIN)]),
//!         expected_state,
//!         expected_duties: vec![],
//!         expected_signals: vec![minted(ALICE, susdc(), ONE_TOKEN)],
//!     },
//! );
//! ```
//!
//! [`proptest`] holds the laws every controller obeys for arbitrary states and inbound messages.

pub(crate) mod proptest;
pub(crate) mod transition;
