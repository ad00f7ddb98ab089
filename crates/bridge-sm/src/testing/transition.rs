//! Helpers for checking a controller against concrete transitions.
//!
//! A [`Transition`] pins down everything an accepted message does: the state afterwards and the
//! duties and signals it emits. An [`InvalidTransition`] pins down a rejection, which must leave
//! the state exactly as it was. [`EventSequence`] replays several messages, interleaved with
//! admin calls, and keeps every result for later inspection.

use std::fmt::Debug;

use crate::{
    signals::Signal,
    state_machine::{SMOutput, StateMachine},
};

/// An accepted message and everything it is expected to do.
#[derive(Debug)]
pub(crate) struct Transition<S, E, D, Sig> {
    pub(crate) from_state: S,
    pub(crate) event: E,
    pub(crate) expected_state: S,
    pub(crate) expected_duties: Vec<D>,
    pub(crate) expected_signals: Vec<Sig>,
}

/// Runs `transition` on a controller built from its initial state and checks the outcome.
pub(crate) fn test_transition<SM, S, E, D, Sig, Err, CreateFn, GetStateFn>(
    create_sm: CreateFn,
    get_state: GetStateFn,
    config: SM::Config,
    transition: Transition<S, E, D, Sig>,
) where
    SM: StateMachine<Event = E, Duty = D, OutgoingSignal = Sig, Error = Err>,
    S: PartialEq + Debug,
    D: PartialEq + Debug,
    Sig: PartialEq + Debug + Into<Signal>,
    Err: Debug,
    CreateFn: Fn(S) -> SM,
    GetStateFn: Fn(&SM) -> &S,
{
    let Transition {
        from_state,
        event,
        expected_state,
        expected_duties,
        expected_signals,
    } = transition;
    let mut sm = create_sm(from_state);

    let output = match sm.process_event(config, event) {
        Ok(output) => output,
        Err(err) => panic!("message must be accepted, got {err:?}"),
    };

    assert_eq!(get_state(&sm), &expected_state, "unexpected state");
    assert_eq!(
        output,
        SMOutput::with_duties_and_signals(expected_duties, expected_signals),
        "unexpected output"
    );
}

/// A message that must be rejected.
#[derive(Debug)]
pub(crate) struct InvalidTransition<S, E, Err> {
    pub(crate) from_state: S,
    pub(crate) event: E,
    /// Whether the rejection is the expected one.
    pub(crate) expected_error: fn(&Err) -> bool,
}

/// Runs `invalid` and checks that it fails with the expected error and changes nothing.
pub(crate) fn test_invalid_transition<SM, S, E, D, Sig, Err, CreateFn, GetStateFn>(
    create_sm: CreateFn,
    get_state: GetStateFn,
    config: SM::Config,
    invalid: InvalidTransition<S, E, Err>,
) where
    SM: StateMachine<Event = E, Duty = D, OutgoingSignal = Sig, Error = Err>,
    S: Clone + PartialEq + Debug,
    D: Debug,
    Sig: Into<Signal> + Debug,
    Err: Debug,
    CreateFn: Fn(S) -> SM,
    GetStateFn: Fn(&SM) -> &S,
{
    let before = invalid.from_state.clone();
    let mut sm = create_sm(invalid.from_state);

    match sm.process_event(config, invalid.event) {
        Ok(output) => panic!("message must be rejected, got {output:?}"),
        Err(err) => assert!((invalid.expected_error)(&err), "unexpected error {err:?}"),
    }

    assert_eq!(get_state(&sm), &before, "rejected message changed the state");
}

/// A controller fed one message after another.
#[derive(Debug)]
pub(crate) struct EventSequence<SM, S, GetStateFn>
where
    SM: StateMachine,
    GetStateFn: Fn(&SM) -> &S,
{
    sm: SM,
    get_state: GetStateFn,
    results: Vec<Result<SMOutput<SM::Duty, SM::OutgoingSignal>, SM::Error>>,
}

impl<SM, S, GetStateFn> EventSequence<SM, S, GetStateFn>
where
    SM: StateMachine,
    GetStateFn: Fn(&SM) -> &S,
{
    pub(crate) const fn new(sm: SM, get_state: GetStateFn) -> Self {
        Self {
            sm,
            get_state,
            results: Vec::new(),
        }
    }

    /// Delivers `event` and records the result, whatever it is.
    pub(crate) fn process(&mut self, config: SM::Config, event: SM::Event) -> &mut Self {
        let result = self.sm.process_event(config, event);
        self.results.push(result);
        self
    }

    pub(crate) fn state(&self) -> &S {
        (self.get_state)(&self.sm)
    }

    /// The controller itself, for admin calls between messages.
    pub(crate) fn sm_mut(&mut self) -> &mut SM {
        &mut self.sm
    }

    /// Signals of the accepted messages, in delivery order.
    pub(crate) fn all_signals(&self) -> Vec<&SM::OutgoingSignal> {
        self.results
            .iter()
            .filter_map(|result| result.as_ref().ok())
            .flat_map(|output| &output.signals)
            .collect()
    }

    /// Rejections, each with the position of its message in the sequence.
    pub(crate) fn all_errors(&self) -> Vec<(usize, &SM::Error)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| result.as_ref().err().map(|err| (index, err)))
            .collect()
    }
}
