//! The contract shared by the Hub and Gateway controllers.
//!
//! A controller consumes inbound messages one at a time. Accepting a message yields an
//! [`SMOutput`]: duties for the orchestrator to carry out, such as sending a `LinkAck` back, and
//! signals describing what happened. Rejecting a message yields an error and no side effects.

use crate::signals::Signal;

/// What an accepted message produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SMOutput<D, S: Into<Signal>> {
    /// Work to be done outside the controller.
    pub duties: Vec<D>,
    /// Notifications for observers.
    pub signals: Vec<S>,
}

impl<D, S: Into<Signal>> SMOutput<D, S> {
    /// Output carrying duties only.
    pub const fn with_duties(duties: Vec<D>) -> Self {
        Self::with_duties_and_signals(duties, Vec::new())
    }

    /// Output carrying signals only.
    pub const fn with_signals(signals: Vec<S>) -> Self {
        Self::with_duties_and_signals(Vec::new(), signals)
    }

    pub const fn with_duties_and_signals(duties: Vec<D>, signals: Vec<S>) -> Self {
        Self { duties, signals }
    }

    /// Whether the message produced nothing observable.
    pub fn is_empty(&self) -> bool {
        self.duties.is_empty() && self.signals.is_empty()
    }
}

/// A bridge controller driven by inbound messages.
///
/// `OutgoingSignal` converts into [`Signal`] so the orchestrator can collect the signals of every
/// controller in one log, while each controller can only emit its own kind.
///
/// [`process_event`](Self::process_event) is atomic: on error the controller is unchanged. This
/// is what makes a failed message safe to retry.
pub trait StateMachine {
    /// Static configuration, shared by all transitions.
    type Config;

    type Duty;

    type OutgoingSignal: Into<Signal>;

    /// An inbound message together with its origin.
    type Event;

    type Error;

    /// Applies `event`, returning what it produced or why it was rejected.
    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<SMOutput<Self::Duty, Self::OutgoingSignal>, Self::Error>;
}
