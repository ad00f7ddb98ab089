//! This crate implements the controllers of the bridge as state machines.
//!
//! The [Hub](hub::machine::HubSM) and every [Gateway](gateway::machine::GatewaySM) are independent
//! actors. They only interact through verified messages delivered by the transport: each inbound
//! message is an event that either applies atomically, possibly emitting duties and signals, or
//! fails without touching the state so that it can be retried later.
//!
//! User and owner entry points (deposits, withdrawals, linking, pausing) are plain methods on the
//! machines; the ones that emit a message take a [`MessageSender`](omnibridge_transport::MessageSender).

pub mod errors;
pub mod gateway;
pub mod hub;
pub mod inbound;
pub mod ledger;
pub mod mailbox;
pub mod reconcile;
pub mod signals;
pub mod state_machine;

#[cfg(test)]
pub(crate) mod testing;
