//! The outermost layer of the bridge simulation, responsible for:
//!
//! - Holding the Hub and Gateway nodes, each a controller with its own transport endpoint.
//! - Carrying packets between the endpoints over a [`MessageBus`](bus::MessageBus) and relaying
//!   them: verification, ordered execution, retries, skips and clears.
//! - Dispatching the duties emitted by the controllers.
//! - Reporting channel health and snapshotting the whole network.
//! - Driving the network from declarative scenarios.

pub mod bus;
pub mod duty_dispatcher;
pub mod errors;
pub mod monitor;
pub mod network;
pub mod node_types;
pub mod relayer;
pub mod scenario;

#[cfg(test)]
mod testing;
