//! The Hub controller.
//!
//! The Hub owns the synthetic tokens and the [registry](registry::LinkRegistry) that maps every
//! synthetic token to the real tokens locked by the Gateways. It mints synthetic tokens for
//! deposits it receives, burns them for withdrawals and answers link requests.

pub mod config;
pub mod duties;
pub mod errors;
pub mod events;
pub mod machine;
pub mod registry;
pub mod state;
#[cfg(test)]
mod tests;
pub mod transitions;
