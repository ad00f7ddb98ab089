//! The Gateway controller.
//!
//! A Gateway lives on every chain other than the Hub's. It holds the real tokens deposited by
//! users, mirrors the Hub's links for its tokens in a [token table](state::TokenTable) and
//! releases tokens when the Hub sends an unlock.

pub mod config;
pub mod duties;
pub mod errors;
pub mod events;
pub mod machine;
pub mod state;
#[cfg(test)]
mod tests;
pub mod transitions;
