//! The duties the Gateway controller emits.

use std::fmt;

/// Work a Gateway needs done outside of the state machine.
///
/// Gateways never answer a message, everything they send is sent by a direct call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayDuty {}

impl fmt::Display for GatewayDuty {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
