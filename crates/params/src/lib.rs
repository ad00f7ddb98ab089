//! This crate contains the protocol parameters that dictate how the Hub, the Gateways and the
//! simulated transport behave.
//!
//! All chains participating in a bridge deployment must agree on these values: a Gateway quoting
//! fees with different parameters than its endpoint charges will have its messages refused, and
//! controllers that disagree on batch policies will drift apart.

pub mod controller;
pub mod default;
pub mod errors;
pub mod prelude;
pub mod transport;

use serde::{Deserialize, Serialize};

use crate::{
    controller::{GatewayParams, HubParams},
    errors::ParamsError,
    transport::TransportParams,
};

/// All protocol parameters of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeParams {
    /// Fee and gas model of the transport endpoints.
    #[serde(default)]
    pub transport: TransportParams,

    /// Parameters of the Hub controller.
    #[serde(default)]
    pub hub: HubParams,

    /// Parameters shared by all Gateway controllers.
    #[serde(default)]
    pub gateway: GatewayParams,
}

impl BridgeParams {
    /// Checks the parameters for internal consistency.
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.transport.validate()?;

        for (name, len) in [
            ("hub.max_batch_len", self.hub.max_batch_len),
            ("gateway.max_batch_len", self.gateway.max_batch_len),
        ] {
            if len == 0 || len > default::MAX_BATCH_LEN {
                return Err(ParamsError::BatchLenOutOfRange { name, len });
            }
        }

        Ok(())
    }
}
