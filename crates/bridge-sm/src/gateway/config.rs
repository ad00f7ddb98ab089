//! Configuration of the Gateway controller.

use omnibridge_params::controller::GatewayParams;

/// Static configuration passed to every Gateway transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayCfg {
    /// The protocol parameters of the Gateways.
    pub params: GatewayParams,
}

impl GatewayCfg {
    /// Creates a configuration from the protocol parameters.
    pub const fn new(params: GatewayParams) -> Self {
        Self { params }
    }

    /// Largest accepted batch.
    pub const fn max_batch_len(&self) -> usize {
        self.params.max_batch_len
    }
}
