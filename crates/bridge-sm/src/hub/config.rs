//! Configuration of the Hub controller.

use omnibridge_params::controller::{BatchPolicy, HubParams};

/// Static configuration passed to every Hub transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubCfg {
    /// The protocol parameters of the Hub.
    pub params: HubParams,
}

impl HubCfg {
    /// Creates a configuration from the protocol parameters.
    pub const fn new(params: HubParams) -> Self {
        Self { params }
    }

    /// Batch policy for inbound deposits.
    pub const fn deposit_policy(&self) -> BatchPolicy {
        self.params.deposit_policy
    }

    /// Batch policy for inbound link requests.
    pub const fn link_policy(&self) -> BatchPolicy {
        self.params.link_policy
    }

    /// Largest accepted batch.
    pub const fn max_batch_len(&self) -> usize {
        self.params.max_batch_len
    }
}
