//! Parameters of the Hub and Gateway controllers.

use serde::{Deserialize, Serialize};

use crate::default::MAX_BATCH_LEN;

/// How a controller treats a batch in which some items fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Any failing item fails the whole message and nothing is applied.
    #[default]
    AllOrNothing,

    /// Failing items are reported and skipped, the rest is applied. A message in which every item
    /// fails still fails as a whole.
    PerItem,
}

/// Parameters of the Hub controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubParams {
    /// Batch policy for inbound deposits.
    #[serde(default)]
    pub deposit_policy: BatchPolicy,

    /// Batch policy for inbound link requests.
    #[serde(default = "default_link_policy")]
    pub link_policy: BatchPolicy,

    /// Largest number of assets accepted in a single `bridge_tokens` call.
    #[serde(default = "default_max_batch_len")]
    pub max_batch_len: usize,
}

impl Default for HubParams {
    fn default() -> Self {
        Self {
            deposit_policy: BatchPolicy::AllOrNothing,
            link_policy: default_link_policy(),
            max_batch_len: MAX_BATCH_LEN,
        }
    }
}

/// Parameters shared by all Gateway controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayParams {
    /// Largest number of assets or token configurations in a single call.
    #[serde(default = "default_max_batch_len")]
    pub max_batch_len: usize,
}

impl Default for GatewayParams {
    fn default() -> Self {
        Self {
            max_batch_len: MAX_BATCH_LEN,
        }
    }
}

const fn default_link_policy() -> BatchPolicy {
    BatchPolicy::PerItem
}

const fn default_max_batch_len() -> usize {
    MAX_BATCH_LEN
}
