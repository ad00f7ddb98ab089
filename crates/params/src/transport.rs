//! Fee and gas model of the simulated omnichain transport.

use omnibridge_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{
    default::{
        BASE_FEE, DEFAULT_GAS_LIMIT, EXEC_BASE_GAS, EXEC_GAS_PER_BYTE, GAS_PRICE,
        MAX_MESSAGE_SIZE, PER_BYTE_FEE,
    },
    errors::ParamsError,
};

/// Three header words of the wire format.
const MIN_MESSAGE_SIZE: usize = 96;

/// Parameters every endpoint uses to quote and execute messages.
///
/// The fee for a message is `base_fee + gas_limit * gas_price + per_byte_fee * len`. Executing a
/// message of `len` bytes needs `exec_base_gas + exec_gas_per_byte * len` gas; a message sent with
/// a lower gas limit stays verified but unexecuted until it is retried with more gas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportParams {
    /// Flat fee per message.
    #[serde(with = "ethnum::serde::permissive")]
    pub base_fee: U256,

    /// Fee per unit of destination gas.
    #[serde(with = "ethnum::serde::permissive")]
    pub gas_price: U256,

    /// Fee per payload byte.
    #[serde(with = "ethnum::serde::permissive")]
    pub per_byte_fee: U256,

    /// Gas needed for any delivery.
    pub exec_base_gas: u64,

    /// Additional gas needed per payload byte.
    pub exec_gas_per_byte: u64,

    /// Gas limit used when the sender passes none.
    pub default_gas_limit: u64,

    /// Largest accepted payload in bytes.
    pub max_message_size: usize,
}

impl TransportParams {
    /// Gas needed to execute a payload of `len` bytes.
    pub fn execution_gas(&self, len: usize) -> u64 {
        self.exec_base_gas
            .saturating_add(self.exec_gas_per_byte.saturating_mul(len as u64))
    }

    pub(crate) fn validate(&self) -> Result<(), ParamsError> {
        if self.max_message_size < MIN_MESSAGE_SIZE {
            return Err(ParamsError::MessageSizeTooSmall(self.max_message_size));
        }

        if self.default_gas_limit < self.exec_base_gas {
            return Err(ParamsError::GasLimitBelowBase {
                limit: self.default_gas_limit,
                base: self.exec_base_gas,
            });
        }

        Ok(())
    }
}

impl Default for TransportParams {
    fn default() -> Self {
        Self {
            base_fee: U256::new(BASE_FEE),
            gas_price: U256::new(GAS_PRICE),
            per_byte_fee: U256::new(PER_BYTE_FEE),
            exec_base_gas: EXEC_BASE_GAS,
            exec_gas_per_byte: EXEC_GAS_PER_BYTE,
            default_gas_limit: DEFAULT_GAS_LIMIT,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}
