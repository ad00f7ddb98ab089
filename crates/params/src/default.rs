//! Default values for the bridge parameters.

/// Flat fee charged by an endpoint for every outbound message, in native base units.
pub const BASE_FEE: u128 = 100_000_000_000_000;

/// Price charged per unit of executor gas requested for the destination.
pub const GAS_PRICE: u128 = 1_000_000_000;

/// Fee charged per payload byte.
pub const PER_BYTE_FEE: u128 = 1_000_000_000;

/// Gas consumed by the executor for any delivery.
pub const EXEC_BASE_GAS: u64 = 60_000;

/// Additional gas consumed per payload byte on delivery.
pub const EXEC_GAS_PER_BYTE: u64 = 250;

/// Gas limit attached to a message when the caller supplies none.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Largest payload an endpoint accepts, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 10_000;

/// Largest number of items a controller packs into a single message.
pub const MAX_BATCH_LEN: usize = 64;
