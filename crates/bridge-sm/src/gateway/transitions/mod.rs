//! The transitions of the Gateway controller.
//!
//! Inbound messages are handled in [`unlock`] and [`link_ack`]; the calls users and the owner make
//! directly live in [`deposit`], [`link`] and [`admin`].

pub mod admin;
pub mod deposit;
pub mod link;
mod link_ack;
mod unlock;

use crate::gateway::errors::{GatewayError, GatewayResult};

/// Rejects empty batches and batches longer than `max`.
pub(crate) const fn check_batch_len(len: usize, max: usize) -> GatewayResult<()> {
    if len == 0 {
        return Err(GatewayError::EmptyBatch);
    }

    if len > max {
        return Err(GatewayError::BatchTooLarge { len, max });
    }

    Ok(())
}
