//! The transitions of the Hub controller.
//!
//! Inbound messages are handled in [`deposit`] and [`link`]; the calls users and the owner make
//! directly live in [`bridge`] and [`admin`].

pub mod admin;
pub mod bridge;
mod deposit;
mod link;

use crate::hub::errors::{HubError, HubResult};

/// Rejects empty batches and batches longer than `max`.
pub(crate) const fn check_batch_len(len: usize, max: usize) -> HubResult<()> {
    if len == 0 {
        return Err(HubError::EmptyBatch);
    }

    if len > max {
        return Err(HubError::BatchTooLarge { len, max });
    }

    Ok(())
}
