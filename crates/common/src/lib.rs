//! Reusable utilities for the services and tools of the bridge, such as initializing the tracing
//! framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
