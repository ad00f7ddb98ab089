//! Re-exports of the parameter types.

pub use crate::{
    controller::{BatchPolicy, GatewayParams, HubParams},
    errors::ParamsError,
    transport::TransportParams,
    BridgeParams,
};
