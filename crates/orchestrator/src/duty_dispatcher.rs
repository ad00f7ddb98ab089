//! Provides interface for dispatching duties to the appropriate executors.

use omnibridge_sm::{gateway::duties::GatewayDuty, hub::duties::HubDuty};
use omnibridge_transport::{MessageSender, MessagingReceipt, SendOptions};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    bus::MessageBus,
    errors::OrchestratorResult,
    network::{HubNode, Network},
    node_types::UnifiedDuty,
};

/// The `DutyDispatcher` is responsible for executing the duties emitted by the controllers.
///
/// The only duties that exist today are messages the Hub owes a Gateway. They are sent through
/// the Hub's endpoint, paying exactly the quoted fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct DutyDispatcher {
    options: SendOptions,
}

impl DutyDispatcher {
    /// Creates a dispatcher that sends messages with the given options.
    pub const fn new(options: SendOptions) -> Self {
        Self { options }
    }

    /// Dispatches a duty to the appropriate executor.
    ///
    /// A failing duty is logged and returned; the controller's state is already committed, so the
    /// caller decides whether to retry.
    pub fn dispatch(
        &self,
        hub: &mut HubNode,
        duty: UnifiedDuty,
    ) -> OrchestratorResult<Option<MessagingReceipt>> {
        match duty {
            UnifiedDuty::Hub(duty) => self
                .execute_hub_duty(hub, &duty)
                .map(Some)
                .inspect_err(|err| error!(%err, %duty, "failed to execute hub duty")),
            UnifiedDuty::Gateway(duty) => match duty {},
        }
    }

    fn execute_hub_duty(
        &self,
        hub: &mut HubNode,
        duty: &HubDuty,
    ) -> OrchestratorResult<MessagingReceipt> {
        let (dst_chain, receiver) = duty.destination();
        let payload = duty.message().encode();

        let fee = hub
            .endpoint
            .quote(dst_chain, payload.len(), &self.options)?;
        let receipt = hub.endpoint.send(
            hub.sm.context().address,
            dst_chain,
            receiver,
            payload,
            &self.options,
            fee.native_fee,
        )?;

        info!(%duty, guid = %receipt.guid, nonce = %receipt.nonce, "executed hub duty");
        Ok(receipt)
    }
}

/// A duty that could not be carried out. Its controller's transition stays applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    /// The duty, as displayed.
    pub duty: String,
    /// Why it failed.
    pub reason: String,
}

impl<B: MessageBus> Network<B> {
    /// Dispatches `duty`, recording a failure instead of returning it.
    pub(crate) fn dispatch_duty(&mut self, duty: UnifiedDuty) -> Option<MessagingReceipt> {
        let label = duty.to_string();
        match self.dispatcher.dispatch(&mut self.hub, duty) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.dispatch_failures.push(DispatchFailure {
                    duty: label,
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Duties that failed so far, in order.
    pub fn dispatch_failures(&self) -> &[DispatchFailure] {
        &self.dispatch_failures
    }
}

/// Wraps the duties of a gateway. Gateways currently emit none.
pub(crate) fn gateway_duties(duties: Vec<GatewayDuty>) -> impl Iterator<Item = UnifiedDuty> {
    duties.into_iter().map(UnifiedDuty::Gateway)
}
