use omnibridge_transport::Origin;
use omnibridge_wire::{LinkAckItem, LinkAckStatus};
use tracing::{info, warn};

use crate::{
    gateway::{
        errors::{GatewayError, GatewayResult},
        machine::{GatewayOutput, GatewaySM},
        state::LinkStatus,
    },
    signals::GatewaySignal,
};

impl GatewaySM {
    /// Processes the Hub's answer to a link request.
    ///
    /// Linked tokens are confirmed with the Hub's values, refused tokens are marked rejected and
    /// may be requested again. A confirmed entry is never downgraded by a later refusal.
    pub(crate) fn process_link_ack(
        &mut self,
        origin: &Origin,
        items: Vec<LinkAckItem>,
    ) -> GatewayResult<GatewayOutput> {
        if items.is_empty() {
            return Err(GatewayError::EmptyBatch);
        }
        if let Some(item) = items
            .iter()
            .find(|item| !self.state.tokens.contains_key(&item.token))
        {
            warn!(%origin, token = %item.token, "acknowledgement for unrequested token");
            return Err(GatewayError::UnexpectedLinkAck(item.token));
        }

        let mut signals = Vec::with_capacity(items.len());
        for item in items {
            let Some(entry) = self.state.tokens.get_mut(&item.token) else {
                continue;
            };

            match item.status {
                LinkAckStatus::Linked | LinkAckStatus::Existing => {
                    entry.synthetic_token = item.synthetic_token;
                    entry.decimals_delta = item.decimals_delta;
                    entry.min_bridge_amount = item.min_bridge_amount;
                    entry.paused = item.paused;
                    entry.status = LinkStatus::Confirmed;

                    info!(%origin, token = %item.token, synthetic = %item.synthetic_token, status = ?item.status, "link confirmed");
                    signals.push(GatewaySignal::LinkConfirmed {
                        token: item.token,
                        synthetic_token: item.synthetic_token,
                    });
                }
                LinkAckStatus::Rejected(reason) => {
                    if !entry.is_confirmed() {
                        entry.status = LinkStatus::Rejected(reason);
                    }

                    warn!(%origin, token = %item.token, %reason, "link rejected");
                    signals.push(GatewaySignal::LinkRejected {
                        token: item.token,
                        reason,
                    });
                }
            }
        }

        Ok(GatewayOutput::with_signals(signals))
    }
}
