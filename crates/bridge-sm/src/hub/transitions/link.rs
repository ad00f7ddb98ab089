use omnibridge_params::controller::BatchPolicy;
use omnibridge_transport::Origin;
use omnibridge_wire::{LinkAckItem, LinkAckStatus, LinkRequestItem};
use tracing::{info, warn};

use crate::hub::{
    config::HubCfg,
    duties::HubDuty,
    errors::{HubError, HubResult},
    machine::{HubOutput, HubSM},
    registry::{LinkCheck, LinkEntry, LinkRegistry, NewLink},
    transitions::check_batch_len,
};

impl HubSM {
    /// Processes a request of a gateway to link its tokens to synthetic tokens.
    ///
    /// The items are applied in order to a copy of the registry, so later items see the links
    /// created by earlier ones. Under [`BatchPolicy::PerItem`] refused items are reported in the
    /// acknowledgement; under [`BatchPolicy::AllOrNothing`] the first refused item fails the
    /// message.
    pub(crate) fn process_link_request(
        &mut self,
        cfg: &HubCfg,
        origin: &Origin,
        items: Vec<LinkRequestItem>,
    ) -> HubResult<HubOutput> {
        check_batch_len(items.len(), cfg.max_batch_len())?;

        let mut registry = self.state.registry.clone();
        let mut acks = Vec::with_capacity(items.len());

        for item in &items {
            let ack = match link_item(&mut registry, origin, item) {
                Ok(ack) => {
                    info!(%origin, token = %item.token, synthetic = %item.synthetic_token, status = ?ack.status, "link request item accepted");
                    ack
                }
                Err(err) => {
                    let rejection = match (cfg.link_policy(), err.link_rejection()) {
                        (BatchPolicy::PerItem, Some(rejection)) => rejection,
                        _ => {
                            warn!(%origin, token = %item.token, %err, "link request rejected");
                            return Err(err);
                        }
                    };

                    warn!(%origin, token = %item.token, %err, "link request item rejected");
                    LinkAckItem {
                        token: item.token,
                        status: LinkAckStatus::Rejected(rejection),
                        synthetic_token: item.synthetic_token,
                        decimals_delta: item.decimals_delta,
                        min_bridge_amount: item.min_bridge_amount,
                        paused: item.paused,
                    }
                }
            };
            acks.push(ack);
        }

        self.state.registry = registry;

        Ok(HubOutput::with_duties(vec![HubDuty::SendLinkAck {
            dst_chain: origin.src_chain,
            receiver: origin.sender,
            items: acks,
        }]))
    }
}

fn link_item(
    registry: &mut LinkRegistry,
    origin: &Origin,
    item: &LinkRequestItem,
) -> HubResult<LinkAckItem> {
    if item.token.is_zero() || item.synthetic_token.is_zero() {
        return Err(HubError::ZeroAddress);
    }

    let index = registry
        .token_index(&item.synthetic_token)
        .ok_or(HubError::UnknownSyntheticToken(item.synthetic_token))?;
    let actual = registry
        .token(index)
        .ok_or(HubError::UnknownTokenIndex(index))?
        .decimals;
    if actual != item.synthetic_decimals {
        return Err(HubError::DecimalsMismatch {
            token: item.synthetic_token,
            requested: item.synthetic_decimals,
            actual,
        });
    }

    let link = NewLink {
        chain: origin.src_chain,
        remote_token: item.token,
        gateway: origin.sender,
        decimals_delta: item.decimals_delta,
        min_bridge_amount: item.min_bridge_amount,
        paused: item.paused,
    };

    let (status, link_idx) = match registry.check_link(index, &link)? {
        LinkCheck::Identical(link_idx) => (LinkAckStatus::Existing, link_idx),
        LinkCheck::New => (LinkAckStatus::Linked, registry.insert_link(index, link)?),
    };

    let entry = registry
        .link(link_idx)
        .ok_or(HubError::TokenNotRegistered {
            chain: origin.src_chain,
            token: item.token,
        })?;

    Ok(ack(item, status, entry))
}

/// Reports the Hub's values of `entry` back to the gateway.
fn ack(item: &LinkRequestItem, status: LinkAckStatus, entry: &LinkEntry) -> LinkAckItem {
    LinkAckItem {
        token: item.token,
        status,
        synthetic_token: item.synthetic_token,
        decimals_delta: entry.decimals_delta,
        min_bridge_amount: entry.min_bridge_amount,
        paused: entry.paused,
    }
}
