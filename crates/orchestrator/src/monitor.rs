//! Observability of the network: per-channel status, the peer-rejection log and snapshots.
//!
//! Messages that fail silently from a user's point of view, because they are stuck behind a gate,
//! lack gas or never made it past verification, all show up here.

use std::collections::BTreeMap;

use omnibridge_primitives::types::{ChainId, Nonce};
use omnibridge_sm::{gateway::machine::GatewaySM, hub::machine::HubSM, signals::Signal};
use omnibridge_transport::{Channel, ChannelKey, Endpoint, Guid, PeerRejection};
use serde::Serialize;

use crate::{
    bus::MessageBus, duty_dispatcher::DispatchFailure, errors::OrchestratorResult,
    network::Network,
};

/// A verified message that has not executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StuckMessage {
    /// Nonce on the channel.
    pub nonce: Nonce,
    /// Id of the message.
    pub guid: Guid,
    /// Gas limit the sender paid for.
    pub gas_limit: u64,
    /// Failed execution attempts.
    pub attempts: u32,
    /// Reason of the last failure. `None` if the message waits behind an earlier one.
    pub last_error: Option<String>,
}

/// Status of one inbound channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    /// Chain of the receiving endpoint.
    pub chain: ChainId,
    /// The channel.
    pub channel: ChannelKey,
    /// Every nonce up to this one is executed or skipped.
    pub inbound_nonce: Nonce,
    /// Every nonce up to this one is at least verified.
    pub verified_nonce: Nonce,
    /// Verified messages awaiting execution.
    pub stuck: Vec<StuckMessage>,
    /// Nonces given up on by the receiver's owner.
    pub skipped: Vec<Nonce>,
}

impl ChannelReport {
    fn new(chain: ChainId, channel: ChannelKey, state: &Channel) -> Self {
        Self {
            chain,
            channel,
            inbound_nonce: state.inbound_nonce(),
            verified_nonce: state.verified_nonce(),
            stuck: state
                .pending_messages()
                .map(|(nonce, pending)| StuckMessage {
                    nonce,
                    guid: pending.guid,
                    gas_limit: pending.gas_limit,
                    attempts: pending.attempts,
                    last_error: pending.last_error.clone(),
                })
                .collect(),
            skipped: state.skipped().collect(),
        }
    }

    /// Whether every verified message on the channel has executed.
    pub fn is_drained(&self) -> bool {
        self.stuck.is_empty()
    }
}

/// A packet dropped at verification because it did not come from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionEntry {
    /// Chain of the endpoint that dropped the packet.
    pub chain: ChainId,
    /// The rejection.
    #[serde(flatten)]
    pub rejection: PeerRejection,
}

/// Health of the whole network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkReport {
    /// One entry per inbound channel on every endpoint.
    pub channels: Vec<ChannelReport>,
    /// Packets dropped at verification.
    pub peer_rejections: Vec<RejectionEntry>,
    /// Packets on the bus.
    pub in_flight: usize,
    /// Packets held back on the bus.
    pub held: usize,
    /// Signals emitted so far.
    pub signals: Vec<Signal>,
    /// Hub duties that could not be sent.
    pub dispatch_failures: Vec<DispatchFailure>,
}

impl NetworkReport {
    /// Messages that are verified but not executed, on any channel.
    pub fn stuck(&self) -> impl Iterator<Item = (&ChannelReport, &StuckMessage)> + '_ {
        self.channels
            .iter()
            .flat_map(|report| report.stuck.iter().map(move |msg| (report, msg)))
    }
}

/// Everything there is to know about the network at one point in time.
#[derive(Debug, Serialize)]
pub struct NetworkSnapshot<'a> {
    /// The Hub controller.
    pub hub: &'a HubSM,
    /// The Gateway controllers by chain.
    pub gateways: BTreeMap<ChainId, &'a GatewaySM>,
    /// Channel status and logs.
    pub report: NetworkReport,
}

impl<B: MessageBus> Network<B> {
    /// Status of `channel` on the endpoint of `chain`, if anything was ever verified on it.
    pub fn channel_report(
        &self,
        chain: ChainId,
        channel: &ChannelKey,
    ) -> OrchestratorResult<Option<ChannelReport>> {
        let endpoint = self.endpoint(chain)?;

        Ok(endpoint
            .channel(channel)
            .map(|state| ChannelReport::new(chain, *channel, state)))
    }

    /// Status of every channel, the rejection log and the bus.
    pub fn report(&self) -> NetworkReport {
        let endpoints = std::iter::once((self.hub_chain(), &self.hub.endpoint)).chain(
            self.gateways
                .iter()
                .map(|(chain, node)| (*chain, &node.endpoint)),
        );

        let mut channels = Vec::new();
        let mut peer_rejections = Vec::new();
        for (chain, endpoint) in endpoints {
            channels.extend(channel_reports(chain, endpoint));
            peer_rejections.extend(endpoint.peer_rejections().iter().map(|rejection| {
                RejectionEntry {
                    chain,
                    rejection: rejection.clone(),
                }
            }));
        }

        NetworkReport {
            channels,
            peer_rejections,
            in_flight: self.bus.len(),
            held: self.bus.held().len(),
            signals: self.signals.clone(),
            dispatch_failures: self.dispatch_failures.clone(),
        }
    }

    /// Captures the controllers together with the report.
    pub fn snapshot(&self) -> NetworkSnapshot<'_> {
        NetworkSnapshot {
            hub: &self.hub.sm,
            gateways: self
                .gateways
                .iter()
                .map(|(chain, node)| (*chain, &node.sm))
                .collect(),
            report: self.report(),
        }
    }

    /// The snapshot as pretty-printed JSON.
    pub fn snapshot_json(&self) -> OrchestratorResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

fn channel_reports(chain: ChainId, endpoint: &Endpoint) -> impl Iterator<Item = ChannelReport> + '_ {
    endpoint
        .channels()
        .map(move |(key, state)| ChannelReport::new(chain, *key, state))
}
