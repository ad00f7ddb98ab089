//! Moves packets from the source endpoints to their destinations.
//!
//! A packet taken off the bus is first verified on its destination endpoint. Verification only
//! records the payload hash; execution then runs every consecutive verified nonce of the channel,
//! starting at the channel's next nonce. A packet that arrives early therefore waits until the gap
//! in front of it is filled, and a packet that fails to execute blocks its channel until it is
//! retried, skipped or cleared.

use omnibridge_primitives::types::{Address, ChainId, Nonce};
use omnibridge_sm::{
    mailbox::{Application, Mailbox},
    signals::Signal,
    state_machine::SMOutput,
};
use omnibridge_transport::{
    ChannelKey, Delivery, Endpoint, ExecuteError, Guid, NonceState, Origin, Packet, Verification,
};
use omnibridge_wire::WireError;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    bus::MessageBus,
    duty_dispatcher::gateway_duties,
    errors::{OrchestratorError, OrchestratorResult},
    network::Network,
    node_types::UnifiedDuty,
};

/// A message that could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionFailure {
    /// Nonce of the failed message.
    pub nonce: Nonce,
    /// Why it failed.
    pub reason: String,
    /// Whether the message may go through later without an owner skipping it.
    pub retryable: bool,
}

/// Messages executed on a channel in one go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Chain of the receiving endpoint.
    pub dst_chain: ChainId,
    /// The inbound channel.
    pub channel: ChannelKey,
    /// Executed nonces, in order.
    pub executed: Vec<Nonce>,
    /// The message that stopped execution, if any.
    pub failure: Option<ExecutionFailure>,
}

impl DeliveryReport {
    const fn new(dst_chain: ChainId, channel: ChannelKey) -> Self {
        Self {
            dst_chain,
            channel,
            executed: Vec::new(),
            failure: None,
        }
    }
}

/// What happened to a packet taken off the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelayOutcome {
    /// The packet is verified on its destination. Execution of its channel was attempted.
    Delivered {
        /// Nonce of the relayed packet.
        nonce: Nonce,
        /// What ran on the channel as a result.
        report: DeliveryReport,
    },

    /// The nonce was already executed or skipped; the packet is a duplicate.
    AlreadyFinal {
        /// The inbound channel.
        channel: ChannelKey,
        /// Nonce of the packet.
        nonce: Nonce,
        /// State of the nonce.
        state: NonceState,
    },

    /// The sender is not a peer of the receiver; the packet was dropped.
    PeerRejected {
        /// The inbound channel.
        channel: ChannelKey,
        /// Nonce of the packet.
        nonce: Nonce,
    },
}

impl<B: MessageBus> Network<B> {
    /// Moves every sent packet from the endpoints' outboxes onto the bus. Returns how many moved.
    pub fn collect(&mut self) -> usize {
        let mut packets = self.hub.endpoint.drain_outbox();
        for node in self.gateways.values_mut() {
            packets.extend(node.endpoint.drain_outbox());
        }

        let count = packets.len();
        for packet in packets {
            debug!(guid = %packet.guid, src = packet.origin.src_chain, dst = packet.dst_chain, nonce = packet.origin.nonce, "packet in flight");
            self.bus.publish(packet);
        }

        count
    }

    /// Relays the next packet on the bus. Returns `None` once nothing is in flight.
    ///
    /// Execution failures are part of the outcome; only failures of the relay itself, such as a
    /// packet for a chain without a node, are errors.
    pub fn relay_next(&mut self) -> OrchestratorResult<Option<RelayOutcome>> {
        self.collect();
        let Some(packet) = self.bus.next_packet() else {
            return Ok(None);
        };

        let dst_chain = packet.dst_chain;
        let channel = packet.channel();
        let nonce = packet.origin.nonce;

        let outcome = match self.verify_packet(&packet)? {
            Verification::PeerRejected => RelayOutcome::PeerRejected { channel, nonce },
            Verification::AlreadyFinal(state) => RelayOutcome::AlreadyFinal {
                channel,
                nonce,
                state,
            },
            Verification::Verified | Verification::AlreadyVerified => {
                self.verified.insert((dst_chain, channel, nonce), packet);
                let report = self.execute_ready(dst_chain, channel)?;

                RelayOutcome::Delivered { nonce, report }
            }
        };

        Ok(Some(outcome))
    }

    /// Relays until nothing is in flight, including the packets sent while relaying. Held packets
    /// stay held.
    pub fn relay_all(&mut self) -> OrchestratorResult<Vec<RelayOutcome>> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.relay_next()? {
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Executes the verified message `nonce` on `channel` again, optionally with a higher gas
    /// limit, then drains the channel.
    ///
    /// A message that already ran yields [`Delivery::AlreadyExecuted`]. A failure of the retried
    /// message itself is returned as an error and leaves it pending.
    pub fn retry(
        &mut self,
        dst_chain: ChainId,
        channel: ChannelKey,
        nonce: Nonce,
        gas_limit: Option<u64>,
    ) -> OrchestratorResult<Delivery<DeliveryReport>> {
        if self.endpoint(dst_chain)?.nonce_state(&channel, nonce) == NonceState::Executed {
            debug!(%channel, %nonce, "retried message had already executed");
            return Ok(Delivery::AlreadyExecuted);
        }
        let packet = self.known_packet(dst_chain, channel, nonce)?;

        match self.execute_packet(&packet, gas_limit)? {
            Delivery::AlreadyExecuted => {
                debug!(%channel, %nonce, "retried message had already executed");
                Ok(Delivery::AlreadyExecuted)
            }
            Delivery::Executed(()) => {
                let mut report = self.execute_ready(dst_chain, channel)?;
                report.executed.insert(0, nonce);

                Ok(Delivery::Executed(report))
            }
        }
    }

    /// Skips the next verified message on `channel` as `caller`, then drains the channel.
    pub fn skip(
        &mut self,
        caller: &Address,
        dst_chain: ChainId,
        channel: ChannelKey,
        nonce: Nonce,
    ) -> OrchestratorResult<DeliveryReport> {
        let origin = Origin {
            src_chain: channel.src_chain,
            sender: channel.sender,
            nonce,
        };

        if dst_chain == self.hub_chain() {
            let mailbox = Mailbox::new(&mut self.hub.sm, self.cfg.hub.clone());
            self.hub.endpoint.skip(caller, &mailbox, &origin)?;
        } else {
            let node = self
                .gateways
                .get_mut(&dst_chain)
                .ok_or(OrchestratorError::UnknownChain(dst_chain))?;
            let mailbox = Mailbox::new(&mut node.sm, self.cfg.gateway.clone());
            node.endpoint.skip(caller, &mailbox, &origin)?;
        }

        self.execute_ready(dst_chain, channel)
    }

    /// Marks the next verified message on `channel` as executed without running it, as `caller`,
    /// then drains the channel.
    pub fn clear(
        &mut self,
        caller: &Address,
        dst_chain: ChainId,
        channel: ChannelKey,
        nonce: Nonce,
    ) -> OrchestratorResult<DeliveryReport> {
        let packet = self.known_packet(dst_chain, channel, nonce)?;

        if dst_chain == self.hub_chain() {
            let mailbox = Mailbox::new(&mut self.hub.sm, self.cfg.hub.clone());
            self.hub.endpoint.clear(caller, &mailbox, &packet)?;
        } else {
            let node = self
                .gateways
                .get_mut(&dst_chain)
                .ok_or(OrchestratorError::UnknownChain(dst_chain))?;
            let mailbox = Mailbox::new(&mut node.sm, self.cfg.gateway.clone());
            node.endpoint.clear(caller, &mailbox, &packet)?;
        }

        self.execute_ready(dst_chain, channel)
    }

    /// Holds back the next packet on the bus. Returns its guid, or `None` if nothing is in flight.
    pub fn hold_next(&mut self) -> Option<Guid> {
        self.collect();
        let guid = self.bus.in_flight().first().map(|packet| packet.guid)?;
        self.bus.hold(&guid).then_some(guid)
    }

    /// Puts every held packet back on the bus. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let held: Vec<Guid> = self.bus.held().iter().map(|packet| packet.guid).collect();
        held.iter().filter(|guid| self.bus.release(guid)).count()
    }

    fn known_packet(
        &self,
        dst_chain: ChainId,
        channel: ChannelKey,
        nonce: Nonce,
    ) -> OrchestratorResult<Packet> {
        self.verified
            .get(&(dst_chain, channel, nonce))
            .cloned()
            .ok_or(OrchestratorError::UnknownPacket { channel, nonce })
    }

    fn verify_packet(&mut self, packet: &Packet) -> OrchestratorResult<Verification> {
        let dst_chain = packet.dst_chain;
        if dst_chain == self.hub_chain() {
            let mailbox = Mailbox::new(&mut self.hub.sm, self.cfg.hub.clone());
            return Ok(self.hub.endpoint.verify(packet, &mailbox)?);
        }

        let node = self
            .gateways
            .get_mut(&dst_chain)
            .ok_or(OrchestratorError::UnknownChain(dst_chain))?;
        let mailbox = Mailbox::new(&mut node.sm, self.cfg.gateway.clone());

        Ok(node.endpoint.verify(packet, &mailbox)?)
    }

    /// Runs the channel's next nonces for as long as they are verified and known.
    fn execute_ready(
        &mut self,
        dst_chain: ChainId,
        channel: ChannelKey,
    ) -> OrchestratorResult<DeliveryReport> {
        let mut report = DeliveryReport::new(dst_chain, channel);

        loop {
            let endpoint = self.endpoint(dst_chain)?;
            let Some(next) = endpoint.channel(&channel).map(|ch| ch.next_nonce()) else {
                break;
            };
            if endpoint.nonce_state(&channel, next) != NonceState::Verified {
                break;
            }
            let Some(packet) = self.verified.get(&(dst_chain, channel, next)).cloned() else {
                break;
            };

            match self.execute_packet(&packet, None) {
                Ok(_) => report.executed.push(next),
                Err(err) => {
                    warn!(%channel, nonce = next, %err, "message is stuck");
                    report.failure = Some(ExecutionFailure {
                        nonce: next,
                        retryable: err.is_retryable(),
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }

        self.prune_final(dst_chain, channel)?;
        Ok(report)
    }

    /// Forgets the packets of `channel` whose nonces are executed or skipped.
    fn prune_final(&mut self, dst_chain: ChainId, channel: ChannelKey) -> OrchestratorResult<()> {
        let Some(next) = self
            .endpoint(dst_chain)?
            .channel(&channel)
            .map(|ch| ch.next_nonce())
        else {
            return Ok(());
        };

        self.verified.retain(|(chain, key, nonce), _| {
            *chain != dst_chain || *key != channel || *nonce >= next
        });
        Ok(())
    }

    /// Executes a single packet and hands the controller's output on.
    fn execute_packet(
        &mut self,
        packet: &Packet,
        gas_limit: Option<u64>,
    ) -> OrchestratorResult<Delivery<()>> {
        let dst_chain = packet.dst_chain;

        if dst_chain == self.hub_chain() {
            let delivery = deliver(
                &mut self.hub.endpoint,
                &mut self.hub.sm,
                self.cfg.hub.clone(),
                packet,
                gas_limit,
            )
            .map_err(OrchestratorError::from_hub_execution)?;

            let Delivery::Executed(output) = delivery else {
                return Ok(Delivery::AlreadyExecuted);
            };
            self.record_signals(output.signals);
            for duty in output.duties {
                self.dispatch_duty(UnifiedDuty::Hub(duty));
            }

            return Ok(Delivery::Executed(()));
        }

        let node = self
            .gateways
            .get_mut(&dst_chain)
            .ok_or(OrchestratorError::UnknownChain(dst_chain))?;
        let delivery = deliver(
            &mut node.endpoint,
            &mut node.sm,
            self.cfg.gateway.clone(),
            packet,
            gas_limit,
        )
        .map_err(|err| OrchestratorError::from_gateway_execution(dst_chain, err))?;

        let Delivery::Executed(output) = delivery else {
            return Ok(Delivery::AlreadyExecuted);
        };
        self.record_signals(output.signals);
        for duty in gateway_duties(output.duties) {
            self.dispatch_duty(duty);
        }

        Ok(Delivery::Executed(()))
    }

    fn record_signals<S: Into<Signal>>(&mut self, signals: Vec<S>) {
        for signal in signals {
            let signal = signal.into();
            info!(%signal, "signal emitted");
            self.signals.push(signal);
        }
    }
}

fn deliver<SM>(
    endpoint: &mut Endpoint,
    sm: &mut SM,
    cfg: SM::Config,
    packet: &Packet,
    gas_limit: Option<u64>,
) -> Result<Delivery<SMOutput<SM::Duty, SM::OutgoingSignal>>, ExecuteError<SM::Error>>
where
    SM: Application,
    SM::Config: Clone,
    SM::Error: From<WireError> + std::error::Error,
{
    let mut mailbox = Mailbox::new(sm, cfg);
    endpoint.execute(packet, gas_limit, &mut mailbox)
}
