//! Carries packets from the sending endpoints to the relayer.
//!
//! The bus stands in for the verifiers and executors of a real omnichain network. Tests control
//! it directly: they can hold packets back to simulate a verifier that never shows up, release
//! them later, and permute what is in flight to deliver packets out of order.

use std::collections::VecDeque;

use omnibridge_transport::{Guid, Packet};

use crate::errors::{OrchestratorError, OrchestratorResult};

/// A queue of in-flight packets.
pub trait MessageBus {
    /// Puts a packet at the end of the queue.
    fn publish(&mut self, packet: Packet);

    /// Takes the next packet to deliver.
    fn next_packet(&mut self) -> Option<Packet>;

    /// Packets waiting for delivery, in delivery order.
    fn in_flight(&self) -> Vec<&Packet>;

    /// Takes the packet `guid` out of the queue until it is released.
    ///
    /// Returns whether the packet was in flight.
    fn hold(&mut self, guid: &Guid) -> bool;

    /// Puts a held packet back at the end of the queue.
    ///
    /// Returns whether the packet was held.
    fn release(&mut self, guid: &Guid) -> bool;

    /// Packets currently held back.
    fn held(&self) -> Vec<&Packet>;

    /// Reorders the in-flight packets: the packet at position `order[i]` moves to position `i`.
    fn reorder(&mut self, order: &[usize]) -> OrchestratorResult<()>;

    /// Number of packets waiting for delivery.
    fn len(&self) -> usize {
        self.in_flight().len()
    }

    /// Whether nothing waits for delivery.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A FIFO bus kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBus {
    queue: VecDeque<Packet>,
    held: Vec<Packet>,
}

impl InMemoryBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageBus for InMemoryBus {
    fn publish(&mut self, packet: Packet) {
        self.queue.push_back(packet);
    }

    fn next_packet(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    fn in_flight(&self) -> Vec<&Packet> {
        self.queue.iter().collect()
    }

    fn hold(&mut self, guid: &Guid) -> bool {
        let Some(position) = self.queue.iter().position(|packet| packet.guid == *guid) else {
            return false;
        };

        if let Some(packet) = self.queue.remove(position) {
            self.held.push(packet);
        }
        true
    }

    fn release(&mut self, guid: &Guid) -> bool {
        let Some(position) = self.held.iter().position(|packet| packet.guid == *guid) else {
            return false;
        };

        let packet = self.held.remove(position);
        self.queue.push_back(packet);
        true
    }

    fn held(&self) -> Vec<&Packet> {
        self.held.iter().collect()
    }

    fn reorder(&mut self, order: &[usize]) -> OrchestratorResult<()> {
        let len = self.queue.len();
        let mut seen = vec![false; len];
        let valid = order.len() == len
            && order
                .iter()
                .all(|&i| i < len && !std::mem::replace(&mut seen[i], true));
        if !valid {
            return Err(OrchestratorError::InvalidPermutation {
                len,
                order: order.to_vec(),
            });
        }

        let mut slots: Vec<Option<Packet>> = self.queue.drain(..).map(Some).collect();
        self.queue = order.iter().filter_map(|&i| slots[i].take()).collect();

        Ok(())
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use omnibridge_primitives::types::{Address, Nonce};
    use omnibridge_transport::Origin;
    use proptest::prelude::*;

    use super::*;

    fn packet(nonce: Nonce) -> Packet {
        let sender = Address::from_low_u64_be(1);
        let receiver = Address::from_low_u64_be(2);
        Packet {
            origin: Origin {
                src_chain: 10,
                sender,
                nonce,
            },
            dst_chain: 1,
            receiver,
            guid: Guid::derive(nonce, 10, &sender, 1, &receiver),
            message: vec![nonce as u8],
            gas_limit: 200_000,
        }
    }

    fn nonces(bus: &InMemoryBus) -> Vec<Nonce> {
        bus.in_flight()
            .iter()
            .map(|packet| packet.origin.nonce)
            .collect()
    }

    #[test]
    fn delivers_in_publish_order() {
        let mut bus = InMemoryBus::new();
        for nonce in 1..=3 {
            bus.publish(packet(nonce));
        }

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.next_packet().map(|p| p.origin.nonce), Some(1));
        assert_eq!(nonces(&bus), vec![2, 3]);
    }

    #[test]
    fn held_packets_return_at_the_end() {
        let mut bus = InMemoryBus::new();
        for nonce in 1..=3 {
            bus.publish(packet(nonce));
        }

        assert!(bus.hold(&packet(1).guid));
        assert!(!bus.hold(&packet(1).guid));
        assert_eq!(nonces(&bus), vec![2, 3]);
        assert_eq!(bus.held().len(), 1);

        assert!(bus.release(&packet(1).guid));
        assert!(!bus.release(&packet(1).guid));
        assert_eq!(nonces(&bus), vec![2, 3, 1]);
        assert!(bus.held().is_empty());
    }

    #[test]
    fn reorder_rejects_non_permutations() {
        let mut bus = InMemoryBus::new();
        for nonce in 1..=3 {
            bus.publish(packet(nonce));
        }

        assert!(bus.reorder(&[0, 1]).is_err());
        assert!(bus.reorder(&[0, 0, 1]).is_err());
        assert!(bus.reorder(&[0, 1, 3]).is_err());
        assert_eq!(nonces(&bus), vec![1, 2, 3]);

        bus.reorder(&[2, 0, 1]).unwrap();
        assert_eq!(nonces(&bus), vec![3, 1, 2]);
    }

    proptest! {
        #[test]
        fn reorder_keeps_every_packet(order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle()) {
            let mut bus = InMemoryBus::new();
            for nonce in 1..=6 {
                bus.publish(packet(nonce));
            }

            bus.reorder(&order).unwrap();

            let expected: Vec<Nonce> = order.iter().map(|&i| i as Nonce + 1).collect();
            prop_assert_eq!(nonces(&bus), expected);
        }
    }
}
