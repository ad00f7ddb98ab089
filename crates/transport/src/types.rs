//! Identifiers and envelopes used by the transport.

use std::fmt;

use omnibridge_primitives::{
    types::{Address, ChainId, Nonce},
    U256,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

macro_rules! hash_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Returns the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // short form is enough to tell entries apart in logs
                write!(f, "{}({}..)", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(&s), &mut bytes)
                    .map_err(serde::de::Error::custom)?;
                Ok(Self(bytes))
            }
        }
    };
}

hash_newtype!(
    /// Globally unique identifier of a sent message.
    Guid
);

hash_newtype!(
    /// Commitment to a message's guid and payload that an endpoint stores on verification.
    PayloadHash
);

impl Guid {
    /// Derives the guid of the message sent on `path` with `nonce`.
    pub fn derive(
        nonce: Nonce,
        src_chain: ChainId,
        sender: &Address,
        dst_chain: ChainId,
        receiver: &Address,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce.to_be_bytes());
        hasher.update(src_chain.to_be_bytes());
        hasher.update(sender.as_bytes());
        hasher.update(dst_chain.to_be_bytes());
        hasher.update(receiver.as_bytes());

        Self(hasher.finalize().into())
    }
}

impl PayloadHash {
    /// Hashes the guid together with the payload.
    pub fn compute(guid: &Guid, message: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(guid.as_bytes());
        hasher.update(message);

        Self(hasher.finalize().into())
    }
}

/// Where an inbound message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Origin {
    /// Chain the message was sent from.
    pub src_chain: ChainId,

    /// Application that sent it.
    pub sender: Address,

    /// Position of the message in its channel.
    pub nonce: Nonce,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.sender, self.src_chain, self.nonce)
    }
}

/// Identifies an inbound channel on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    /// Local application receiving the messages.
    pub receiver: Address,

    /// Chain the messages come from.
    pub src_chain: ChainId,

    /// Remote application sending the messages.
    pub sender: Address,
}

impl ChannelKey {
    /// The channel an origin's messages arrive on at `receiver`.
    pub const fn of(receiver: Address, origin: &Origin) -> Self {
        Self {
            receiver,
            src_chain: origin.src_chain,
            sender: origin.sender,
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} -> {}", self.sender, self.src_chain, self.receiver)
    }
}

/// A message in flight between two endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Where the message comes from.
    pub origin: Origin,

    /// Destination chain.
    pub dst_chain: ChainId,

    /// Destination application.
    pub receiver: Address,

    /// Unique id of the message.
    pub guid: Guid,

    /// Encoded payload.
    #[serde(with = "hex::serde")]
    pub message: Vec<u8>,

    /// Gas the sender paid for on the destination.
    pub gas_limit: u64,
}

impl Packet {
    /// The inbound channel this packet is delivered on.
    pub const fn channel(&self) -> ChannelKey {
        ChannelKey::of(self.receiver, &self.origin)
    }

    /// Payload hash the destination endpoint records on verification.
    pub fn payload_hash(&self) -> PayloadHash {
        PayloadHash::compute(&self.guid, &self.message)
    }
}

/// Per-message execution options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Gas to buy for execution on the destination. The endpoint default applies when unset.
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

impl SendOptions {
    /// Options with an explicit gas limit.
    pub const fn with_gas_limit(gas_limit: u64) -> Self {
        Self {
            gas_limit: Some(gas_limit),
        }
    }
}

/// Quoted price of sending a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingFee {
    /// Fee in the source chain's native currency.
    #[serde(with = "ethnum::serde::permissive")]
    pub native_fee: U256,
}

/// Proof that a message was accepted by the source endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagingReceipt {
    /// Id of the sent message.
    pub guid: Guid,

    /// Outbound nonce assigned to the message.
    pub nonce: Nonce,

    /// Fee actually charged. Any excess payment is refunded.
    #[serde(with = "ethnum::serde::permissive")]
    pub fee: U256,
}
