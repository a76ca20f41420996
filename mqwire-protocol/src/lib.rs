//! # mqwire-protocol
//!
//! Streaming MQTT 3.1, 3.1.1 and 5.0 codec.
//!
//! This crate provides:
//! - A resumable decoder that accepts bytes in chunks of any size
//! - An encoder that validates packets before writing them
//! - The MQTT 5 property and reason-code tables
//! - A serde-friendly packet model

pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod message;
pub mod properties;
pub mod sink;
pub mod varint;

mod parse;
mod write;

pub use codec::{Decoder, EncodeOptions, Encoder, Feed, Settings};
pub use config::{CodecConfig, ConfigError};
pub use constants::{
    reason_string, Command, PropertyId, MAX_PROTOCOL_VERSION, MIN_PROTOCOL_VERSION,
};
pub use error::{DecodeError, EncodeError, ErrorKind};
pub use frame::{FixedHeader, QoS};
pub use message::{
    Ack, Auth, Connack, Connect, Disconnect, LastWill, Message, Packet, Publish, Suback,
    Subscribe, Subscription, Unsuback, Unsubscribe,
};
pub use properties::{Properties, PropertyValue, UserProperties};
pub use sink::{IoSink, PacketSink};
