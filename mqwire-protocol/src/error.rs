//! Decode and encode error types.

use crate::constants::{Command, PropertyId};
use std::fmt;
use thiserror::Error;

/// Broad classification of a codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid header flags, QoS bits, or variable byte integer termination.
    MalformedFrame,
    /// A length-prefixed field runs past the declared remaining length.
    TruncatedInput,
    /// Disallowed reason code, reserved bits, empty required list.
    ProtocolViolation,
    /// Unknown command or property identifier.
    UnknownField,
    /// Numeric field outside its permitted range.
    OutOfRange,
    /// Encoder rejected application-supplied data.
    Validation,
    /// Underlying writer failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedFrame => write!(f, "MALFORMED_FRAME"),
            ErrorKind::TruncatedInput => write!(f, "TRUNCATED_INPUT"),
            ErrorKind::ProtocolViolation => write!(f, "PROTOCOL_VIOLATION"),
            ErrorKind::UnknownField => write!(f, "UNKNOWN_FIELD"),
            ErrorKind::OutOfRange => write!(f, "OUT_OF_RANGE"),
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Io => write!(f, "IO"),
        }
    }
}

/// Errors raised by the decoder. One is reported per malformed packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Not supported packet type: {0}")]
    UnsupportedCommand(u8),

    #[error("Invalid header flag bits, must be {expected:#x} for {command} packet")]
    InvalidHeaderFlags { command: Command, expected: u8 },

    #[error("Packet must not have both QoS bits set to 1")]
    InvalidQos,

    #[error("Invalid variable byte integer")]
    InvalidVarInt,

    #[error("Cannot parse {0}")]
    Truncated(&'static str),

    #[error("Packet too short")]
    PacketTooShort,

    #[error("Invalid protocolId")]
    InvalidProtocolId(String),

    #[error("Invalid protocol version")]
    InvalidProtocolVersion(u8),

    #[error("Invalid UTF-8 string")]
    InvalidUtf8,

    #[error("{0}")]
    Malformed(&'static str),

    #[error("{0}")]
    OutOfRange(&'static str),

    #[error("Invalid {command} reason code")]
    InvalidReasonCode { command: Command, code: u8 },

    #[error("Unknown property: {0}")]
    UnknownProperty(u8),

    #[error("Property {property} not allowed in {context} properties")]
    PropertyNotAllowed {
        property: PropertyId,
        context: &'static str,
    },
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::UnsupportedCommand(_) | DecodeError::UnknownProperty(_) => {
                ErrorKind::UnknownField
            }
            DecodeError::InvalidHeaderFlags { .. }
            | DecodeError::InvalidQos
            | DecodeError::InvalidVarInt
            | DecodeError::InvalidUtf8 => ErrorKind::MalformedFrame,
            DecodeError::Truncated(_) | DecodeError::PacketTooShort => ErrorKind::TruncatedInput,
            DecodeError::InvalidProtocolVersion(_) | DecodeError::OutOfRange(_) => {
                ErrorKind::OutOfRange
            }
            DecodeError::InvalidProtocolId(_)
            | DecodeError::Malformed(_)
            | DecodeError::InvalidReasonCode { .. }
            | DecodeError::PropertyNotAllowed { .. } => ErrorKind::ProtocolViolation,
        }
    }
}

/// Errors raised by the encoder before (or while) writing a packet.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{0}")]
    Invalid(&'static str),

    #[error("Invalid {command} reason code: {code:#04x}")]
    InvalidReasonCode { command: Command, code: u8 },

    #[error("Invalid property {property} for {context}")]
    PropertyNotAllowed {
        property: PropertyId,
        context: &'static str,
    },

    #[error("Invalid value type for property {0}")]
    PropertyType(PropertyId),

    #[error("{field} too large: {size} (max {max})")]
    TooLarge {
        field: &'static str,
        size: usize,
        max: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::Invalid(_)
            | EncodeError::InvalidReasonCode { .. }
            | EncodeError::PropertyNotAllowed { .. }
            | EncodeError::PropertyType(_) => ErrorKind::Validation,
            EncodeError::TooLarge { .. } => ErrorKind::OutOfRange,
            EncodeError::Io(_) => ErrorKind::Io,
        }
    }
}
