//! Fixed header of an MQTT packet.
//!
//! Packet layout:
//!
//! ```text
//! +---------+---------------------+---------------------------+
//! | header  | remaining length    | variable header + payload |
//! | 1 byte  | 1-4 bytes (varint)  | remaining length bytes    |
//! +---------+---------------------+---------------------------+
//!
//! header byte:  7 6 5 4 | 3   | 2 1 | 0
//!               command | dup | qos | retain
//! ```

use crate::constants::{
    Command, CMD_MASK, CMD_SHIFT, DUP_MASK, FLAGS_MASK, QOS_MASK, QOS_SHIFT, RETAIN_MASK,
};
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};

/// Quality of service level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
#[allow(clippy::enum_variant_names)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(DecodeError::InvalidQos),
        }
    }
}

impl From<QoS> for u8 {
    fn from(qos: QoS) -> u8 {
        qos as u8
    }
}

const fn build_header_table() -> [[[[u8; 2]; 2]; 3]; 16] {
    let mut table = [[[[0u8; 2]; 2]; 3]; 16];
    let mut cmd = 0;
    while cmd < 16 {
        let mut qos = 0;
        while qos < 3 {
            let mut dup = 0;
            while dup < 2 {
                let mut retain = 0;
                while retain < 2 {
                    let dup_bit = if dup == 1 { DUP_MASK } else { 0 };
                    table[cmd][qos][dup][retain] = ((cmd as u8) << CMD_SHIFT)
                        | dup_bit
                        | ((qos as u8) << QOS_SHIFT)
                        | retain as u8;
                    retain += 1;
                }
                dup += 1;
            }
            qos += 1;
        }
        cmd += 1;
    }
    table
}

/// Header bytes for every command/qos/dup/retain combination.
static HEADER_TABLE: [[[[u8; 2]; 2]; 3]; 16] = build_header_table();

/// Looks up the header byte for the given flags.
pub fn header_byte(command: Command, qos: QoS, dup: bool, retain: bool) -> u8 {
    HEADER_TABLE[command as usize][qos as usize][dup as usize][retain as usize]
}

/// Decoded fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedHeader {
    #[serde(rename = "cmd")]
    pub command: Command,
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
}

impl FixedHeader {
    /// Header with the flag bits the protocol fixes for `command`.
    ///
    /// For publish this is qos 0 without dup or retain.
    pub fn new(command: Command) -> Self {
        let flags = command.required_flags().unwrap_or(0);
        Self {
            command,
            dup: flags & DUP_MASK != 0,
            qos: match (flags >> QOS_SHIFT) & QOS_MASK {
                1 => QoS::AtLeastOnce,
                2 => QoS::ExactlyOnce,
                _ => QoS::AtMostOnce,
            },
            retain: flags & RETAIN_MASK != 0,
        }
    }

    pub fn publish(qos: QoS, dup: bool, retain: bool) -> Self {
        Self {
            command: Command::Publish,
            dup,
            qos,
            retain,
        }
    }

    /// Parses and validates the first byte of a packet.
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        let command = Command::try_from((byte & CMD_MASK) >> CMD_SHIFT)?;
        let flags = byte & FLAGS_MASK;

        if let Some(expected) = command.required_flags() {
            if flags != expected {
                return Err(DecodeError::InvalidHeaderFlags { command, expected });
            }
        }

        let qos = QoS::try_from((byte >> QOS_SHIFT) & QOS_MASK)?;

        Ok(Self {
            command,
            dup: byte & DUP_MASK != 0,
            qos,
            retain: byte & RETAIN_MASK != 0,
        })
    }

    pub fn to_byte(&self) -> u8 {
        header_byte(self.command, self.qos, self.dup, self.retain)
    }
}
