//! Per-command parsers for the variable header and payload.
//!
//! Each parser receives exactly `remaining length` bytes, so nothing here
//! ever waits for more input: a field that runs past the end of the packet
//! is an error.

use crate::codec::Settings;
use crate::constants::{
    self, command_scope, is_supported_version, lookup, Command, BRIDGE_MODE_FLAG,
    CLEAN_SESSION_MASK, CONNECT_RESERVED_MASK, PASSWORD_MASK, PROTOCOL_ID_V3, PROTOCOL_ID_V4,
    SESSIONPRESENT_MASK, SUBSCRIBE_OPTIONS_NL_MASK, SUBSCRIBE_OPTIONS_NL_SHIFT,
    SUBSCRIBE_OPTIONS_QOS_MASK, SUBSCRIBE_OPTIONS_RAP_MASK, SUBSCRIBE_OPTIONS_RAP_SHIFT,
    SUBSCRIBE_OPTIONS_RH_MASK, SUBSCRIBE_OPTIONS_RH_SHIFT, SUBSCRIBE_RESERVED_V4_MASK,
    SUBSCRIBE_RESERVED_V5_MASK, USERNAME_MASK, WILL_FLAG_MASK, WILL_QOS_MASK, WILL_QOS_SHIFT,
    WILL_RETAIN_MASK, WILL_SCOPE,
};
use crate::error::DecodeError;
use crate::frame::{FixedHeader, QoS};
use crate::message::{
    Ack, Auth, Connack, Connect, Disconnect, LastWill, Packet, Publish, Suback, Subscribe,
    Subscription, Unsuback, Unsubscribe,
};
use crate::properties::Properties;
use crate::varint;
use bytes::{Buf, Bytes};

/// Bounded cursor over the body of one packet.
pub(crate) struct Reader {
    buf: Bytes,
}

impl Reader {
    pub(crate) fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub(crate) fn read_u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        if self.buf.remaining() < 1 {
            return Err(DecodeError::Truncated(field));
        }
        Ok(self.buf.get_u8())
    }

    pub(crate) fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        if self.buf.remaining() < 2 {
            return Err(DecodeError::Truncated(field));
        }
        Ok(self.buf.get_u16())
    }

    pub(crate) fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        if self.buf.remaining() < 4 {
            return Err(DecodeError::Truncated(field));
        }
        Ok(self.buf.get_u32())
    }

    pub(crate) fn read_varint(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        match varint::decode(&self.buf)? {
            Some((value, consumed)) => {
                self.buf.advance(consumed);
                Ok(value)
            }
            None => Err(DecodeError::Truncated(field)),
        }
    }

    /// Splits off the next `len` bytes as their own reader.
    pub(crate) fn take(&mut self, len: usize, field: &'static str) -> Result<Reader, DecodeError> {
        if self.buf.remaining() < len {
            return Err(DecodeError::Truncated(field));
        }
        Ok(Reader::new(self.buf.split_to(len)))
    }

    /// Two-byte length prefixed bytes.
    pub(crate) fn read_binary(&mut self, field: &'static str) -> Result<Bytes, DecodeError> {
        let len = self.read_u16(field)? as usize;
        if self.buf.remaining() < len {
            return Err(DecodeError::Truncated(field));
        }
        Ok(self.buf.split_to(len))
    }

    /// Two-byte length prefixed UTF-8 string.
    pub(crate) fn read_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let bytes = self.read_binary(field)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Everything left in the packet.
    pub(crate) fn rest(&mut self) -> Bytes {
        self.buf.split_off(0)
    }
}

/// Parses the body of a packet whose header has already been validated.
pub(crate) fn parse_packet(
    header: &FixedHeader,
    body: Bytes,
    settings: &Settings,
) -> Result<Packet, DecodeError> {
    let mut reader = Reader::new(body);
    let version = settings.protocol_version;

    match header.command {
        Command::Connect => parse_connect(&mut reader).map(Packet::Connect),
        Command::Connack => parse_connack(&mut reader, version).map(Packet::Connack),
        Command::Publish => parse_publish(&mut reader, header, version).map(Packet::Publish),
        Command::Puback => parse_ack(&mut reader, Command::Puback, version).map(Packet::Puback),
        Command::Pubrec => parse_ack(&mut reader, Command::Pubrec, version).map(Packet::Pubrec),
        Command::Pubrel => parse_ack(&mut reader, Command::Pubrel, version).map(Packet::Pubrel),
        Command::Pubcomp => {
            parse_ack(&mut reader, Command::Pubcomp, version).map(Packet::Pubcomp)
        }
        Command::Subscribe => parse_subscribe(&mut reader, settings).map(Packet::Subscribe),
        Command::Suback => parse_suback(&mut reader, version).map(Packet::Suback),
        Command::Unsubscribe => parse_unsubscribe(&mut reader, version).map(Packet::Unsubscribe),
        Command::Unsuback => parse_unsuback(&mut reader, version).map(Packet::Unsuback),
        Command::Pingreq => Ok(Packet::Pingreq),
        Command::Pingresp => Ok(Packet::Pingresp),
        Command::Disconnect => parse_disconnect(&mut reader, version).map(Packet::Disconnect),
        Command::Auth => parse_auth(&mut reader, version).map(Packet::Auth),
    }
}

fn too_short(_: DecodeError) -> DecodeError {
    DecodeError::PacketTooShort
}

fn read_properties(reader: &mut Reader, command: Command) -> Result<Properties, DecodeError> {
    Properties::decode(reader, command_scope(command), command.name())
}

fn check_reason(command: Command, code: u8) -> Result<u8, DecodeError> {
    let known = constants::reason_table(command)
        .map(|table| lookup(table, code).is_some())
        .unwrap_or(true);
    if known {
        Ok(code)
    } else {
        Err(DecodeError::InvalidReasonCode { command, code })
    }
}

fn parse_connect(reader: &mut Reader) -> Result<Connect, DecodeError> {
    let protocol_id = reader.read_string("protocolId")?;
    if protocol_id != PROTOCOL_ID_V4 && protocol_id != PROTOCOL_ID_V3 {
        return Err(DecodeError::InvalidProtocolId(protocol_id));
    }

    let mut protocol_version = reader.read_u8("protocol version").map_err(too_short)?;
    let mut bridge_mode = false;
    if protocol_version & BRIDGE_MODE_FLAG != 0 {
        bridge_mode = true;
        protocol_version -= BRIDGE_MODE_FLAG;
    }
    if !is_supported_version(protocol_version) {
        return Err(DecodeError::InvalidProtocolVersion(protocol_version));
    }

    let flags = reader.read_u8("connect flags").map_err(too_short)?;
    if flags & CONNECT_RESERVED_MASK != 0 {
        return Err(DecodeError::Malformed(
            "Connect flag bit 0 must be 0, but got 1",
        ));
    }
    let has_will = flags & WILL_FLAG_MASK != 0;
    let will_retain = flags & WILL_RETAIN_MASK != 0;
    let will_qos = (flags & WILL_QOS_MASK) >> WILL_QOS_SHIFT;
    if !has_will {
        if will_retain {
            return Err(DecodeError::Malformed(
                "Will Retain Flag must be set to zero when Will Flag is set to 0",
            ));
        }
        if will_qos != 0 {
            return Err(DecodeError::Malformed(
                "Will QoS must be set to zero when Will Flag is set to 0",
            ));
        }
    }

    let keepalive = reader.read_u16("keepalive").map_err(too_short)?;

    let properties = if protocol_version == 5 {
        read_properties(reader, Command::Connect)?
    } else {
        Properties::default()
    };

    let client_id = reader.read_string("clientId").map_err(|err| match err {
        DecodeError::InvalidUtf8 => err,
        _ => DecodeError::PacketTooShort,
    })?;

    let will = if has_will {
        let properties = if protocol_version == 5 {
            Properties::decode(reader, WILL_SCOPE, "will")?
        } else {
            Properties::default()
        };
        let topic = reader.read_string("will topic")?;
        let payload = reader.read_binary("will payload")?;
        let qos = QoS::try_from(will_qos)
            .map_err(|_| DecodeError::OutOfRange("Invalid will QoS"))?;
        Some(LastWill {
            topic,
            payload,
            qos,
            retain: will_retain,
            properties,
        })
    } else {
        None
    };

    let username = if flags & USERNAME_MASK != 0 {
        Some(reader.read_string("username")?)
    } else {
        None
    };

    let password = if flags & PASSWORD_MASK != 0 {
        Some(reader.read_binary("password")?)
    } else {
        None
    };

    Ok(Connect {
        protocol_id,
        protocol_version,
        bridge_mode,
        clean: flags & CLEAN_SESSION_MASK != 0,
        keepalive,
        client_id,
        will,
        username,
        password,
        properties,
    })
}

fn parse_connack(reader: &mut Reader, version: u8) -> Result<Connack, DecodeError> {
    let flags = reader.read_u8("connack flags").map_err(too_short)?;
    if flags > SESSIONPRESENT_MASK {
        return Err(DecodeError::Malformed(
            "Invalid connack flags, bits 7-1 must be set to 0",
        ));
    }

    let mut connack = Connack {
        session_present: flags & SESSIONPRESENT_MASK != 0,
        ..Default::default()
    };

    if version == 5 {
        if !reader.is_empty() {
            connack.reason_code = check_reason(Command::Connack, reader.read_u8("return code")?)?;
        }
        if !reader.is_empty() {
            connack.properties = read_properties(reader, Command::Connack)?;
        }
    } else {
        connack.reason_code = reader.read_u8("return code")?;
    }

    Ok(connack)
}

fn parse_publish(
    reader: &mut Reader,
    header: &FixedHeader,
    version: u8,
) -> Result<Publish, DecodeError> {
    let topic = reader.read_string("topic")?;

    let message_id = if header.qos != QoS::AtMostOnce {
        Some(reader.read_u16("messageId")?)
    } else {
        None
    };

    let properties = if version == 5 {
        read_properties(reader, Command::Publish)?
    } else {
        Properties::default()
    };

    Ok(Publish {
        topic,
        message_id,
        qos: header.qos,
        dup: header.dup,
        retain: header.retain,
        payload: reader.rest(),
        properties,
    })
}

fn parse_ack(reader: &mut Reader, command: Command, version: u8) -> Result<Ack, DecodeError> {
    let length = reader.remaining();
    let mut ack = Ack::new(reader.read_u16("messageId")?);

    if version == 5 {
        if length > 2 {
            ack.reason_code = check_reason(command, reader.read_u8("reason code")?)?;
        }
        if length > 3 {
            ack.properties = read_properties(reader, command)?;
        }
    }

    Ok(ack)
}

fn parse_subscribe(reader: &mut Reader, settings: &Settings) -> Result<Subscribe, DecodeError> {
    let version = settings.protocol_version;
    let message_id = reader.read_u16("messageId")?;

    let properties = if version == 5 {
        read_properties(reader, Command::Subscribe)?
    } else {
        Properties::default()
    };

    if reader.is_empty() {
        return Err(DecodeError::Malformed(
            "Malformed subscribe, no payload specified",
        ));
    }

    let mut subscriptions = Vec::new();
    while !reader.is_empty() {
        let topic = reader.read_string("topic")?;
        let options = reader
            .read_u8("subscription options")
            .map_err(|_| DecodeError::Malformed("Malformed Subscribe Payload"))?;

        if version == 5 {
            if options & SUBSCRIBE_RESERVED_V5_MASK != 0 {
                return Err(DecodeError::Malformed(
                    "Invalid subscribe topic flag bits, bits 7-6 must be 0",
                ));
            }
        } else if options & SUBSCRIBE_RESERVED_V4_MASK != 0 {
            return Err(DecodeError::Malformed(
                "Invalid subscribe topic flag bits, bits 7-2 must be 0",
            ));
        }

        let qos = QoS::try_from(options & SUBSCRIBE_OPTIONS_QOS_MASK)
            .map_err(|_| DecodeError::OutOfRange("Invalid subscribe QoS, must be <= 2"))?;
        let retain_handling = (options >> SUBSCRIBE_OPTIONS_RH_SHIFT) & SUBSCRIBE_OPTIONS_RH_MASK;
        if retain_handling > 2 {
            return Err(DecodeError::OutOfRange(
                "Invalid retain handling, must be <= 2",
            ));
        }

        let mut subscription = Subscription::new(topic, qos);
        if version == 5 {
            subscription.no_local =
                (options >> SUBSCRIBE_OPTIONS_NL_SHIFT) & SUBSCRIBE_OPTIONS_NL_MASK != 0;
            subscription.retain_as_published =
                (options >> SUBSCRIBE_OPTIONS_RAP_SHIFT) & SUBSCRIBE_OPTIONS_RAP_MASK != 0;
            subscription.retain_handling = retain_handling;
        } else if settings.bridge_mode {
            subscription.no_local = true;
            subscription.retain_as_published = true;
        }
        subscriptions.push(subscription);
    }

    Ok(Subscribe {
        message_id,
        subscriptions,
        properties,
    })
}

fn parse_suback(reader: &mut Reader, version: u8) -> Result<Suback, DecodeError> {
    let message_id = reader.read_u16("messageId")?;

    let properties = if version == 5 {
        read_properties(reader, Command::Suback)?
    } else {
        Properties::default()
    };

    if reader.is_empty() {
        return Err(DecodeError::Malformed(
            "Malformed suback, no payload specified",
        ));
    }

    let mut granted = Vec::with_capacity(reader.remaining());
    while !reader.is_empty() {
        let code = reader.read_u8("granted")?;
        if version == 5 {
            check_reason(Command::Suback, code)?;
        } else if lookup(constants::MQTT4_SUBACK_CODES, code).is_none() {
            return Err(DecodeError::OutOfRange(
                "Invalid suback QoS, must be 0, 1, 2 or 128",
            ));
        }
        granted.push(code);
    }

    Ok(Suback {
        message_id,
        granted,
        properties,
    })
}

fn parse_unsubscribe(reader: &mut Reader, version: u8) -> Result<Unsubscribe, DecodeError> {
    let message_id = reader.read_u16("messageId")?;

    let properties = if version == 5 {
        read_properties(reader, Command::Unsubscribe)?
    } else {
        Properties::default()
    };

    if reader.is_empty() {
        return Err(DecodeError::Malformed(
            "Malformed unsubscribe, no payload specified",
        ));
    }

    let mut unsubscriptions = Vec::new();
    while !reader.is_empty() {
        unsubscriptions.push(reader.read_string("topic")?);
    }

    Ok(Unsubscribe {
        message_id,
        unsubscriptions,
        properties,
    })
}

fn parse_unsuback(reader: &mut Reader, version: u8) -> Result<Unsuback, DecodeError> {
    if version != 5 && reader.remaining() != 2 {
        return Err(DecodeError::Malformed(
            "Malformed unsuback, payload length must be 2",
        ));
    }

    if reader.is_empty() {
        return Err(DecodeError::Malformed(
            "Malformed unsuback, no payload specified",
        ));
    }

    let mut unsuback = Unsuback {
        message_id: reader.read_u16("messageId")?,
        ..Default::default()
    };

    if version == 5 {
        unsuback.properties = read_properties(reader, Command::Unsuback)?;
        while !reader.is_empty() {
            let code = reader.read_u8("granted")?;
            unsuback.granted.push(check_reason(Command::Unsuback, code)?);
        }
    }

    Ok(unsuback)
}

fn parse_disconnect(reader: &mut Reader, version: u8) -> Result<Disconnect, DecodeError> {
    let mut disconnect = Disconnect::default();

    if version == 5 {
        if !reader.is_empty() {
            disconnect.reason_code =
                check_reason(Command::Disconnect, reader.read_u8("disconnect reason code")?)?;
        }
        if !reader.is_empty() {
            disconnect.properties = read_properties(reader, Command::Disconnect)?;
        }
    }

    Ok(disconnect)
}

fn parse_auth(reader: &mut Reader, version: u8) -> Result<Auth, DecodeError> {
    if version != 5 {
        return Err(DecodeError::Malformed(
            "Not supported auth packet for this version MQTT",
        ));
    }

    let mut auth = Auth::default();
    if !reader.is_empty() {
        auth.reason_code = check_reason(Command::Auth, reader.read_u8("auth reason code")?)?;
    }
    if !reader.is_empty() {
        auth.properties = read_properties(reader, Command::Auth)?;
    }

    Ok(auth)
}
