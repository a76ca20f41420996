//! Per-command generators.
//!
//! Every generator first validates the packet and sums the remaining length,
//! then writes the whole frame. Nothing is appended to the output buffer
//! when validation fails.

use crate::codec::EncodeOptions;
use crate::constants::{
    command_scope, is_supported_version, lookup, reason_table, Command, BRIDGE_MODE_FLAG,
    CLEAN_SESSION_MASK, MQTT4_SUBACK_CODES, PASSWORD_MASK, PROTOCOL_ID_V3, PROTOCOL_ID_V4,
    SESSIONPRESENT_MASK, SUBSCRIBE_OPTIONS_NL_SHIFT, SUBSCRIBE_OPTIONS_RAP_SHIFT,
    SUBSCRIBE_OPTIONS_RH_SHIFT, USERNAME_MASK, VARBYTEINT_MAX_BYTES, WILL_FLAG_MASK, WILL_QOS_SHIFT,
    WILL_RETAIN_MASK, WILL_SCOPE,
};
use crate::error::EncodeError;
use crate::frame::{header_byte, FixedHeader, QoS};
use crate::message::{
    Ack, Auth, Connack, Connect, Disconnect, Packet, Publish, Suback, Subscribe, Unsuback,
    Unsubscribe,
};
use crate::properties::Properties;
use crate::varint;
use bytes::{BufMut, BytesMut};

const MAX_FIELD_LEN: usize = u16::MAX as usize;

pub(crate) fn put_varint(buf: &mut BytesMut, value: u32) {
    let mut scratch = [0u8; VARBYTEINT_MAX_BYTES];
    let n = varint::encode_to_slice(value, &mut scratch);
    buf.put_slice(&scratch[..n]);
}

pub(crate) fn put_binary(buf: &mut BytesMut, bytes: &[u8]) {
    buf.put_slice(&(bytes.len() as u16).to_be_bytes());
    buf.put_slice(bytes);
}

pub(crate) fn put_string(buf: &mut BytesMut, s: &str) {
    put_binary(buf, s.as_bytes());
}

/// Rejects fields too long for a two-byte length prefix.
pub(crate) fn check_len(len: usize, field: &'static str) -> Result<(), EncodeError> {
    if len > MAX_FIELD_LEN {
        return Err(EncodeError::TooLarge {
            field,
            size: len,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}

fn prefixed_len(len: usize, field: &'static str) -> Result<usize, EncodeError> {
    check_len(len, field)?;
    Ok(2 + len)
}

/// Validated properties block: body length, or `None` when the version has
/// no properties.
fn properties_len(
    properties: &Properties,
    version: u8,
    scope: u32,
    context: &'static str,
) -> Result<Option<usize>, EncodeError> {
    if version < 5 {
        if !properties.is_empty() {
            return Err(EncodeError::Invalid(
                "Properties are only supported by MQTT 5",
            ));
        }
        return Ok(None);
    }
    properties.validate(scope, context).map(Some)
}

/// Like [`properties_len`] but omits an empty block (trailing optional
/// properties of acks, disconnect and auth).
fn optional_properties_len(
    properties: &Properties,
    version: u8,
    command: Command,
) -> Result<Option<usize>, EncodeError> {
    if properties.is_empty() {
        return Ok(None);
    }
    properties_len(properties, version, command_scope(command), command.name())
}

fn framed(block: Option<usize>) -> usize {
    block.map(Properties::framed_len).unwrap_or(0)
}

fn put_properties(buf: &mut BytesMut, properties: &Properties, block: Option<usize>) {
    if let Some(body_len) = block {
        properties.write(body_len, buf);
    }
}

fn check_reason(command: Command, code: u8) -> Result<(), EncodeError> {
    match reason_table(command) {
        Some(table) if lookup(table, code).is_none() => {
            Err(EncodeError::InvalidReasonCode { command, code })
        }
        _ => Ok(()),
    }
}

fn check_version(version: u8) -> Result<(), EncodeError> {
    if is_supported_version(version) {
        Ok(())
    } else {
        Err(EncodeError::Invalid("Invalid protocol version"))
    }
}

/// Writes the fixed header and reserves room for the remaining length.
fn start(buf: &mut BytesMut, header: u8, length: usize) -> Result<usize, EncodeError> {
    let length = varint::check(length, "remaining length")?;
    buf.reserve(1 + varint::encoded_len(length) + length as usize);
    buf.put_u8(header);
    put_varint(buf, length);
    Ok(1 + varint::encoded_len(length))
}

/// Appends the encoded frame for `packet` to `buf` and returns the length of
/// its fixed header (command byte plus remaining length).
pub(crate) fn write_packet(
    packet: &Packet,
    opts: &EncodeOptions,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    let version = opts.protocol_version;
    if !matches!(packet, Packet::Connect(_)) {
        check_version(version)?;
    }

    match packet {
        Packet::Connect(connect) => write_connect(connect, buf),
        Packet::Connack(connack) => write_connack(connack, version, buf),
        Packet::Publish(publish) => write_publish(publish, version, buf),
        Packet::Puback(ack) => write_ack(Command::Puback, ack, version, buf),
        Packet::Pubrec(ack) => write_ack(Command::Pubrec, ack, version, buf),
        Packet::Pubrel(ack) => write_ack(Command::Pubrel, ack, version, buf),
        Packet::Pubcomp(ack) => write_ack(Command::Pubcomp, ack, version, buf),
        Packet::Subscribe(subscribe) => write_subscribe(subscribe, version, buf),
        Packet::Suback(suback) => write_suback(suback, version, buf),
        Packet::Unsubscribe(unsubscribe) => write_unsubscribe(unsubscribe, version, buf),
        Packet::Unsuback(unsuback) => write_unsuback(unsuback, version, buf),
        Packet::Pingreq => write_empty(Command::Pingreq, buf),
        Packet::Pingresp => write_empty(Command::Pingresp, buf),
        Packet::Disconnect(disconnect) => write_disconnect(disconnect, version, buf),
        Packet::Auth(auth) => write_auth(auth, version, buf),
    }
}

fn write_empty(command: Command, buf: &mut BytesMut) -> Result<usize, EncodeError> {
    start(buf, header_byte(command, QoS::AtMostOnce, false, false), 0)
}

fn write_connect(connect: &Connect, buf: &mut BytesMut) -> Result<usize, EncodeError> {
    let version = connect.protocol_version;

    if connect.protocol_id != PROTOCOL_ID_V4 && connect.protocol_id != PROTOCOL_ID_V3 {
        return Err(EncodeError::Invalid("Invalid protocolId"));
    }
    check_version(version)?;

    // protocol id, version, flags, keepalive
    let mut length = prefixed_len(connect.protocol_id.len(), "protocolId")? + 1 + 1 + 2;

    if connect.client_id.is_empty() {
        if version < 4 {
            return Err(EncodeError::Invalid("clientId must be supplied before 3.1.1"));
        }
        if !connect.clean && version < 5 {
            return Err(EncodeError::Invalid(
                "clientId must be given if cleanSession set to 0",
            ));
        }
    }
    length += prefixed_len(connect.client_id.len(), "clientId")?;

    let block = properties_len(
        &connect.properties,
        version,
        command_scope(Command::Connect),
        Command::Connect.name(),
    )?;
    length += framed(block);

    let mut flags = 0u8;
    let mut will_block = None;
    if let Some(will) = &connect.will {
        if will.topic.is_empty() {
            return Err(EncodeError::Invalid("Invalid will topic"));
        }
        will_block = properties_len(&will.properties, version, WILL_SCOPE, "will")?;
        length += framed(will_block);
        length += prefixed_len(will.topic.len(), "will topic")?;
        length += prefixed_len(will.payload.len(), "will payload")?;

        flags |= WILL_FLAG_MASK;
        flags |= u8::from(will.qos) << WILL_QOS_SHIFT;
        if will.retain {
            flags |= WILL_RETAIN_MASK;
        }
    }

    if let Some(username) = &connect.username {
        length += prefixed_len(username.len(), "username")?;
        flags |= USERNAME_MASK;
    }

    if let Some(password) = &connect.password {
        if connect.username.is_none() && version < 5 {
            return Err(EncodeError::Invalid("Username is required to use password"));
        }
        length += prefixed_len(password.len(), "password")?;
        flags |= PASSWORD_MASK;
    }

    if connect.clean {
        flags |= CLEAN_SESSION_MASK;
    }

    let header = header_byte(Command::Connect, QoS::AtMostOnce, false, false);
    let header_len = start(buf, header, length)?;
    put_string(buf, &connect.protocol_id);
    buf.put_u8(if connect.bridge_mode {
        version | BRIDGE_MODE_FLAG
    } else {
        version
    });
    buf.put_u8(flags);
    buf.put_u16(connect.keepalive);
    put_properties(buf, &connect.properties, block);
    put_string(buf, &connect.client_id);
    if let Some(will) = &connect.will {
        put_properties(buf, &will.properties, will_block);
        put_string(buf, &will.topic);
        put_binary(buf, &will.payload);
    }
    if let Some(username) = &connect.username {
        put_string(buf, username);
    }
    if let Some(password) = &connect.password {
        put_binary(buf, password);
    }
    Ok(header_len)
}

fn write_connack(connack: &Connack, version: u8, buf: &mut BytesMut) -> Result<usize, EncodeError> {
    if version == 5 {
        check_reason(Command::Connack, connack.reason_code)?;
    }
    let block = properties_len(
        &connack.properties,
        version,
        command_scope(Command::Connack),
        Command::Connack.name(),
    )?;

    let header_len = start(
        buf,
        header_byte(Command::Connack, QoS::AtMostOnce, false, false),
        2 + framed(block),
    )?;
    buf.put_u8(if connack.session_present {
        SESSIONPRESENT_MASK
    } else {
        0
    });
    buf.put_u8(connack.reason_code);
    put_properties(buf, &connack.properties, block);
    Ok(header_len)
}

fn write_publish(publish: &Publish, version: u8, buf: &mut BytesMut) -> Result<usize, EncodeError> {
    let aliased = version == 5 && publish.properties.topic_alias().is_some();
    if publish.topic.is_empty() && !aliased {
        return Err(EncodeError::Invalid("Invalid topic"));
    }

    let mut length = prefixed_len(publish.topic.len(), "topic")? + publish.payload.len();

    let message_id = match (publish.qos, publish.message_id) {
        (QoS::AtMostOnce, _) => None,
        (_, Some(id)) => {
            length += 2;
            Some(id)
        }
        (_, None) => return Err(EncodeError::Invalid("Invalid messageId")),
    };

    let block = properties_len(
        &publish.properties,
        version,
        command_scope(Command::Publish),
        Command::Publish.name(),
    )?;
    length += framed(block);

    let header_len = start(
        buf,
        header_byte(Command::Publish, publish.qos, publish.dup, publish.retain),
        length,
    )?;
    put_string(buf, &publish.topic);
    if let Some(id) = message_id {
        buf.put_u16(id);
    }
    put_properties(buf, &publish.properties, block);
    buf.put_slice(&publish.payload);
    Ok(header_len)
}

fn write_ack(
    command: Command,
    ack: &Ack,
    version: u8,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    let mut length = 2;
    let mut block = None;
    let mut with_reason = false;

    if version == 5 {
        check_reason(command, ack.reason_code)?;
        block = optional_properties_len(&ack.properties, version, command)?;
        with_reason = ack.reason_code != 0 || block.is_some();
        length += with_reason as usize + framed(block);
    } else if !ack.properties.is_empty() {
        return Err(EncodeError::Invalid(
            "Properties are only supported by MQTT 5",
        ));
    }

    let header_len = start(buf, FixedHeader::new(command).to_byte(), length)?;
    buf.put_u16(ack.message_id);
    if with_reason {
        buf.put_u8(ack.reason_code);
    }
    put_properties(buf, &ack.properties, block);
    Ok(header_len)
}

fn write_subscribe(
    subscribe: &Subscribe,
    version: u8,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    if subscribe.subscriptions.is_empty() {
        return Err(EncodeError::Invalid("Invalid subscriptions"));
    }

    let mut length = 2;
    for sub in &subscribe.subscriptions {
        if sub.topic.is_empty() {
            return Err(EncodeError::Invalid("Invalid subscriptions"));
        }
        if version == 5 && sub.retain_handling > 2 {
            return Err(EncodeError::Invalid(
                "Invalid subscriptions - invalid Retain Handling",
            ));
        }
        length += prefixed_len(sub.topic.len(), "topic")? + 1;
    }

    let block = properties_len(
        &subscribe.properties,
        version,
        command_scope(Command::Subscribe),
        Command::Subscribe.name(),
    )?;
    length += framed(block);

    let header_len = start(
        buf,
        header_byte(Command::Subscribe, QoS::AtLeastOnce, false, false),
        length,
    )?;
    buf.put_u16(subscribe.message_id);
    put_properties(buf, &subscribe.properties, block);
    for sub in &subscribe.subscriptions {
        put_string(buf, &sub.topic);
        let mut options = u8::from(sub.qos);
        if version == 5 {
            options |= (sub.no_local as u8) << SUBSCRIBE_OPTIONS_NL_SHIFT;
            options |= (sub.retain_as_published as u8) << SUBSCRIBE_OPTIONS_RAP_SHIFT;
            options |= sub.retain_handling << SUBSCRIBE_OPTIONS_RH_SHIFT;
        }
        buf.put_u8(options);
    }
    Ok(header_len)
}

fn write_suback(suback: &Suback, version: u8, buf: &mut BytesMut) -> Result<usize, EncodeError> {
    if suback.granted.is_empty() {
        return Err(EncodeError::Invalid("Invalid qos vector"));
    }
    for code in &suback.granted {
        if version == 5 {
            check_reason(Command::Suback, *code)?;
        } else if lookup(MQTT4_SUBACK_CODES, *code).is_none() {
            return Err(EncodeError::Invalid("Invalid qos vector"));
        }
    }

    let block = properties_len(
        &suback.properties,
        version,
        command_scope(Command::Suback),
        Command::Suback.name(),
    )?;

    let header_len = start(
        buf,
        header_byte(Command::Suback, QoS::AtMostOnce, false, false),
        2 + framed(block) + suback.granted.len(),
    )?;
    buf.put_u16(suback.message_id);
    put_properties(buf, &suback.properties, block);
    buf.put_slice(&suback.granted);
    Ok(header_len)
}

fn write_unsubscribe(
    unsubscribe: &Unsubscribe,
    version: u8,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    if unsubscribe.unsubscriptions.is_empty() {
        return Err(EncodeError::Invalid("Invalid unsubscriptions"));
    }

    let mut length = 2;
    for topic in &unsubscribe.unsubscriptions {
        length += prefixed_len(topic.len(), "topic")?;
    }

    let block = properties_len(
        &unsubscribe.properties,
        version,
        command_scope(Command::Unsubscribe),
        Command::Unsubscribe.name(),
    )?;
    length += framed(block);

    let header_len = start(
        buf,
        header_byte(Command::Unsubscribe, QoS::AtLeastOnce, false, false),
        length,
    )?;
    buf.put_u16(unsubscribe.message_id);
    put_properties(buf, &unsubscribe.properties, block);
    for topic in &unsubscribe.unsubscriptions {
        put_string(buf, topic);
    }
    Ok(header_len)
}

fn write_unsuback(
    unsuback: &Unsuback,
    version: u8,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    let header = header_byte(Command::Unsuback, QoS::AtMostOnce, false, false);

    if version < 5 {
        if !unsuback.properties.is_empty() {
            return Err(EncodeError::Invalid(
                "Properties are only supported by MQTT 5",
            ));
        }
        let header_len = start(buf, header, 2)?;
        buf.put_u16(unsuback.message_id);
        return Ok(header_len);
    }

    for code in &unsuback.granted {
        check_reason(Command::Unsuback, *code)?;
    }
    let block = properties_len(
        &unsuback.properties,
        version,
        command_scope(Command::Unsuback),
        Command::Unsuback.name(),
    )?;

    let header_len = start(buf, header, 2 + framed(block) + unsuback.granted.len())?;
    buf.put_u16(unsuback.message_id);
    put_properties(buf, &unsuback.properties, block);
    buf.put_slice(&unsuback.granted);
    Ok(header_len)
}

/// Reason code plus optional properties, shared by DISCONNECT and AUTH.
/// Reason 0 with no properties is written as an empty body.
fn write_reason_only(
    command: Command,
    reason_code: u8,
    properties: &Properties,
    version: u8,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    check_reason(command, reason_code)?;
    let block = optional_properties_len(properties, version, command)?;
    let with_reason = reason_code != 0 || block.is_some();

    let header_len = start(
        buf,
        header_byte(command, QoS::AtMostOnce, false, false),
        with_reason as usize + framed(block),
    )?;
    if with_reason {
        buf.put_u8(reason_code);
    }
    put_properties(buf, properties, block);
    Ok(header_len)
}

fn write_disconnect(
    disconnect: &Disconnect,
    version: u8,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    if version < 5 {
        if !disconnect.properties.is_empty() {
            return Err(EncodeError::Invalid(
                "Properties are only supported by MQTT 5",
            ));
        }
        return write_empty(Command::Disconnect, buf);
    }
    write_reason_only(
        Command::Disconnect,
        disconnect.reason_code,
        &disconnect.properties,
        version,
        buf,
    )
}

fn write_auth(auth: &Auth, version: u8, buf: &mut BytesMut) -> Result<usize, EncodeError> {
    if version < 5 {
        return Err(EncodeError::Invalid(
            "Not supported auth packet for this version MQTT",
        ));
    }
    write_reason_only(Command::Auth, auth.reason_code, &auth.properties, version, buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PropertyId;
    use crate::message::{LastWill, Subscription};
    use crate::properties::PropertyValue;

    fn encode(packet: &Packet, version: u8) -> Result<Vec<u8>, EncodeError> {
        let mut buf = BytesMut::new();
        write_packet(packet, &EncodeOptions { protocol_version: version }, &mut buf)?;
        Ok(buf.to_vec())
    }

    fn invalid(packet: &Packet, version: u8) -> String {
        let mut buf = BytesMut::new();
        let err = write_packet(packet, &EncodeOptions { protocol_version: version }, &mut buf)
            .unwrap_err();
        assert!(buf.is_empty(), "nothing written on validation failure");
        err.to_string()
    }

    #[test]
    fn test_connect_minimal() {
        let bytes = encode(&Packet::Connect(Connect::new("test").with_keepalive(30)), 4).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x10, 16, 0, 4, b'M', b'Q', b'T', b'T', 4, 0x02, 0, 30, 0, 4, b't', b'e', b's',
                b't'
            ]
        );
    }

    #[test]
    fn test_connect_full_v4() {
        let mut will = LastWill::new("w", "bye");
        will.qos = QoS::AtLeastOnce;
        will.retain = true;
        let connect = Connect::new("c")
            .with_will(will)
            .with_credentials("u", "p");
        let bytes = encode(&Packet::Connect(connect), 4).unwrap();
        // username, password, will retain, will qos 1, will, clean
        assert_eq!(bytes[9], 0xC0 | 0x20 | 0x08 | 0x04 | 0x02);
        assert_eq!(
            &bytes[12..],
            &[0, 1, b'c', 0, 1, b'w', 0, 3, b'b', b'y', b'e', 0, 1, b'u', 0, 1, b'p']
        );
    }

    #[test]
    fn test_connect_bridge_mode() {
        let mut connect = Connect::new("c");
        connect.bridge_mode = true;
        let bytes = encode(&Packet::Connect(connect), 4).unwrap();
        assert_eq!(bytes[8], 0x84);
    }

    #[test]
    fn test_connect_validation() {
        let mut connect = Connect::new("c");
        connect.protocol_id = "MQTX".to_string();
        assert_eq!(invalid(&Packet::Connect(connect), 4), "Invalid protocolId");

        let connect = Connect::new("c").with_version(7);
        assert_eq!(invalid(&Packet::Connect(connect), 4), "Invalid protocol version");

        let connect = Connect::new("").with_version(3);
        assert_eq!(
            invalid(&Packet::Connect(connect), 4),
            "clientId must be supplied before 3.1.1"
        );

        let mut connect = Connect::new("");
        connect.clean = false;
        assert_eq!(
            invalid(&Packet::Connect(connect), 4),
            "clientId must be given if cleanSession set to 0"
        );

        let connect = Connect::new("c").with_will(LastWill::new("", "x"));
        assert_eq!(invalid(&Packet::Connect(connect), 4), "Invalid will topic");

        let mut connect = Connect::new("c");
        connect.password = Some("p".into());
        assert_eq!(
            invalid(&Packet::Connect(connect.clone()), 4),
            "Username is required to use password"
        );
        assert!(encode(&Packet::Connect(connect.with_version(5)), 4).is_ok());
    }

    #[test]
    fn test_connect_v5_properties() {
        let mut connect = Connect::new("c").with_version(5);
        connect
            .properties
            .set(PropertyId::SessionExpiryInterval, PropertyValue::U32(60))
            .unwrap();
        let bytes = encode(&Packet::Connect(connect), 4).unwrap();
        assert_eq!(&bytes[12..], &[5, 17, 0, 0, 0, 60, 0, 1, b'c']);

        let mut connect = Connect::new("c");
        connect
            .properties
            .set(PropertyId::SessionExpiryInterval, PropertyValue::U32(60))
            .unwrap();
        assert_eq!(
            invalid(&Packet::Connect(connect), 4),
            "Properties are only supported by MQTT 5"
        );
    }

    #[test]
    fn test_publish() {
        let publish = Publish::new("t", "hi").with_qos(QoS::AtLeastOnce, 10);
        let bytes = encode(&Packet::Publish(publish), 4).unwrap();
        assert_eq!(bytes, vec![0x32, 7, 0, 1, b't', 0, 10, b'h', b'i']);

        let mut publish = Publish::new("t", "hi");
        publish.qos = QoS::ExactlyOnce;
        assert_eq!(invalid(&Packet::Publish(publish), 4), "Invalid messageId");

        assert_eq!(invalid(&Packet::Publish(Publish::new("", "x")), 4), "Invalid topic");
    }

    #[test]
    fn test_publish_topic_alias() {
        let mut publish = Publish::new("", "x");
        publish
            .properties
            .set(PropertyId::TopicAlias, PropertyValue::U16(3))
            .unwrap();
        let packet = Packet::Publish(publish);
        assert_eq!(
            encode(&packet, 5).unwrap(),
            vec![0x30, 7, 0, 0, 3, 35, 0, 3, b'x']
        );
        assert_eq!(invalid(&packet, 4), "Invalid topic");
    }

    #[test]
    fn test_acks() {
        assert_eq!(encode(&Packet::Puback(Ack::new(2)), 4).unwrap(), vec![0x40, 2, 0, 2]);
        assert_eq!(encode(&Packet::Pubrel(Ack::new(2)), 4).unwrap(), vec![0x62, 2, 0, 2]);
        assert_eq!(encode(&Packet::Puback(Ack::new(2)), 5).unwrap(), vec![0x40, 2, 0, 2]);

        let mut ack = Ack::new(2);
        ack.reason_code = 0x10;
        assert_eq!(
            encode(&Packet::Pubrec(ack.clone()), 5).unwrap(),
            vec![0x50, 3, 0, 2, 0x10]
        );
        // reason codes are not carried before v5
        assert_eq!(encode(&Packet::Pubrec(ack.clone()), 4).unwrap(), vec![0x50, 2, 0, 2]);
        assert_eq!(
            invalid(&Packet::Pubcomp(ack), 5),
            "Invalid pubcomp reason code: 0x10"
        );
    }

    #[test]
    fn test_subscribe() {
        let mut sub = Subscription::new("a", QoS::AtLeastOnce);
        sub.no_local = true;
        sub.retain_handling = 1;
        let subscribe = Subscribe {
            message_id: 1,
            subscriptions: vec![sub],
            properties: Properties::default(),
        };
        let packet = Packet::Subscribe(subscribe.clone());
        assert_eq!(
            encode(&packet, 4).unwrap(),
            vec![0x82, 6, 0, 1, 0, 1, b'a', 0x01]
        );
        assert_eq!(
            encode(&packet, 5).unwrap(),
            vec![0x82, 7, 0, 1, 0, 0, 1, b'a', 0x15]
        );

        let mut bad = subscribe.clone();
        bad.subscriptions[0].retain_handling = 3;
        assert_eq!(
            invalid(&Packet::Subscribe(bad), 5),
            "Invalid subscriptions - invalid Retain Handling"
        );

        let mut empty = subscribe;
        empty.subscriptions.clear();
        assert_eq!(invalid(&Packet::Subscribe(empty), 4), "Invalid subscriptions");
    }

    #[test]
    fn test_suback_and_unsuback() {
        let suback = Suback {
            message_id: 1,
            granted: vec![0, 1, 2, 128],
            properties: Properties::default(),
        };
        assert_eq!(
            encode(&Packet::Suback(suback.clone()), 4).unwrap(),
            vec![0x90, 6, 0, 1, 0, 1, 2, 128]
        );
        let mut bad = suback;
        bad.granted = vec![3];
        assert_eq!(invalid(&Packet::Suback(bad), 4), "Invalid qos vector");

        let unsuback = Unsuback {
            message_id: 1,
            granted: vec![0x11],
            properties: Properties::default(),
        };
        assert_eq!(
            encode(&Packet::Unsuback(unsuback.clone()), 4).unwrap(),
            vec![0xB0, 2, 0, 1]
        );
        assert_eq!(
            encode(&Packet::Unsuback(unsuback.clone()), 5).unwrap(),
            vec![0xB0, 4, 0, 1, 0, 0x11]
        );

        let empty = Unsuback {
            granted: Vec::new(),
            ..unsuback
        };
        assert_eq!(
            encode(&Packet::Unsuback(empty), 5).unwrap(),
            vec![0xB0, 3, 0, 1, 0]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let unsubscribe = Unsubscribe {
            message_id: 3,
            unsubscriptions: vec!["a".to_string()],
            properties: Properties::default(),
        };
        assert_eq!(
            encode(&Packet::Unsubscribe(unsubscribe), 4).unwrap(),
            vec![0xA2, 5, 0, 3, 0, 1, b'a']
        );
        assert_eq!(
            invalid(&Packet::Unsubscribe(Unsubscribe::default()), 4),
            "Invalid unsubscriptions"
        );
    }

    #[test]
    fn test_disconnect_and_auth() {
        let disconnect = Packet::Disconnect(Disconnect::default());
        assert_eq!(encode(&disconnect, 4).unwrap(), vec![0xE0, 0]);
        assert_eq!(encode(&disconnect, 5).unwrap(), vec![0xE0, 0]);

        let disconnect = Packet::Disconnect(Disconnect {
            reason_code: 0x8E,
            properties: Properties::default(),
        });
        assert_eq!(encode(&disconnect, 5).unwrap(), vec![0xE0, 1, 0x8E]);

        let mut auth = Auth {
            reason_code: 0x18,
            properties: Properties::default(),
        };
        auth.properties
            .set(PropertyId::AuthenticationMethod, PropertyValue::String("m".into()))
            .unwrap();
        assert_eq!(
            encode(&Packet::Auth(auth.clone()), 5).unwrap(),
            vec![0xF0, 6, 0x18, 4, 21, 0, 1, b'm']
        );
        assert_eq!(
            invalid(&Packet::Auth(auth), 4),
            "Not supported auth packet for this version MQTT"
        );
    }

    #[test]
    fn test_property_outside_scope() {
        let mut ack = Ack::new(1);
        ack.properties
            .set(PropertyId::TopicAlias, PropertyValue::U16(1))
            .unwrap();
        assert_eq!(
            invalid(&Packet::Puback(ack), 5),
            "Invalid property topicAlias for puback"
        );
    }

    #[test]
    fn test_pings() {
        assert_eq!(encode(&Packet::Pingreq, 4).unwrap(), vec![0xC0, 0]);
        assert_eq!(encode(&Packet::Pingresp, 4).unwrap(), vec![0xD0, 0]);
    }

    #[test]
    fn test_field_too_large() {
        let topic = "a".repeat(MAX_FIELD_LEN + 1);
        let err = encode(&Packet::Publish(Publish::new(topic, "x")), 4).unwrap_err();
        assert!(matches!(err, EncodeError::TooLarge { field: "topic", .. }));
    }
}
