//! Packet model shared by the decoder and the encoder.
//!
//! Every field the wire format can carry is a plain field here. MQTT 5 only
//! data (`properties`, reason codes, subscription options) is ignored when
//! encoding for 3.1/3.1.1 and left at its default when decoding them.

use crate::constants::{Command, PROTOCOL_ID_V4};
use crate::frame::{FixedHeader, QoS};
use crate::properties::Properties;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

fn default_protocol_id() -> String {
    PROTOCOL_ID_V4.to_string()
}

fn default_protocol_version() -> u8 {
    4
}

fn default_true() -> bool {
    true
}

/// CONNECT packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connect {
    #[serde(default = "default_protocol_id")]
    pub protocol_id: String,
    /// 3, 4 or 5. Bridge mode is carried separately in `bridge_mode`.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u8,
    #[serde(default)]
    pub bridge_mode: bool,
    #[serde(default = "default_true")]
    pub clean: bool,
    #[serde(default)]
    pub keepalive: u16,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub will: Option<LastWill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Default for Connect {
    fn default() -> Self {
        Self {
            protocol_id: default_protocol_id(),
            protocol_version: default_protocol_version(),
            bridge_mode: false,
            clean: true,
            keepalive: 0,
            client_id: String::new(),
            will: None,
            username: None,
            password: None,
            properties: Properties::default(),
        }
    }
}

impl Connect {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, protocol_version: u8) -> Self {
        self.protocol_version = protocol_version;
        if protocol_version == 3 {
            self.protocol_id = crate::constants::PROTOCOL_ID_V3.to_string();
        }
        self
    }

    pub fn with_keepalive(mut self, keepalive: u16) -> Self {
        self.keepalive = keepalive;
        self
    }

    pub fn with_will(mut self, will: LastWill) -> Self {
        self.will = Some(will);
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<Bytes>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Will message carried by CONNECT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastWill {
    pub topic: String,
    pub payload: Bytes,
    #[serde(default)]
    pub qos: QoS,
    #[serde(default)]
    pub retain: bool,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl LastWill {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }
}

/// CONNACK packet. `reason_code` holds the return code for 3.1/3.1.1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connack {
    #[serde(default)]
    pub session_present: bool,
    #[serde(default)]
    pub reason_code: u8,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// PUBLISH packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publish {
    pub topic: String,
    /// Present only when `qos` is above 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<u16>,
    #[serde(default)]
    pub qos: QoS,
    #[serde(default)]
    pub dup: bool,
    #[serde(default)]
    pub retain: bool,
    #[serde(default)]
    pub payload: Bytes,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Publish {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn with_qos(mut self, qos: QoS, message_id: u16) -> Self {
        self.qos = qos;
        self.message_id = (qos != QoS::AtMostOnce).then_some(message_id);
        self
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }
}

/// PUBACK, PUBREC, PUBREL and PUBCOMP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub message_id: u16,
    #[serde(default)]
    pub reason_code: u8,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Ack {
    pub fn new(message_id: u16) -> Self {
        Self {
            message_id,
            ..Default::default()
        }
    }
}

/// One topic filter of a SUBSCRIBE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub topic: String,
    #[serde(default)]
    pub qos: QoS,
    #[serde(default, rename = "nl")]
    pub no_local: bool,
    #[serde(default, rename = "rap")]
    pub retain_as_published: bool,
    #[serde(default, rename = "rh")]
    pub retain_handling: u8,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, qos: QoS) -> Self {
        Self {
            topic: topic.into(),
            qos,
            ..Default::default()
        }
    }
}

/// SUBSCRIBE packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscribe {
    pub message_id: u16,
    pub subscriptions: Vec<Subscription>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// SUBACK packet. `granted` holds granted QoS values or failure codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suback {
    pub message_id: u16,
    pub granted: Vec<u8>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// UNSUBSCRIBE packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unsubscribe {
    pub message_id: u16,
    pub unsubscriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// UNSUBACK packet. `granted` is only carried by MQTT 5.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unsuback {
    pub message_id: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub granted: Vec<u8>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// DISCONNECT packet. Reason and properties are MQTT 5 only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disconnect {
    #[serde(default)]
    pub reason_code: u8,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// AUTH packet (MQTT 5 only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(default)]
    pub reason_code: u8,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

/// A control packet, one variant per command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Packet {
    Connect(Connect),
    Connack(Connack),
    Publish(Publish),
    Puback(Ack),
    Pubrec(Ack),
    Pubrel(Ack),
    Pubcomp(Ack),
    Subscribe(Subscribe),
    Suback(Suback),
    Unsubscribe(Unsubscribe),
    Unsuback(Unsuback),
    Pingreq,
    Pingresp,
    Disconnect(Disconnect),
    Auth(Auth),
}

impl Packet {
    pub fn command(&self) -> Command {
        match self {
            Packet::Connect(_) => Command::Connect,
            Packet::Connack(_) => Command::Connack,
            Packet::Publish(_) => Command::Publish,
            Packet::Puback(_) => Command::Puback,
            Packet::Pubrec(_) => Command::Pubrec,
            Packet::Pubrel(_) => Command::Pubrel,
            Packet::Pubcomp(_) => Command::Pubcomp,
            Packet::Subscribe(_) => Command::Subscribe,
            Packet::Suback(_) => Command::Suback,
            Packet::Unsubscribe(_) => Command::Unsubscribe,
            Packet::Unsuback(_) => Command::Unsuback,
            Packet::Pingreq => Command::Pingreq,
            Packet::Pingresp => Command::Pingresp,
            Packet::Disconnect(_) => Command::Disconnect,
            Packet::Auth(_) => Command::Auth,
        }
    }

    /// Fixed header the encoder writes for this packet.
    pub fn header(&self) -> FixedHeader {
        match self {
            Packet::Publish(publish) => {
                FixedHeader::publish(publish.qos, publish.dup, publish.retain)
            }
            other => FixedHeader::new(other.command()),
        }
    }

    /// Message identifier, for packets that carry one.
    pub fn message_id(&self) -> Option<u16> {
        match self {
            Packet::Publish(p) => p.message_id,
            Packet::Puback(a) | Packet::Pubrec(a) | Packet::Pubrel(a) | Packet::Pubcomp(a) => {
                Some(a.message_id)
            }
            Packet::Subscribe(s) => Some(s.message_id),
            Packet::Suback(s) => Some(s.message_id),
            Packet::Unsubscribe(u) => Some(u.message_id),
            Packet::Unsuback(u) => Some(u.message_id),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Packet::Connect(p) => Some(&p.properties),
            Packet::Connack(p) => Some(&p.properties),
            Packet::Publish(p) => Some(&p.properties),
            Packet::Puback(a) | Packet::Pubrec(a) | Packet::Pubrel(a) | Packet::Pubcomp(a) => {
                Some(&a.properties)
            }
            Packet::Subscribe(p) => Some(&p.properties),
            Packet::Suback(p) => Some(&p.properties),
            Packet::Unsubscribe(p) => Some(&p.properties),
            Packet::Unsuback(p) => Some(&p.properties),
            Packet::Disconnect(p) => Some(&p.properties),
            Packet::Auth(p) => Some(&p.properties),
            Packet::Pingreq | Packet::Pingresp => None,
        }
    }
}

/// A decoded packet together with its fixed header and remaining length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub header: FixedHeader,
    /// Remaining length declared in the fixed header.
    pub length: u32,
    pub packet: Packet,
}

impl Message {
    pub fn command(&self) -> Command {
        self.header.command
    }
}
