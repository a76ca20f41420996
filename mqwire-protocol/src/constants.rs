//! Protocol constants: command codes, header masks, property table and
//! reason-code tables.
//!
//! Everything here is static data. The decoder uses it for validation, the
//! encoder uses it to build header bytes, and callers can use the reason
//! tables for diagnostics.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// MQTT control packet type (top 4 bits of the fixed header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Command {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
    Auth = 15,
}

impl Command {
    pub const ALL: [Command; 15] = [
        Command::Connect,
        Command::Connack,
        Command::Publish,
        Command::Puback,
        Command::Pubrec,
        Command::Pubrel,
        Command::Pubcomp,
        Command::Subscribe,
        Command::Suback,
        Command::Unsubscribe,
        Command::Unsuback,
        Command::Pingreq,
        Command::Pingresp,
        Command::Disconnect,
        Command::Auth,
    ];

    /// Wire code of the command.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Mnemonic used in diagnostics ("connect", "suback", ...).
    pub fn name(self) -> &'static str {
        match self {
            Command::Connect => "connect",
            Command::Connack => "connack",
            Command::Publish => "publish",
            Command::Puback => "puback",
            Command::Pubrec => "pubrec",
            Command::Pubrel => "pubrel",
            Command::Pubcomp => "pubcomp",
            Command::Subscribe => "subscribe",
            Command::Suback => "suback",
            Command::Unsubscribe => "unsubscribe",
            Command::Unsuback => "unsuback",
            Command::Pingreq => "pingreq",
            Command::Pingresp => "pingresp",
            Command::Disconnect => "disconnect",
            Command::Auth => "auth",
        }
    }

    /// Low-nibble flag bits the protocol fixes for this command.
    ///
    /// `None` means the bits carry dup/qos/retain (publish only).
    pub fn required_flags(self) -> Option<u8> {
        match self {
            Command::Publish => None,
            Command::Pubrel | Command::Subscribe | Command::Unsubscribe => Some(0x02),
            _ => Some(0x00),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Command::ALL.iter().copied().find(|cmd| cmd.name() == name)
    }
}

impl TryFrom<u8> for Command {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=15 => Ok(Command::ALL[(value - 1) as usize]),
            _ => Err(DecodeError::UnsupportedCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* Protocol versions */
pub const MIN_PROTOCOL_VERSION: u8 = 3;
pub const MAX_PROTOCOL_VERSION: u8 = 5;

pub const fn is_supported_version(version: u8) -> bool {
    version >= MIN_PROTOCOL_VERSION && version <= MAX_PROTOCOL_VERSION
}

/* Header */
pub const CMD_SHIFT: u8 = 4;
pub const CMD_MASK: u8 = 0xF0;
pub const FLAGS_MASK: u8 = 0x0F;
pub const DUP_MASK: u8 = 0x08;
pub const QOS_MASK: u8 = 0x03;
pub const QOS_SHIFT: u8 = 1;
pub const RETAIN_MASK: u8 = 0x01;

/* Variable byte integer */
pub const VARBYTEINT_MASK: u8 = 0x7F;
pub const VARBYTEINT_FIN_MASK: u8 = 0x80;
pub const VARBYTEINT_MAX: u32 = 268_435_455;
pub const VARBYTEINT_MAX_BYTES: usize = 4;

/* Connack */
pub const SESSIONPRESENT_MASK: u8 = 0x01;

/* Connect */
pub const USERNAME_MASK: u8 = 0x80;
pub const PASSWORD_MASK: u8 = 0x40;
pub const WILL_RETAIN_MASK: u8 = 0x20;
pub const WILL_QOS_MASK: u8 = 0x18;
pub const WILL_QOS_SHIFT: u8 = 3;
pub const WILL_FLAG_MASK: u8 = 0x04;
pub const CLEAN_SESSION_MASK: u8 = 0x02;
pub const CONNECT_RESERVED_MASK: u8 = 0x01;

/// Protocol version bit set by bridges (131 = 3.1 bridge, 132 = 3.1.1 bridge).
pub const BRIDGE_MODE_FLAG: u8 = 0x80;

/* Protocol names */
pub const PROTOCOL_ID_V3: &str = "MQIsdp";
pub const PROTOCOL_ID_V4: &str = "MQTT";

/* Subscribe options */
pub const SUBSCRIBE_OPTIONS_QOS_MASK: u8 = 0x03;
pub const SUBSCRIBE_OPTIONS_NL_MASK: u8 = 0x01;
pub const SUBSCRIBE_OPTIONS_NL_SHIFT: u8 = 2;
pub const SUBSCRIBE_OPTIONS_RAP_MASK: u8 = 0x01;
pub const SUBSCRIBE_OPTIONS_RAP_SHIFT: u8 = 3;
pub const SUBSCRIBE_OPTIONS_RH_MASK: u8 = 0x03;
pub const SUBSCRIBE_OPTIONS_RH_SHIFT: u8 = 4;
pub const SUBSCRIBE_RESERVED_V5_MASK: u8 = 0xC0;
pub const SUBSCRIBE_RESERVED_V4_MASK: u8 = 0xFC;

/// Suback return code rejecting a subscription (3.1.1).
pub const SUBACK_FAILURE: u8 = 0x80;

/// Wire type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// Single byte interpreted as a boolean.
    Byte,
    /// Single byte interpreted as a number.
    Int8,
    Int16,
    Int32,
    /// Variable byte integer.
    Var,
    String,
    Binary,
    /// UTF-8 name/value string pair.
    Pair,
}

/// Bit used in [`PropertyId::allowed_mask`] for will properties.
///
/// Command code 0 is reserved, so bit 0 is free to stand for the will scope.
pub const WILL_SCOPE: u32 = 1;

const fn scope(commands: &[Command]) -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < commands.len() {
        mask |= 1 << commands[i] as u8;
        i += 1;
    }
    mask
}

/// Bit for a single command in a property scope mask.
pub const fn command_scope(cmd: Command) -> u32 {
    1 << cmd as u8
}

/// MQTT 5 property identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum PropertyId {
    PayloadFormatIndicator = 1,
    MessageExpiryInterval = 2,
    ContentType = 3,
    ResponseTopic = 8,
    CorrelationData = 9,
    SubscriptionIdentifier = 11,
    SessionExpiryInterval = 17,
    AssignedClientIdentifier = 18,
    ServerKeepAlive = 19,
    AuthenticationMethod = 21,
    AuthenticationData = 22,
    RequestProblemInformation = 23,
    WillDelayInterval = 24,
    RequestResponseInformation = 25,
    ResponseInformation = 26,
    ServerReference = 28,
    ReasonString = 31,
    ReceiveMaximum = 33,
    TopicAliasMaximum = 34,
    TopicAlias = 35,
    #[serde(rename = "maximumQoS")]
    MaximumQos = 36,
    RetainAvailable = 37,
    UserProperties = 38,
    MaximumPacketSize = 39,
    WildcardSubscriptionAvailable = 40,
    SubscriptionIdentifiersAvailable = 41,
    SharedSubscriptionAvailable = 42,
}

const PROPERTY_TABLE_LEN: usize = PropertyId::SharedSubscriptionAvailable as usize + 1;

const fn build_property_table() -> [Option<PropertyId>; PROPERTY_TABLE_LEN] {
    let mut table = [None; PROPERTY_TABLE_LEN];
    let mut i = 0;
    while i < PropertyId::ALL.len() {
        let id = PropertyId::ALL[i];
        table[id as usize] = Some(id);
        i += 1;
    }
    table
}

/// Property identifiers indexed by wire code.
static PROPERTY_TABLE: [Option<PropertyId>; PROPERTY_TABLE_LEN] = build_property_table();

impl PropertyId {
    pub const ALL: [PropertyId; 27] = [
        PropertyId::PayloadFormatIndicator,
        PropertyId::MessageExpiryInterval,
        PropertyId::ContentType,
        PropertyId::ResponseTopic,
        PropertyId::CorrelationData,
        PropertyId::SubscriptionIdentifier,
        PropertyId::SessionExpiryInterval,
        PropertyId::AssignedClientIdentifier,
        PropertyId::ServerKeepAlive,
        PropertyId::AuthenticationMethod,
        PropertyId::AuthenticationData,
        PropertyId::RequestProblemInformation,
        PropertyId::WillDelayInterval,
        PropertyId::RequestResponseInformation,
        PropertyId::ResponseInformation,
        PropertyId::ServerReference,
        PropertyId::ReasonString,
        PropertyId::ReceiveMaximum,
        PropertyId::TopicAliasMaximum,
        PropertyId::TopicAlias,
        PropertyId::MaximumQos,
        PropertyId::RetainAvailable,
        PropertyId::UserProperties,
        PropertyId::MaximumPacketSize,
        PropertyId::WildcardSubscriptionAvailable,
        PropertyId::SubscriptionIdentifiersAvailable,
        PropertyId::SharedSubscriptionAvailable,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        PROPERTY_TABLE.get(code as usize).copied().flatten()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyId::PayloadFormatIndicator => "payloadFormatIndicator",
            PropertyId::MessageExpiryInterval => "messageExpiryInterval",
            PropertyId::ContentType => "contentType",
            PropertyId::ResponseTopic => "responseTopic",
            PropertyId::CorrelationData => "correlationData",
            PropertyId::SubscriptionIdentifier => "subscriptionIdentifier",
            PropertyId::SessionExpiryInterval => "sessionExpiryInterval",
            PropertyId::AssignedClientIdentifier => "assignedClientIdentifier",
            PropertyId::ServerKeepAlive => "serverKeepAlive",
            PropertyId::AuthenticationMethod => "authenticationMethod",
            PropertyId::AuthenticationData => "authenticationData",
            PropertyId::RequestProblemInformation => "requestProblemInformation",
            PropertyId::WillDelayInterval => "willDelayInterval",
            PropertyId::RequestResponseInformation => "requestResponseInformation",
            PropertyId::ResponseInformation => "responseInformation",
            PropertyId::ServerReference => "serverReference",
            PropertyId::ReasonString => "reasonString",
            PropertyId::ReceiveMaximum => "receiveMaximum",
            PropertyId::TopicAliasMaximum => "topicAliasMaximum",
            PropertyId::TopicAlias => "topicAlias",
            PropertyId::MaximumQos => "maximumQoS",
            PropertyId::RetainAvailable => "retainAvailable",
            PropertyId::UserProperties => "userProperties",
            PropertyId::MaximumPacketSize => "maximumPacketSize",
            PropertyId::WildcardSubscriptionAvailable => "wildcardSubscriptionAvailable",
            PropertyId::SubscriptionIdentifiersAvailable => "subscriptionIdentifiersAvailable",
            PropertyId::SharedSubscriptionAvailable => "sharedSubscriptionAvailable",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PropertyId::ALL.iter().copied().find(|id| id.name() == name)
    }

    pub fn value_type(self) -> PropertyType {
        match self {
            PropertyId::RequestResponseInformation
            | PropertyId::RequestProblemInformation
            | PropertyId::PayloadFormatIndicator
            | PropertyId::RetainAvailable
            | PropertyId::WildcardSubscriptionAvailable
            | PropertyId::SubscriptionIdentifiersAvailable
            | PropertyId::SharedSubscriptionAvailable => PropertyType::Byte,
            PropertyId::MaximumQos => PropertyType::Int8,
            PropertyId::ReceiveMaximum
            | PropertyId::TopicAliasMaximum
            | PropertyId::ServerKeepAlive
            | PropertyId::TopicAlias => PropertyType::Int16,
            PropertyId::SessionExpiryInterval
            | PropertyId::WillDelayInterval
            | PropertyId::MaximumPacketSize
            | PropertyId::MessageExpiryInterval => PropertyType::Int32,
            PropertyId::SubscriptionIdentifier => PropertyType::Var,
            PropertyId::AuthenticationMethod
            | PropertyId::ContentType
            | PropertyId::ResponseTopic
            | PropertyId::AssignedClientIdentifier
            | PropertyId::ReasonString
            | PropertyId::ResponseInformation
            | PropertyId::ServerReference => PropertyType::String,
            PropertyId::AuthenticationData | PropertyId::CorrelationData => PropertyType::Binary,
            PropertyId::UserProperties => PropertyType::Pair,
        }
    }

    /// Scope mask of packets (and the will) this property may appear in.
    pub fn allowed_mask(self) -> u32 {
        use Command::*;
        match self {
            PropertyId::PayloadFormatIndicator
            | PropertyId::MessageExpiryInterval
            | PropertyId::ContentType
            | PropertyId::ResponseTopic
            | PropertyId::CorrelationData => scope(&[Publish]) | WILL_SCOPE,
            PropertyId::SubscriptionIdentifier => scope(&[Publish, Subscribe]),
            PropertyId::SessionExpiryInterval => scope(&[Connect, Connack, Disconnect]),
            PropertyId::AssignedClientIdentifier
            | PropertyId::ServerKeepAlive
            | PropertyId::ResponseInformation
            | PropertyId::MaximumQos
            | PropertyId::RetainAvailable
            | PropertyId::WildcardSubscriptionAvailable
            | PropertyId::SubscriptionIdentifiersAvailable
            | PropertyId::SharedSubscriptionAvailable => scope(&[Connack]),
            PropertyId::AuthenticationMethod | PropertyId::AuthenticationData => {
                scope(&[Connect, Connack, Auth])
            }
            PropertyId::RequestProblemInformation | PropertyId::RequestResponseInformation => {
                scope(&[Connect])
            }
            PropertyId::WillDelayInterval => WILL_SCOPE,
            PropertyId::ServerReference => scope(&[Connack, Disconnect]),
            PropertyId::ReasonString => scope(&[
                Connack, Puback, Pubrec, Pubrel, Pubcomp, Suback, Unsuback, Disconnect, Auth,
            ]),
            PropertyId::ReceiveMaximum
            | PropertyId::TopicAliasMaximum
            | PropertyId::MaximumPacketSize => scope(&[Connect, Connack]),
            PropertyId::TopicAlias => scope(&[Publish]),
            PropertyId::UserProperties => {
                scope(&[
                    Connect,
                    Connack,
                    Publish,
                    Puback,
                    Pubrec,
                    Pubrel,
                    Pubcomp,
                    Subscribe,
                    Suback,
                    Unsubscribe,
                    Unsuback,
                    Disconnect,
                    Auth,
                ]) | WILL_SCOPE
            }
        }
    }

    pub fn is_allowed_in(self, scope_mask: u32) -> bool {
        self.allowed_mask() & scope_mask != 0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reason-code table: code → human readable description.
pub type ReasonTable = &'static [(u8, &'static str)];

pub const MQTT5_CONNACK_CODES: ReasonTable = &[
    (0x00, "Success"),
    (0x80, "Unspecified error"),
    (0x81, "Malformed Packet"),
    (0x82, "Protocol Error"),
    (0x83, "Implementation specific error"),
    (0x84, "Unsupported Protocol Version"),
    (0x85, "Client Identifier not valid"),
    (0x86, "Bad User Name or Password"),
    (0x87, "Not authorized"),
    (0x88, "Server unavailable"),
    (0x89, "Server busy"),
    (0x8a, "Banned"),
    (0x8c, "Bad authentication method"),
    (0x90, "Topic Name invalid"),
    (0x95, "Packet too large"),
    (0x97, "Quota exceeded"),
    (0x99, "Payload format invalid"),
    (0x9a, "Retain not supported"),
    (0x9b, "QoS not supported"),
    (0x9c, "Use another server"),
    (0x9d, "Server moved"),
    (0x9f, "Connection rate exceeded"),
];

pub const MQTT5_PUBACK_PUBREC_CODES: ReasonTable = &[
    (0x00, "Success"),
    (0x10, "No matching subscribers"),
    (0x80, "Unspecified error"),
    (0x83, "Implementation specific error"),
    (0x87, "Not authorized"),
    (0x90, "Topic Name invalid"),
    (0x91, "Packet identifier in use"),
    (0x97, "Quota exceeded"),
    (0x99, "Payload format invalid"),
];

pub const MQTT5_PUBREL_PUBCOMP_CODES: ReasonTable =
    &[(0x00, "Success"), (0x92, "Packet Identifier not found")];

pub const MQTT5_SUBACK_CODES: ReasonTable = &[
    (0x00, "Granted QoS 0"),
    (0x01, "Granted QoS 1"),
    (0x02, "Granted QoS 2"),
    (0x80, "Unspecified error"),
    (0x83, "Implementation specific error"),
    (0x87, "Not authorized"),
    (0x8f, "Topic Filter invalid"),
    (0x91, "Packet Identifier in use"),
    (0x97, "Quota exceeded"),
    (0x9e, "Shared Subscriptions not supported"),
    (0xa1, "Subscription Identifiers not supported"),
    (0xa2, "Wildcard Subscriptions not supported"),
];

pub const MQTT5_UNSUBACK_CODES: ReasonTable = &[
    (0x00, "Success"),
    (0x11, "No subscription existed"),
    (0x80, "Unspecified error"),
    (0x83, "Implementation specific error"),
    (0x87, "Not authorized"),
    (0x8f, "Topic Filter invalid"),
    (0x91, "Packet Identifier in use"),
];

pub const MQTT5_DISCONNECT_CODES: ReasonTable = &[
    (0x00, "Normal disconnection"),
    (0x04, "Disconnect with Will Message"),
    (0x80, "Unspecified error"),
    (0x81, "Malformed Packet"),
    (0x82, "Protocol Error"),
    (0x83, "Implementation specific error"),
    (0x87, "Not authorized"),
    (0x89, "Server busy"),
    (0x8b, "Server shutting down"),
    (0x8d, "Keep Alive timeout"),
    (0x8e, "Session taken over"),
    (0x8f, "Topic Filter invalid"),
    (0x90, "Topic Name invalid"),
    (0x93, "Receive Maximum exceeded"),
    (0x94, "Topic Alias invalid"),
    (0x95, "Packet too large"),
    (0x96, "Message rate too high"),
    (0x97, "Quota exceeded"),
    (0x98, "Administrative action"),
    (0x99, "Payload format invalid"),
    (0x9a, "Retain not supported"),
    (0x9b, "QoS not supported"),
    (0x9c, "Use another server"),
    (0x9d, "Server moved"),
    (0x9e, "Shared Subscriptions not supported"),
    (0x9f, "Connection rate exceeded"),
    (0xa0, "Maximum connect time"),
    (0xa1, "Subscription Identifiers not supported"),
    (0xa2, "Wildcard Subscriptions not supported"),
];

pub const MQTT5_AUTH_CODES: ReasonTable = &[
    (0x00, "Success"),
    (0x18, "Continue authentication"),
    (0x19, "Re-authenticate"),
];

/// Granted codes accepted in a 3.1/3.1.1 SUBACK.
pub const MQTT4_SUBACK_CODES: ReasonTable = &[
    (0x00, "Granted QoS 0"),
    (0x01, "Granted QoS 1"),
    (0x02, "Granted QoS 2"),
    (SUBACK_FAILURE, "Failure"),
];

/// Returns the v5 reason table used to validate `cmd`, if it has one.
pub fn reason_table(cmd: Command) -> Option<ReasonTable> {
    match cmd {
        Command::Connack => Some(MQTT5_CONNACK_CODES),
        Command::Puback | Command::Pubrec => Some(MQTT5_PUBACK_PUBREC_CODES),
        Command::Pubrel | Command::Pubcomp => Some(MQTT5_PUBREL_PUBCOMP_CODES),
        Command::Suback => Some(MQTT5_SUBACK_CODES),
        Command::Unsuback => Some(MQTT5_UNSUBACK_CODES),
        Command::Disconnect => Some(MQTT5_DISCONNECT_CODES),
        Command::Auth => Some(MQTT5_AUTH_CODES),
        _ => None,
    }
}

/// Looks up `code` in `table`.
pub fn lookup(table: ReasonTable, code: u8) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, text)| *text)
}

/// Human readable description of a v5 reason code for `cmd`.
pub fn reason_string(cmd: Command, code: u8) -> Option<&'static str> {
    reason_table(cmd).and_then(|table| lookup(table, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes() {
        for (i, cmd) in Command::ALL.iter().enumerate() {
            assert_eq!(cmd.code() as usize, i + 1);
            assert_eq!(Command::try_from(cmd.code()).unwrap(), *cmd);
            assert_eq!(Command::from_name(cmd.name()), Some(*cmd));
        }
        assert!(Command::try_from(0).is_err());
        assert!(Command::try_from(16).is_err());
    }

    #[test]
    fn test_required_flags() {
        assert_eq!(Command::Publish.required_flags(), None);
        assert_eq!(Command::Subscribe.required_flags(), Some(2));
        assert_eq!(Command::Unsubscribe.required_flags(), Some(2));
        assert_eq!(Command::Pubrel.required_flags(), Some(2));
        assert_eq!(Command::Pubcomp.required_flags(), Some(0));
        assert_eq!(Command::Auth.required_flags(), Some(0));
    }

    #[test]
    fn test_property_table() {
        for id in PropertyId::ALL {
            assert_eq!(PropertyId::from_code(id.code()), Some(id));
            assert_eq!(PropertyId::from_name(id.name()), Some(id));
        }
        assert_eq!(PropertyId::from_code(0), None);
        assert_eq!(PropertyId::from_code(4), None);
        assert_eq!(PropertyId::from_code(42), Some(PropertyId::SharedSubscriptionAvailable));
        assert_eq!(PropertyId::from_code(43), None);
        assert_eq!(PropertyId::from_code(0xFF), None);
        let known = (0..=u8::MAX).filter_map(PropertyId::from_code).count();
        assert_eq!(known, PropertyId::ALL.len());
        assert_eq!(
            PropertyId::SubscriptionIdentifier.value_type(),
            PropertyType::Var
        );
        assert_eq!(PropertyId::UserProperties.value_type(), PropertyType::Pair);
        assert_eq!(PropertyId::MaximumQos.value_type(), PropertyType::Int8);
    }

    #[test]
    fn test_supported_versions() {
        assert!(!is_supported_version(MIN_PROTOCOL_VERSION - 1));
        assert!((3..=5).all(is_supported_version));
        assert!(!is_supported_version(MAX_PROTOCOL_VERSION + 1));
        assert!(!is_supported_version(0x83));
    }

    #[test]
    fn test_property_scopes() {
        assert!(PropertyId::TopicAlias.is_allowed_in(command_scope(Command::Publish)));
        assert!(!PropertyId::TopicAlias.is_allowed_in(command_scope(Command::Connect)));
        assert!(PropertyId::WillDelayInterval.is_allowed_in(WILL_SCOPE));
        assert!(!PropertyId::WillDelayInterval.is_allowed_in(command_scope(Command::Connect)));
        assert!(PropertyId::UserProperties.is_allowed_in(WILL_SCOPE));
        assert!(!PropertyId::UserProperties.is_allowed_in(command_scope(Command::Pingreq)));
        assert!(PropertyId::ReasonString.is_allowed_in(command_scope(Command::Auth)));
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(reason_string(Command::Auth, 0x18), Some("Continue authentication"));
        assert_eq!(
            reason_string(Command::Pubcomp, 0x92),
            Some("Packet Identifier not found")
        );
        assert_eq!(reason_string(Command::Puback, 0x92), None);
        assert_eq!(reason_string(Command::Publish, 0x00), None);
        assert_eq!(
            reason_string(Command::Connack, 0x84),
            Some("Unsupported Protocol Version")
        );
    }
}
