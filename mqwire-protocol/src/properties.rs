//! MQTT 5 properties.
//!
//! A properties block is a variable byte integer length followed by
//! `(identifier, value)` pairs. The identifier decides the value type via
//! [`PropertyId::value_type`]. A property that appears more than once keeps
//! every value in arrival order; user properties are grouped by name the
//! same way.

use crate::constants::{PropertyId, PropertyType, VARBYTEINT_MAX};
use crate::error::{DecodeError, EncodeError};
use crate::parse::Reader;
use crate::varint;
use crate::write::{check_len, put_binary, put_string, put_varint};
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValue {
    Bool(bool),
    Byte(u8),
    U16(u16),
    U32(u32),
    VarInt(u32),
    String(String),
    Binary(Bytes),
}

impl PropertyValue {
    fn matches(&self, ty: PropertyType) -> bool {
        matches!(
            (self, ty),
            (PropertyValue::Bool(_), PropertyType::Byte)
                | (PropertyValue::Byte(_), PropertyType::Int8)
                | (PropertyValue::U16(_), PropertyType::Int16)
                | (PropertyValue::U32(_), PropertyType::Int32)
                | (PropertyValue::VarInt(_), PropertyType::Var)
                | (PropertyValue::String(_), PropertyType::String)
                | (PropertyValue::Binary(_), PropertyType::Binary)
        )
    }

    fn encoded_len(&self) -> usize {
        match self {
            PropertyValue::Bool(_) | PropertyValue::Byte(_) => 1,
            PropertyValue::U16(_) => 2,
            PropertyValue::U32(_) => 4,
            PropertyValue::VarInt(v) => varint::encoded_len(*v),
            PropertyValue::String(s) => 2 + s.len(),
            PropertyValue::Binary(b) => 2 + b.len(),
        }
    }

    fn write(&self, buf: &mut BytesMut) {
        match self {
            PropertyValue::Bool(b) => buf.put_u8(*b as u8),
            PropertyValue::Byte(b) => buf.put_u8(*b),
            PropertyValue::U16(v) => buf.put_u16(*v),
            PropertyValue::U32(v) => buf.put_u32(*v),
            PropertyValue::VarInt(v) => put_varint(buf, *v),
            PropertyValue::String(s) => put_string(buf, s),
            PropertyValue::Binary(b) => put_binary(buf, b),
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            PropertyValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            PropertyValue::U32(v) | PropertyValue::VarInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// User properties grouped by name, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProperties {
    entries: Vec<(String, Vec<String>)>,
}

impl UserProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under `name`; a repeated name accumulates into a list.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Iterates over every `(name, value)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Properties attached to a packet or a will message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    values: BTreeMap<PropertyId, Vec<PropertyValue>>,
    #[serde(default, skip_serializing_if = "UserProperties::is_empty")]
    user_properties: UserProperties,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value. Repeating an identifier keeps every value.
    pub fn push(&mut self, id: PropertyId, value: PropertyValue) -> Result<(), EncodeError> {
        if id == PropertyId::UserProperties || !value.matches(id.value_type()) {
            return Err(EncodeError::PropertyType(id));
        }
        self.values.entry(id).or_default().push(value);
        Ok(())
    }

    /// Replaces any existing values for `id`.
    pub fn set(&mut self, id: PropertyId, value: PropertyValue) -> Result<(), EncodeError> {
        self.values.remove(&id);
        self.push(id, value)
    }

    /// Builder form of [`Properties::set`].
    pub fn with(mut self, id: PropertyId, value: PropertyValue) -> Result<Self, EncodeError> {
        self.set(id, value)?;
        Ok(self)
    }

    pub fn with_user_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_properties.push(name, value);
        self
    }

    /// First value of `id`.
    pub fn get(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.values.get(&id).and_then(|values| values.first())
    }

    /// All values of `id` in arrival order.
    pub fn get_all(&self, id: PropertyId) -> &[PropertyValue] {
        self.values.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn remove(&mut self, id: PropertyId) -> Option<Vec<PropertyValue>> {
        self.values.remove(&id)
    }

    pub fn topic_alias(&self) -> Option<u16> {
        self.get(PropertyId::TopicAlias).and_then(PropertyValue::as_u16)
    }

    pub fn user_properties(&self) -> &UserProperties {
        &self.user_properties
    }

    pub fn user_properties_mut(&mut self) -> &mut UserProperties {
        &mut self.user_properties
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyValue)> {
        self.values
            .iter()
            .flat_map(|(id, values)| values.iter().map(move |v| (*id, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.user_properties.is_empty()
    }

    /// Reads a properties block, checking each identifier against `scope`.
    pub(crate) fn decode(
        reader: &mut Reader,
        scope: u32,
        context: &'static str,
    ) -> Result<Self, DecodeError> {
        let length = reader.read_varint("properties")? as usize;
        let mut block = reader.take(length, "properties")?;
        let mut properties = Properties::new();

        while !block.is_empty() {
            let code = block.read_u8("property code type")?;
            if code == 0 {
                return Err(DecodeError::Malformed("Cannot parse property code type"));
            }
            let id = PropertyId::from_code(code).ok_or(DecodeError::UnknownProperty(code))?;
            if !id.is_allowed_in(scope) {
                return Err(DecodeError::PropertyNotAllowed {
                    property: id,
                    context,
                });
            }

            let field = id.name();
            let value = match id.value_type() {
                PropertyType::Byte => PropertyValue::Bool(block.read_u8(field)? != 0),
                PropertyType::Int8 => PropertyValue::Byte(block.read_u8(field)?),
                PropertyType::Int16 => PropertyValue::U16(block.read_u16(field)?),
                PropertyType::Int32 => PropertyValue::U32(block.read_u32(field)?),
                PropertyType::Var => PropertyValue::VarInt(block.read_varint(field)?),
                PropertyType::String => PropertyValue::String(block.read_string(field)?),
                PropertyType::Binary => PropertyValue::Binary(block.read_binary(field)?),
                PropertyType::Pair => {
                    let name = block.read_string(field)?;
                    let value = block.read_string(field)?;
                    properties.user_properties.push(name, value);
                    continue;
                }
            };
            properties.values.entry(id).or_default().push(value);
        }

        Ok(properties)
    }

    /// Validates against `scope` and returns the block body length
    /// (excluding the length prefix).
    pub(crate) fn validate(&self, scope: u32, context: &'static str) -> Result<usize, EncodeError> {
        let mut length = 0usize;

        for (id, values) in &self.values {
            if !id.is_allowed_in(scope) {
                return Err(EncodeError::PropertyNotAllowed {
                    property: *id,
                    context,
                });
            }
            for value in values {
                if !value.matches(id.value_type()) {
                    return Err(EncodeError::PropertyType(*id));
                }
                match value {
                    PropertyValue::VarInt(v) if *v > VARBYTEINT_MAX => {
                        return Err(EncodeError::TooLarge {
                            field: id.name(),
                            size: *v as usize,
                            max: VARBYTEINT_MAX as usize,
                        });
                    }
                    PropertyValue::String(s) => check_len(s.len(), id.name())?,
                    PropertyValue::Binary(b) => check_len(b.len(), id.name())?,
                    _ => {}
                }
                length += 1 + value.encoded_len();
            }
        }

        if !self.user_properties.is_empty() {
            if !PropertyId::UserProperties.is_allowed_in(scope) {
                return Err(EncodeError::PropertyNotAllowed {
                    property: PropertyId::UserProperties,
                    context,
                });
            }
            for (name, value) in self.user_properties.iter() {
                check_len(name.len(), "userProperties")?;
                check_len(value.len(), "userProperties")?;
                length += 1 + 2 + name.len() + 2 + value.len();
            }
        }

        varint::check(length, "properties length")?;
        Ok(length)
    }

    /// Total encoded size including the length prefix, given the body length
    /// returned by [`Properties::validate`].
    pub(crate) fn framed_len(body_len: usize) -> usize {
        varint::encoded_len(body_len as u32) + body_len
    }

    /// Writes the block. `body_len` must come from [`Properties::validate`].
    pub(crate) fn write(&self, body_len: usize, buf: &mut BytesMut) {
        put_varint(buf, body_len as u32);
        for (id, value) in self.iter() {
            buf.put_u8(id.code());
            value.write(buf);
        }
        for (name, value) in self.user_properties.iter() {
            buf.put_u8(PropertyId::UserProperties.code());
            put_string(buf, name);
            put_string(buf, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{command_scope, Command, WILL_SCOPE};

    fn decode_block(bytes: &[u8], scope: u32) -> Result<Properties, DecodeError> {
        let mut reader = Reader::new(Bytes::copy_from_slice(bytes));
        Properties::decode(&mut reader, scope, "test")
    }

    #[test]
    fn test_push_rejects_wrong_type() {
        let mut props = Properties::new();
        assert!(props
            .push(PropertyId::TopicAlias, PropertyValue::U32(1))
            .is_err());
        assert!(props
            .push(PropertyId::UserProperties, PropertyValue::String("x".into()))
            .is_err());
        assert!(props.push(PropertyId::TopicAlias, PropertyValue::U16(1)).is_ok());
        assert_eq!(props.topic_alias(), Some(1));
    }

    #[test]
    fn test_repeated_property_accumulates() {
        // subscriptionIdentifier twice, then a user property pair twice
        let bytes = [
            12, // length
            11, 1, // subscriptionIdentifier = 1
            11, 0x80, 0x01, // subscriptionIdentifier = 128
            38, 0, 1, b'a', 0, 1, b'b', // a=b
        ];
        let props = decode_block(&bytes, command_scope(Command::Publish)).unwrap();
        assert_eq!(
            props.get_all(PropertyId::SubscriptionIdentifier),
            &[PropertyValue::VarInt(1), PropertyValue::VarInt(128)]
        );
        assert_eq!(props.user_properties().get("a"), Some(&["b".to_string()][..]));
    }

    #[test]
    fn test_user_properties_group_by_name() {
        let mut user = UserProperties::new();
        user.push("a", "1");
        user.push("b", "2");
        user.push("a", "3");
        assert_eq!(user.len(), 2);
        assert_eq!(user.get("a").unwrap(), &["1".to_string(), "3".to_string()]);
        let pairs: Vec<_> = user.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_unknown_property() {
        let err = decode_block(&[2, 4, 0], command_scope(Command::Publish)).unwrap_err();
        assert_eq!(err, DecodeError::UnknownProperty(4));
        assert_eq!(err.to_string(), "Unknown property: 4");
    }

    #[test]
    fn test_zero_property_code() {
        let err = decode_block(&[1, 0], command_scope(Command::Publish)).unwrap_err();
        assert_eq!(err.to_string(), "Cannot parse property code type");
    }

    #[test]
    fn test_property_not_allowed() {
        // topicAlias in a connect
        let err = decode_block(&[3, 35, 0, 1], command_scope(Command::Connect)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::PropertyNotAllowed {
                property: PropertyId::TopicAlias,
                ..
            }
        ));
    }

    #[test]
    fn test_block_overruns_packet() {
        let err = decode_block(&[10, 35, 0, 1], command_scope(Command::Publish)).unwrap_err();
        assert_eq!(err, DecodeError::Truncated("properties"));
    }

    #[test]
    fn test_truncated_value() {
        let err = decode_block(&[2, 35, 0], command_scope(Command::Publish)).unwrap_err();
        assert_eq!(err, DecodeError::Truncated("topicAlias"));
    }

    #[test]
    fn test_validate_and_write() {
        let props = Properties::new()
            .with(PropertyId::WillDelayInterval, PropertyValue::U32(10))
            .unwrap()
            .with_user_property("k", "v");

        assert!(matches!(
            props.validate(command_scope(Command::Connect), "connect"),
            Err(EncodeError::PropertyNotAllowed { .. })
        ));

        let len = props.validate(WILL_SCOPE, "will").unwrap();
        assert_eq!(len, 5 + 7);

        let mut buf = BytesMut::new();
        props.write(len, &mut buf);
        assert_eq!(
            &buf[..],
            &[12, 24, 0, 0, 0, 10, 38, 0, 1, b'k', 0, 1, b'v']
        );

        let decoded = decode_block(&buf, WILL_SCOPE).unwrap();
        assert_eq!(decoded, props);
    }

    #[test]
    fn test_varint_value_range() {
        let mut props = Properties::new();
        props
            .push(
                PropertyId::SubscriptionIdentifier,
                PropertyValue::VarInt(VARBYTEINT_MAX + 1),
            )
            .unwrap();
        assert!(matches!(
            props.validate(command_scope(Command::Publish), "publish"),
            Err(EncodeError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_block() {
        let props = Properties::new();
        assert_eq!(props.validate(0, "none").unwrap(), 0);
        let mut buf = BytesMut::new();
        props.write(0, &mut buf);
        assert_eq!(&buf[..], &[0]);
        assert!(decode_block(&[0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_properties_json() {
        let props = Properties::new()
            .with(PropertyId::ContentType, PropertyValue::String("text/plain".into()))
            .unwrap()
            .with_user_property("a", "b");
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "values": { "contentType": [ { "string": "text/plain" } ] },
                "userProperties": [ ["a", ["b"]] ]
            })
        );
    }
}
