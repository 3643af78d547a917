//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! MQTT 5 properties
//!
//! A property block is a variable sized length followed by that many bytes of
//! `(identifier, value)` entries. User properties are kept in the order they
//! appeared in, every other defined property is skipped over.

use nom::bytes::complete::take;

use crate::errors::{MDecodeErrorKind, MParseError};
use crate::integers::{mu16, mu32, mvariable_u32, variable_u32_binary_size, write_variable_u32};
use crate::level::MProtocolLevel;
use crate::strings::{mbinary, mstring, string_binary_size, write_string};
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MPropertyIdentifier {
    PayloadFormatIndicator = 0x01,
    MessageExpiryInterval = 0x02,
    ContentType = 0x03,
    ResponseTopic = 0x08,
    CorrelationData = 0x09,
    SubscriptionIdentifier = 0x0B,
    SessionExpiryInterval = 0x11,
    AssignedClientIdentifier = 0x12,
    ServerKeepAlive = 0x13,
    AuthenticationMethod = 0x15,
    AuthenticationData = 0x16,
    RequestProblemInformation = 0x17,
    WillDelayInterval = 0x18,
    RequestResponseInformation = 0x19,
    ResponseInformation = 0x1A,
    ServerReference = 0x1C,
    ReasonString = 0x1F,
    ReceiveMaximum = 0x21,
    TopicAliasMaximum = 0x22,
    TopicAlias = 0x23,
    MaximumQoS = 0x24,
    RetainAvailable = 0x25,
    UserProperty = 0x26,
    MaximumPacketSize = 0x27,
    WildcardSubscriptionAvailable = 0x28,
    SubscriptionIdentifiersAvailable = 0x29,
    SharedSubscriptionAvailable = 0x2A,
}

pub const USER_PROPERTY_ID: u8 = MPropertyIdentifier::UserProperty as u8;

impl MPropertyIdentifier {
    /// Consumes the value of a property that is not retained
    fn skip_value(self, input: &[u8]) -> MResult<'_, ()> {
        use MPropertyIdentifier::*;

        let (input, ()) = match self {
            PayloadFormatIndicator
            | RequestProblemInformation
            | RequestResponseInformation
            | MaximumQoS
            | RetainAvailable
            | WildcardSubscriptionAvailable
            | SubscriptionIdentifiersAvailable
            | SharedSubscriptionAvailable => take(1usize)(input).map(|(i, _)| (i, ()))?,
            ReceiveMaximum | TopicAliasMaximum | TopicAlias | ServerKeepAlive => {
                mu16(input).map(|(i, _)| (i, ()))?
            }
            MessageExpiryInterval
            | SessionExpiryInterval
            | WillDelayInterval
            | MaximumPacketSize => mu32(input).map(|(i, _)| (i, ()))?,
            SubscriptionIdentifier => mvariable_u32(input).map(|(i, _)| (i, ()))?,
            ContentType
            | ResponseTopic
            | AssignedClientIdentifier
            | AuthenticationMethod
            | ResponseInformation
            | ServerReference
            | ReasonString => mstring(input).map(|(i, _)| (i, ()))?,
            CorrelationData | AuthenticationData => mbinary(input).map(|(i, _)| (i, ()))?,
            UserProperty => {
                let (input, _) = mstring(input)?;
                mstring(input).map(|(i, _)| (i, ()))?
            }
        };

        Ok((input, ()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MUserProperty {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MProperties {
    pub user_properties: Vec<MUserProperty>,
}

impl MProperties {
    pub fn new() -> MProperties {
        MProperties::default()
    }

    pub fn with_user_property(mut self, key: impl Into<String>, value: impl Into<String>) -> MProperties {
        self.user_properties.push(MUserProperty {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_properties.is_empty()
    }

    fn content_size(&self) -> usize {
        self.user_properties
            .iter()
            .map(|p| 1 + string_binary_size(&p.key) + string_binary_size(&p.value))
            .sum()
    }

    /// Size including the leading property length
    pub fn binary_size(&self) -> usize {
        let content = self.content_size();
        variable_u32_binary_size(content as u32) + content
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_variable_u32(buffer, self.content_size() as u32)?;

        for property in &self.user_properties {
            buffer.write_byte(USER_PROPERTY_ID)?;
            write_string(buffer, &property.key)?;
            write_string(buffer, &property.value)?;
        }

        Ok(())
    }
}

/// Reports values running past the end of the property block as a length mismatch
fn within_block<'i, O>(
    result: MResult<'i, O>,
    entry: &'i [u8],
    property_length: u32,
) -> MResult<'i, O> {
    result.map_err(|e| match e {
        nom::Err::Error(MParseError {
            kind: MDecodeErrorKind::Truncated,
            ..
        }) => MParseError::fail(
            entry,
            MDecodeErrorKind::PropertiesLengthMismatch(property_length),
        ),
        other => other,
    })
}

/// Parses the entries of a property block whose length is already known
///
/// `input` has to be exactly the declared span. A value running past its
/// end is a [`MDecodeErrorKind::PropertiesLengthMismatch`].
pub fn mproperties_content(input: &[u8], property_length: u32) -> MResult<'_, MProperties> {
    let mut properties = MProperties::new();
    let mut cursor = input;

    while let Some((&id_byte, value)) = cursor.split_first() {
        let id = MPropertyIdentifier::try_from(id_byte).map_err(|_| {
            MParseError::fail(cursor, MDecodeErrorKind::UnknownPropertyIdentifier(id_byte))
        })?;

        cursor = if id == MPropertyIdentifier::UserProperty {
            let (rest, key) = within_block(mstring(value), cursor, property_length)?;
            let (rest, value) = within_block(mstring(rest), cursor, property_length)?;

            properties.user_properties.push(MUserProperty { key, value });
            rest
        } else {
            tracing::trace!(?id, "Skipping property");
            within_block(id.skip_value(value), cursor, property_length)?.0
        };
    }

    Ok((cursor, properties))
}

/// Parses a complete property block, starting at its variable sized length
pub fn mproperties(input: &[u8]) -> MResult<'_, MProperties> {
    let (input, property_length) = mvariable_u32(input)?;
    let (input, content) = take(property_length)(input)?;
    let (_, properties) = mproperties_content(content, property_length)?;

    Ok((input, properties))
}

/// Parses a property block only if the protocol level carries one
pub fn moptional_properties(
    input: &[u8],
    level: MProtocolLevel,
) -> MResult<'_, Option<MProperties>> {
    if level.has_properties() {
        let (input, properties) = mproperties(input)?;
        Ok((input, Some(properties)))
    } else {
        Ok((input, None))
    }
}

pub fn optional_properties_binary_size(properties: &Option<MProperties>) -> usize {
    properties.as_ref().map(MProperties::binary_size).unwrap_or(0)
}

pub fn write_optional_properties<W: WriteMqttPacket>(
    buffer: &mut W,
    properties: &Option<MProperties>,
) -> WResult<W> {
    match properties {
        Some(properties) => properties.write(buffer),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{mproperties, MProperties, MUserProperty};
    use crate::errors::MDecodeErrorKind;

    #[test]
    fn check_empty_properties() {
        let (rest, props) = mproperties(&[0x00, 0xAA]).unwrap();

        assert_eq!(rest, &[0xAA]);
        assert!(props.is_empty());
    }

    #[test]
    fn check_all_user_properties_are_kept() {
        let input = &[
            17, // Property length
            0x26, 0, 1, b'a', 0, 1, b'b', // a=b
            0x0B, 0x05, // Subscription identifier, skipped
            0x26, 0, 2, b'c', b'd', 0, 1, b'e', // cd=e
            0xFF, // Not part of the properties
        ];

        let (rest, props) = mproperties(input).unwrap();

        assert_eq!(rest, &[0xFF]);
        assert_eq!(
            props.user_properties,
            vec![
                MUserProperty {
                    key: "a".into(),
                    value: "b".into()
                },
                MUserProperty {
                    key: "cd".into(),
                    value: "e".into()
                },
            ]
        );
    }

    #[test]
    fn check_value_running_past_property_length() {
        let input = &[
            4, // Property length
            0x26, 0, 1, b'a', 0, 1, b'b',
        ];

        match mproperties(input).unwrap_err() {
            nom::Err::Failure(e) => assert!(matches!(
                e.kind(),
                MDecodeErrorKind::PropertiesLengthMismatch(4)
            )),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_declared_length_longer_than_input() {
        let input = &[10, 0x26, 0, 1];

        match mproperties(input).unwrap_err() {
            nom::Err::Error(e) => assert!(matches!(e.kind(), MDecodeErrorKind::Truncated)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_unknown_property_identifier() {
        let input = &[2, 0x04, 0x00];

        match mproperties(input).unwrap_err() {
            nom::Err::Failure(e) => assert!(matches!(
                e.kind(),
                MDecodeErrorKind::UnknownPropertyIdentifier(0x04)
            )),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_written_properties_parse_back() {
        let props = MProperties::new()
            .with_user_property("region", "eu")
            .with_user_property("region", "us");

        let mut buffer = Vec::new();
        props.write(&mut buffer).unwrap();

        assert_eq!(buffer.len(), props.binary_size());
        assert_eq!(mproperties(&buffer).unwrap().1, props);
    }
}
