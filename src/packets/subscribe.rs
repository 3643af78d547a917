//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::number::complete::u8 as nom_u8;

use super::{MDecodeContext, MDecodePacket};
use crate::errors::{MDecodeErrorKind, MParseError};
use crate::identifier::{mpacketidentifier, MPacketIdentifier};
use crate::level::MProtocolLevel;
use crate::properties::{moptional_properties, MProperties};
use crate::qos::{msubscription_qos, MQualityOfService};
use crate::strings::mstring;
use crate::MResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSubscribeHeader {
    pub id: MPacketIdentifier,
    /// Only present at MQTT 5
    pub properties: Option<MProperties>,
}

pub fn msubscribevariableheader(
    input: &[u8],
    level: MProtocolLevel,
) -> MResult<'_, MSubscribeHeader> {
    let (input, id) = mpacketidentifier(input)?;
    let (input, properties) = moptional_properties(input, level)?;

    Ok((input, MSubscribeHeader { id, properties }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSubscription {
    pub topic: String,
    pub qos: MQualityOfService,
}

fn msubscription(input: &[u8]) -> MResult<'_, MSubscription> {
    let (input, topic) = mstring(input)?;
    let (rest, byte) = nom_u8(input)?;

    let qos = msubscription_qos(byte).map_err(|kind| MParseError::fail(input, kind))?;

    Ok((rest, MSubscription { topic, qos }))
}

/// Parses subscriptions until the input is exhausted
///
/// `input` is the remainder of the packet after the variable header, so the
/// loop ends exactly at the remaining length.
pub fn msubscribepayload(input: &[u8]) -> MResult<'_, Vec<MSubscription>> {
    let mut subscriptions = Vec::new();
    let mut input = input;

    while !input.is_empty() {
        let (rest, subscription) = msubscription(input)?;
        subscriptions.push(subscription);
        input = rest;
    }

    Ok((input, subscriptions))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSubscribe {
    pub header: MSubscribeHeader,
    pub subscriptions: Vec<MSubscription>,
}

impl MDecodePacket for MSubscribe {
    fn parse(context: MDecodeContext, input: &[u8]) -> MResult<'_, MSubscribe> {
        let (input, header) = msubscribevariableheader(input, context.protocol_level)?;

        // [MQTT-3.8.3-3]
        if input.is_empty() {
            return Err(MParseError::fail(input, MDecodeErrorKind::NoTopicFilters));
        }

        let (input, subscriptions) = msubscribepayload(input)?;

        Ok((
            input,
            MSubscribe {
                header,
                subscriptions,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{msubscribepayload, msubscribevariableheader, MSubscription};
    use crate::errors::MDecodeErrorKind;
    use crate::identifier::MPacketIdentifier;
    use crate::level::MProtocolLevel;
    use crate::packets::MPacket;
    use crate::properties::MProperties;
    use crate::qos::MQualityOfService;

    fn subscription(topic: &str, qos: MQualityOfService) -> MSubscription {
        MSubscription {
            topic: topic.into(),
            qos,
        }
    }

    #[test]
    fn check_variable_header() {
        let (rest, header) = msubscribevariableheader(&[0x00, 0x0A, 0xFF], MProtocolLevel::V311)
            .unwrap();

        assert_eq!(rest, &[0xFF]);
        assert_eq!(header.id, MPacketIdentifier(10));
        assert_eq!(header.properties, None);

        let input = &[0x00, 0x0A, 7, 0x26, 0, 1, b'k', 0, 1, b'v'];
        let (rest, header) = msubscribevariableheader(input, MProtocolLevel::V5).unwrap();

        assert!(rest.is_empty());
        assert_eq!(
            header.properties,
            Some(MProperties::new().with_user_property("k", "v"))
        );
    }

    #[test]
    fn check_payload_stops_at_remaining_length() {
        let input = &[
            0, 3, b'a', b'/', b'b', 0x01, //
            0, 1, b'#', 0x02, //
            0, 1, b'c', 0x00,
        ];

        // Only the first two subscriptions fit into the span
        let (rest, subscriptions) = msubscribepayload(&input[..10]).unwrap();

        assert!(rest.is_empty());
        assert_eq!(
            subscriptions,
            vec![
                subscription("a/b", MQualityOfService::AtLeastOnce),
                subscription("#", MQualityOfService::ExactlyOnce),
            ]
        );

        let (_, subscriptions) = msubscribepayload(input).unwrap();
        assert_eq!(subscriptions.len(), 3);
        assert_eq!(subscriptions[2], subscription("c", MQualityOfService::AtMostOnce));
    }

    #[test]
    fn check_invalid_qos_bytes() {
        match msubscribepayload(&[0, 1, b'a', 0b0000_0100]).unwrap_err() {
            nom::Err::Failure(e) => {
                assert!(matches!(e.kind(), MDecodeErrorKind::ReservedBitsSet(0b0000_0100)))
            }
            other => panic!("unexpected error: {other:?}"),
        }

        match msubscribepayload(&[0, 1, b'a', 0b0000_0011]).unwrap_err() {
            nom::Err::Failure(e) => {
                assert!(matches!(e.kind(), MDecodeErrorKind::InvalidQoSEncoding(3)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_subscribe_packet() {
        let input = &[0x82, 0x06, 0x00, 0x01, 0x00, 0x01, b't', 0x01];

        match MPacket::parse_complete(input, MProtocolLevel::V311).unwrap() {
            MPacket::Subscribe(subscribe) => {
                assert_eq!(subscribe.header.id, MPacketIdentifier(1));
                assert_eq!(
                    subscribe.subscriptions,
                    vec![subscription("t", MQualityOfService::AtLeastOnce)]
                );
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn check_partial_consumption_is_reported() {
        // The second subscription has a reserved bit set in its QoS byte
        let input = &[0x82, 0x0A, 0x00, 0x01, 0x00, 0x01, b't', 0x01, 0x00, 0x01, b'u', 0x80];

        let err = MPacket::parse_complete(input, MProtocolLevel::V311).unwrap_err();

        assert!(matches!(err.kind, MDecodeErrorKind::ReservedBitsSet(0x80)));
        assert_eq!(err.consumed, 11);
    }

    #[test]
    fn check_subscribe_without_topic_filters() {
        let err = MPacket::parse_complete(&[0x82, 0x02, 0x00, 0x01], MProtocolLevel::V311)
            .unwrap_err();

        assert!(matches!(err.kind, MDecodeErrorKind::NoTopicFilters));
    }
}
