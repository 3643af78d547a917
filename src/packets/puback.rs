//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! PUBACK, and the shared layout of all publish acknowledgements
//!
//! At MQTT 5 the reason code and the properties may be left out. A body of
//! only the packet identifier means success.

use crate::identifier::{mpacketidentifier, MPacketIdentifier};
use crate::level::MProtocolLevel;
use crate::properties::{mproperties, MProperties};
use crate::reason_code::{mreasoncode, MReasonCode};
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

pub(crate) fn mackbody(
    input: &[u8],
    level: MProtocolLevel,
) -> MResult<'_, (MPacketIdentifier, MReasonCode, MProperties)> {
    let (input, id) = mpacketidentifier(input)?;

    if !level.has_properties() || input.is_empty() {
        return Ok((input, (id, MReasonCode::SUCCESS, MProperties::new())));
    }

    let (input, reason_code) = mreasoncode(input)?;

    if input.is_empty() {
        return Ok((input, (id, reason_code, MProperties::new())));
    }

    let (input, properties) = mproperties(input)?;

    Ok((input, (id, reason_code, properties)))
}

fn has_short_form(reason_code: MReasonCode, properties: &MProperties) -> bool {
    reason_code == MReasonCode::SUCCESS && properties.is_empty()
}

pub(crate) fn ack_body_size(reason_code: MReasonCode, properties: &MProperties) -> usize {
    if has_short_form(reason_code, properties) {
        2
    } else if properties.is_empty() {
        3
    } else {
        3 + properties.binary_size()
    }
}

pub(crate) fn write_ack_body<W: WriteMqttPacket>(
    buffer: &mut W,
    id: MPacketIdentifier,
    reason_code: MReasonCode,
    properties: &MProperties,
) -> WResult<W> {
    id.write(buffer)?;

    if has_short_form(reason_code, properties) {
        return Ok(());
    }

    reason_code.write(buffer)?;

    if !properties.is_empty() {
        properties.write(buffer)?;
    }

    Ok(())
}

macro_rules! define_ack_packet {
    ($(#[$meta:meta])* $name:ident => $info:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub packet_identifier: $crate::identifier::MPacketIdentifier,
            /// Always success below MQTT 5
            pub reason_code: $crate::reason_code::MReasonCode,
            pub properties: $crate::properties::MProperties,
        }

        impl $name {
            pub fn new(packet_identifier: $crate::identifier::MPacketIdentifier) -> $name {
                $name {
                    packet_identifier,
                    reason_code: $crate::reason_code::MReasonCode::SUCCESS,
                    properties: $crate::properties::MProperties::new(),
                }
            }
        }

        impl $crate::packets::MDecodePacket for $name {
            fn parse(
                context: $crate::packets::MDecodeContext,
                input: &[u8],
            ) -> $crate::MResult<'_, $name> {
                let (input, (packet_identifier, reason_code, properties)) =
                    $crate::packets::puback::mackbody(input, context.protocol_level)?;

                Ok((
                    input,
                    $name {
                        packet_identifier,
                        reason_code,
                        properties,
                    },
                ))
            }
        }

        impl $crate::packets::MEncodePacket for $name {
            fn packet_info(&self) -> $crate::header::MPacketInfo {
                $crate::header::MPacketInfo::$info
            }

            fn binary_size(&self) -> usize {
                $crate::packets::puback::ack_body_size(self.reason_code, &self.properties)
            }

            fn write<W: $crate::write::WriteMqttPacket>(
                &self,
                buffer: &mut W,
            ) -> $crate::write::WResult<W> {
                $crate::packets::puback::write_ack_body(
                    buffer,
                    self.packet_identifier,
                    self.reason_code,
                    &self.properties,
                )
            }
        }
    };
}

pub(crate) use define_ack_packet;

define_ack_packet! {
    /// Acknowledges a QoS 1 PUBLISH
    MPuback => Puback
}
