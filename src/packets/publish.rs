//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::combinator::rest;

use super::{MDecodeContext, MDecodePacket, MEncodePacket};
use crate::errors::{MDecodeErrorKind, MPacketWriteError, MParseError};
use crate::header::{MPacketInfo, MPublishFlags};
use crate::identifier::{mpacketidentifier, MPacketIdentifier};
use crate::properties::{
    moptional_properties, optional_properties_binary_size, write_optional_properties,
    MProperties,
};
use crate::qos::MQualityOfService;
use crate::strings::{mstring, string_binary_size, write_string};
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MPublish {
    pub flags: MPublishFlags,
    pub topic_name: String,
    /// Only present for QoS 1 and 2
    pub id: Option<MPacketIdentifier>,
    pub properties: Option<MProperties>,
    pub payload: Vec<u8>,
}

impl MDecodePacket for MPublish {
    fn parse(context: MDecodeContext, input: &[u8]) -> MResult<'_, MPublish> {
        let flags = match context.info {
            MPacketInfo::Publish(flags) => flags,
            other => {
                return Err(MParseError::fail(
                    input,
                    MDecodeErrorKind::InvalidPacketType(other.kind().into()),
                ))
            }
        };

        // [MQTT-3.3.1-2]
        if flags.dup && flags.qos == MQualityOfService::AtMostOnce {
            return Err(MParseError::fail(input, MDecodeErrorKind::InvalidDupFlag));
        }

        let (input, topic_name) = mstring(input)?;

        let (input, id) = if flags.qos != MQualityOfService::AtMostOnce {
            let (input, id) = mpacketidentifier(input)?;
            (input, Some(id))
        } else {
            (input, None)
        };

        let (input, properties) = moptional_properties(input, context.protocol_level)?;

        let (input, payload) = rest(input)?;

        Ok((
            input,
            MPublish {
                flags,
                topic_name,
                id,
                properties,
                payload: payload.to_vec(),
            },
        ))
    }
}

impl MEncodePacket for MPublish {
    fn packet_info(&self) -> MPacketInfo {
        MPacketInfo::Publish(self.flags)
    }

    fn binary_size(&self) -> usize {
        string_binary_size(&self.topic_name)
            + self.id.as_ref().map(MPacketIdentifier::binary_size).unwrap_or(0)
            + optional_properties_binary_size(&self.properties)
            + self.payload.len()
    }

    fn validate(&self) -> Result<(), MPacketWriteError> {
        let needs_id = self.flags.qos != MQualityOfService::AtMostOnce;

        if self.id.is_some() != needs_id {
            return Err(MPacketWriteError::InconsistentPacketIdentifier(self.flags.qos));
        }

        Ok(())
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_string(buffer, &self.topic_name)?;

        if let Some(id) = &self.id {
            id.write(buffer)?;
        }

        write_optional_properties(buffer, &self.properties)?;
        buffer.write_slice(&self.payload)
    }
}
