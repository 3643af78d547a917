//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use super::MEncodePacket;
use crate::header::MPacketInfo;
use crate::identifier::MPacketIdentifier;
use crate::level::MProtocolLevel;
use crate::properties::{optional_properties_binary_size, write_optional_properties, MProperties};
use crate::reason_code::MReasonCode;
use crate::write::{WResult, WriteMqttPacket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSuback {
    pub packet_identifier: MPacketIdentifier,
    pub properties: Option<MProperties>,
    /// One per requested subscription, in the same order
    pub return_codes: Vec<MReasonCode>,
}

impl MSuback {
    pub fn new(
        packet_identifier: MPacketIdentifier,
        protocol_level: MProtocolLevel,
        return_codes: Vec<MReasonCode>,
    ) -> MSuback {
        MSuback {
            packet_identifier,
            properties: protocol_level.has_properties().then(MProperties::new),
            return_codes,
        }
    }
}

impl MEncodePacket for MSuback {
    fn packet_info(&self) -> MPacketInfo {
        MPacketInfo::Suback
    }

    fn binary_size(&self) -> usize {
        self.packet_identifier.binary_size()
            + optional_properties_binary_size(&self.properties)
            + self.return_codes.len()
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        write_optional_properties(buffer, &self.properties)?;

        for code in &self.return_codes {
            code.write(buffer)?;
        }

        Ok(())
    }
}
