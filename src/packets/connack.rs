//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use super::MEncodePacket;
use crate::header::MPacketInfo;
use crate::level::MProtocolLevel;
use crate::properties::{optional_properties_binary_size, write_optional_properties, MProperties};
use crate::reason_code::MReasonCode;
use crate::write::{WResult, WriteMqttPacket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MConnack {
    pub session_present: bool,
    pub reason_code: MReasonCode,
    pub properties: Option<MProperties>,
}

impl MConnack {
    pub fn accepted(protocol_level: MProtocolLevel, session_present: bool) -> MConnack {
        MConnack {
            session_present,
            reason_code: MReasonCode::SUCCESS,
            properties: protocol_level.has_properties().then(MProperties::new),
        }
    }

    /// [MQTT-3.2.2-4] a refused connection never has a session
    pub fn refused(protocol_level: MProtocolLevel, reason_code: MReasonCode) -> MConnack {
        MConnack {
            session_present: false,
            reason_code,
            properties: protocol_level.has_properties().then(MProperties::new),
        }
    }
}

impl MEncodePacket for MConnack {
    fn packet_info(&self) -> MPacketInfo {
        MPacketInfo::Connack
    }

    fn binary_size(&self) -> usize {
        2 + optional_properties_binary_size(&self.properties)
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(self.session_present as u8)?;
        self.reason_code.write(buffer)?;
        write_optional_properties(buffer, &self.properties)
    }
}
