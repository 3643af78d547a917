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
use crate::write::{WResult, WriteMqttPacket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MUnsuback {
    pub packet_identifier: MPacketIdentifier,
    pub properties: Option<MProperties>,
    /// One per topic filter of the acknowledged UNSUBSCRIBE, in the same order
    pub return_codes: Vec<u8>,
}

impl MUnsuback {
    /// At MQTT 5 an empty property block is written
    pub fn new(
        packet_identifier: MPacketIdentifier,
        protocol_level: MProtocolLevel,
        return_codes: Vec<u8>,
    ) -> MUnsuback {
        MUnsuback {
            packet_identifier,
            properties: protocol_level.has_properties().then(MProperties::new),
            return_codes,
        }
    }
}

impl MEncodePacket for MUnsuback {
    fn packet_info(&self) -> MPacketInfo {
        MPacketInfo::Unsuback
    }

    fn binary_size(&self) -> usize {
        self.packet_identifier.binary_size()
            + optional_properties_binary_size(&self.properties)
            + self.return_codes.len()
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.packet_identifier.write(buffer)?;
        write_optional_properties(buffer, &self.properties)?;
        buffer.write_slice(&self.return_codes)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::MUnsuback;
    use crate::errors::MDecodeErrorKind;
    use crate::header::MPacketKind;
    use crate::identifier::MPacketIdentifier;
    use crate::level::MProtocolLevel;
    use crate::packets::{MEncodePacket, MPacket};

    #[test]
    fn check_remaining_length_per_level() {
        let codes = vec![0x00, 0x11, 0x80];

        for level in [MProtocolLevel::V31, MProtocolLevel::V311] {
            let unsuback = MUnsuback::new(MPacketIdentifier(1), level, codes.clone());
            assert_eq!(unsuback.binary_size(), 2 + codes.len());
        }

        let unsuback = MUnsuback::new(MPacketIdentifier(1), MProtocolLevel::V5, codes.clone());
        assert_eq!(unsuback.binary_size(), 3 + codes.len());
    }

    #[test]
    fn check_unsuback_bytes() {
        let v3 = MUnsuback::new(MPacketIdentifier(0x0102), MProtocolLevel::V311, vec![0x00]);
        assert_eq!(
            MPacket::from(v3).encode().unwrap(),
            vec![0xB0, 0x03, 0x01, 0x02, 0x00]
        );

        let v5 = MUnsuback::new(MPacketIdentifier(0x0102), MProtocolLevel::V5, vec![0x00, 0x11]);
        assert_eq!(
            MPacket::from(v5).encode().unwrap(),
            vec![0xB0, 0x05, 0x01, 0x02, 0x00, 0x00, 0x11]
        );
    }

    #[test]
    fn check_unsuback_cannot_be_decoded() {
        let err = MPacket::parse_complete(&[0xB0, 0x03, 0x01, 0x02, 0x00], MProtocolLevel::V311)
            .unwrap_err();

        assert!(matches!(
            err.kind,
            MDecodeErrorKind::DecodeUnsupported(MPacketKind::Unsuback)
        ));
    }
}
