//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use super::{MDecodeContext, MDecodePacket};
use crate::properties::{mproperties, MProperties};
use crate::reason_code::{mreasoncode, MReasonCode};
use crate::MResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MDisconnect {
    /// Always a normal disconnection below MQTT 5
    pub reason_code: MReasonCode,
    pub properties: MProperties,
}

impl MDecodePacket for MDisconnect {
    fn parse(context: MDecodeContext, input: &[u8]) -> MResult<'_, MDisconnect> {
        let mut disconnect = MDisconnect {
            reason_code: MReasonCode::NORMAL_DISCONNECTION,
            properties: MProperties::new(),
        };

        if !context.protocol_level.has_properties() || input.is_empty() {
            return Ok((input, disconnect));
        }

        let (input, reason_code) = mreasoncode(input)?;
        disconnect.reason_code = reason_code;

        if input.is_empty() {
            return Ok((input, disconnect));
        }

        let (input, properties) = mproperties(input)?;
        disconnect.properties = properties;

        Ok((input, disconnect))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::MDisconnect;
    use crate::errors::MDecodeErrorKind;
    use crate::level::MProtocolLevel;
    use crate::packets::MPacket;
    use crate::properties::MProperties;
    use crate::reason_code::MReasonCode;

    #[test]
    fn check_disconnect() {
        let expected = MPacket::Disconnect(MDisconnect {
            reason_code: MReasonCode::NORMAL_DISCONNECTION,
            properties: MProperties::new(),
        });

        assert_eq!(
            MPacket::parse_complete(&[0xE0, 0x00], MProtocolLevel::V311).unwrap(),
            expected
        );
        assert_eq!(
            MPacket::parse_complete(&[0xE0, 0x00], MProtocolLevel::V5).unwrap(),
            expected
        );
    }

    #[test]
    fn check_v5_disconnect_with_will() {
        let input = &[0xE0, 0x09, 0x04, 7, 0x26, 0, 1, b'k', 0, 1, b'v'];

        assert_eq!(
            MPacket::parse_complete(input, MProtocolLevel::V5).unwrap(),
            MPacket::Disconnect(MDisconnect {
                reason_code: MReasonCode::DISCONNECT_WITH_WILL_MESSAGE,
                properties: MProperties::new().with_user_property("k", "v"),
            })
        );
    }

    #[test]
    fn check_v3_disconnect_with_body() {
        let err = MPacket::parse_complete(&[0xE0, 0x01, 0x04], MProtocolLevel::V311).unwrap_err();

        assert!(matches!(
            err.kind,
            MDecodeErrorKind::RemainingLengthMismatch { .. }
        ));
    }
}
