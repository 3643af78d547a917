//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::{number::complete::u8 as nom_u8, Parser};

use crate::qos::MQualityOfService;
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

/// A return or reason code, as found in acknowledgements and DISCONNECT
///
/// MQTT 3 only knows the CONNACK return codes `0..=5`, MQTT 5 shares one
/// table of reason codes between all packets. Codes are kept as sent, the
/// meaning depends on the packet they arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MReasonCode(pub u8);

macro_rules! define_reason_codes {
    ($($name:ident => $code:literal),* $(,)?) => {
        impl MReasonCode {
            $( pub const $name: MReasonCode = MReasonCode($code); )*
        }
    };
}

define_reason_codes! {
    SUCCESS => 0x00,
    NORMAL_DISCONNECTION => 0x00,
    GRANTED_QOS_0 => 0x00,
    GRANTED_QOS_1 => 0x01,
    GRANTED_QOS_2 => 0x02,
    DISCONNECT_WITH_WILL_MESSAGE => 0x04,
    REFUSED_PROTOCOL_VERSION => 0x01,
    REFUSED_IDENTIFIER_REJECTED => 0x02,
    REFUSED_SERVER_UNAVAILABLE => 0x03,
    REFUSED_BAD_USERNAME_PASSWORD => 0x04,
    REFUSED_NOT_AUTHORIZED => 0x05,
    NO_MATCHING_SUBSCRIBERS => 0x10,
    NO_SUBSCRIPTION_EXISTED => 0x11,
    UNSPECIFIED_ERROR => 0x80,
    MALFORMED_PACKET => 0x81,
    PROTOCOL_ERROR => 0x82,
    IMPLEMENTATION_SPECIFIC_ERROR => 0x83,
    UNSUPPORTED_PROTOCOL_VERSION => 0x84,
    CLIENT_IDENTIFIER_NOT_VALID => 0x85,
    BAD_USERNAME_OR_PASSWORD => 0x86,
    NOT_AUTHORIZED => 0x87,
    SERVER_UNAVAILABLE => 0x88,
    SERVER_BUSY => 0x89,
    PACKET_IDENTIFIER_IN_USE => 0x91,
    PACKET_IDENTIFIER_NOT_FOUND => 0x92,
    PACKET_TOO_LARGE => 0x95,
    QUOTA_EXCEEDED => 0x97,
    PAYLOAD_FORMAT_INVALID => 0x99,
}

impl MReasonCode {
    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte(self.0)
    }
}

/// The SUBACK code granting a subscription at the given QoS
impl From<MQualityOfService> for MReasonCode {
    fn from(qos: MQualityOfService) -> MReasonCode {
        MReasonCode(qos.into())
    }
}

pub fn mreasoncode(input: &[u8]) -> MResult<'_, MReasonCode> {
    nom_u8.map(MReasonCode).parse(input)
}
