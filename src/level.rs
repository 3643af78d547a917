//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::errors::{MDecodeErrorKind, MParseError};
use crate::MResult;

/// The negotiated protocol version, as sent in the CONNECT packet
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MProtocolLevel {
    V31 = 3,
    V311 = 4,
    V5 = 5,
}

impl MProtocolLevel {
    /// Only MQTT 5 carries properties in its variable headers
    pub fn has_properties(self) -> bool {
        self == MProtocolLevel::V5
    }

    pub fn protocol_name(self) -> &'static str {
        match self {
            MProtocolLevel::V31 => "MQIsdp",
            MProtocolLevel::V311 | MProtocolLevel::V5 => "MQTT",
        }
    }
}

pub fn mprotocollevel(input: &[u8]) -> MResult<'_, MProtocolLevel> {
    let (rest, level) = nom::number::complete::u8(input)?;

    let level = MProtocolLevel::try_from(level)
        .map_err(|_| MParseError::fail(input, MDecodeErrorKind::UnsupportedProtocolLevel(level)))?;

    Ok((rest, level))
}
