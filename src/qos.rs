//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::errors::MDecodeErrorKind;

/// Delivery guarantee of a message
///
/// `AtMostOnce` is the "no guarantee" level, sometimes called QoS None.
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MQualityOfService {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

/// Interprets the two QoS bits found in PUBLISH headers and CONNECT will flags
pub fn mquality_of_service(lower: u8) -> Result<MQualityOfService, MDecodeErrorKind> {
    MQualityOfService::try_from(lower)
        .map_err(|_| MDecodeErrorKind::InvalidQualityOfService(lower))
}

/// Interprets the requested QoS byte of a SUBSCRIBE payload entry
///
/// Bits 7-2 are reserved, and the two QoS bits are mutually exclusive.
pub fn msubscription_qos(byte: u8) -> Result<MQualityOfService, MDecodeErrorKind> {
    if byte & 0b1111_1100 != 0 {
        return Err(MDecodeErrorKind::ReservedBitsSet(byte));
    }

    match (byte & 0b01 != 0, byte & 0b10 != 0) {
        (true, true) => Err(MDecodeErrorKind::InvalidQoSEncoding(byte)),
        (true, false) => Ok(MQualityOfService::AtLeastOnce),
        (false, true) => Ok(MQualityOfService::ExactlyOnce),
        (false, false) => Ok(MQualityOfService::AtMostOnce),
    }
}
