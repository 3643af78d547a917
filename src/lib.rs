//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Encoding and decoding of MQTT Control Packets
//!
//! All decoders are parsers over complete byte slices. The stream based entry
//! points ([`MFixedHeader::read_from`], [`MPacket::decode`] and
//! [`MPacket::read_from`]) buffer exactly the span announced by the fixed header
//! before handing it to them.

pub mod codecs;
pub mod errors;
pub mod header;
pub mod identifier;
pub mod integers;
pub mod level;
pub mod packets;
pub mod properties;
pub mod qos;
pub mod reason_code;
pub mod strings;
pub mod write;

pub use codecs::{MPacketCodec, MPacketCodecError};
pub use errors::{MDecodeError, MDecodeErrorKind, MPacketWriteError};
pub use header::{MFixedHeader, MPacketInfo, MPacketKind, MPublishFlags};
pub use identifier::MPacketIdentifier;
pub use level::MProtocolLevel;
pub use packets::MPacket;
pub use properties::{MProperties, MUserProperty};
pub use qos::MQualityOfService;
pub use reason_code::MReasonCode;

pub type MResult<'i, T> = nom::IResult<&'i [u8], T, errors::MParseError<'i>>;

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use crate::errors::{MDecodeError, MPacketWriteError};
    use crate::packets::MPacket;
    use crate::MPacketCodec;

    assert_impl_all!(MPacket: Send, Sync);
    assert_impl_all!(MDecodeError: Send, Sync);
    assert_impl_all!(MPacketWriteError: Send, Sync);
    assert_impl_all!(MPacketCodec: Send, Sync);
}
