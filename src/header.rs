//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Everything around parsing the fixed MQTT Header

use std::io::Read;

use crate::errors::{MDecodeError, MDecodeErrorKind, MPacketWriteError, MParseError};
use crate::integers::{mvariable_u32, variable_u32_binary_size, write_variable_u32, VARIABLE_INTEGER_MAX};
use crate::qos::{mquality_of_service, MQualityOfService};
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

/// The MQTT Control Packet types, with their numeric code
///
/// `0` is reserved and never a valid packet type.
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MPacketKind {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
    Auth = 15,
}

impl MPacketKind {
    /// The flags all packet types but PUBLISH are required to carry
    pub fn reserved_flags(self) -> u8 {
        match self {
            MPacketKind::Pubrel | MPacketKind::Subscribe | MPacketKind::Unsubscribe => 0b0010,
            _ => 0b0000,
        }
    }
}

/// The flags in the lower nibble of a PUBLISH fixed header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MPublishFlags {
    pub dup: bool,
    pub qos: MQualityOfService,
    pub retain: bool,
}

impl MPublishFlags {
    pub fn to_bits(self) -> u8 {
        let dup = (self.dup as u8) << 3;
        let qos = u8::from(self.qos) << 1;
        let retain = self.retain as u8;

        dup | qos | retain
    }
}

/// Splits the PUBLISH header flags into their parts
///
/// Bit 0 is RETAIN, bits 1-2 are the QoS and bit 3 is DUP. Only the lower four bits are inspected.
pub fn interpret_publish_header_flags(flags: u8) -> Result<MPublishFlags, MDecodeErrorKind> {
    Ok(MPublishFlags {
        dup: flags & 0b1000 != 0,
        qos: mquality_of_service((flags & 0b0110) >> 1)?,
        retain: flags & 0b0001 != 0,
    })
}

/// The validated first byte of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MPacketInfo {
    Connect,
    Connack,
    Publish(MPublishFlags),
    Puback,
    Pubrec,
    Pubrel,
    Pubcomp,
    Subscribe,
    Suback,
    Unsubscribe,
    Unsuback,
    Pingreq,
    Pingresp,
    Disconnect,
    Auth,
}

impl MPacketInfo {
    pub fn from_byte(byte: u8) -> Result<MPacketInfo, MDecodeErrorKind> {
        let (upper, lower) = (byte >> 4, byte & 0b1111);

        let kind = MPacketKind::try_from(upper)
            .map_err(|_| MDecodeErrorKind::InvalidPacketType(upper))?;

        let info = match kind {
            MPacketKind::Publish => {
                return interpret_publish_header_flags(lower).map(MPacketInfo::Publish)
            }
            MPacketKind::Connect => MPacketInfo::Connect,
            MPacketKind::Connack => MPacketInfo::Connack,
            MPacketKind::Puback => MPacketInfo::Puback,
            MPacketKind::Pubrec => MPacketInfo::Pubrec,
            MPacketKind::Pubrel => MPacketInfo::Pubrel,
            MPacketKind::Pubcomp => MPacketInfo::Pubcomp,
            MPacketKind::Subscribe => MPacketInfo::Subscribe,
            MPacketKind::Suback => MPacketInfo::Suback,
            MPacketKind::Unsubscribe => MPacketInfo::Unsubscribe,
            MPacketKind::Unsuback => MPacketInfo::Unsuback,
            MPacketKind::Pingreq => MPacketInfo::Pingreq,
            MPacketKind::Pingresp => MPacketInfo::Pingresp,
            MPacketKind::Disconnect => MPacketInfo::Disconnect,
            MPacketKind::Auth => MPacketInfo::Auth,
        };

        // [MQTT-2.2.2-2] reserved flags have to match exactly
        if lower != kind.reserved_flags() {
            return Err(MDecodeErrorKind::InvalidHeaderFlags { kind, flags: lower });
        }

        Ok(info)
    }

    pub fn kind(&self) -> MPacketKind {
        match self {
            MPacketInfo::Connect => MPacketKind::Connect,
            MPacketInfo::Connack => MPacketKind::Connack,
            MPacketInfo::Publish(_) => MPacketKind::Publish,
            MPacketInfo::Puback => MPacketKind::Puback,
            MPacketInfo::Pubrec => MPacketKind::Pubrec,
            MPacketInfo::Pubrel => MPacketKind::Pubrel,
            MPacketInfo::Pubcomp => MPacketKind::Pubcomp,
            MPacketInfo::Subscribe => MPacketKind::Subscribe,
            MPacketInfo::Suback => MPacketKind::Suback,
            MPacketInfo::Unsubscribe => MPacketKind::Unsubscribe,
            MPacketInfo::Unsuback => MPacketKind::Unsuback,
            MPacketInfo::Pingreq => MPacketKind::Pingreq,
            MPacketInfo::Pingresp => MPacketKind::Pingresp,
            MPacketInfo::Disconnect => MPacketKind::Disconnect,
            MPacketInfo::Auth => MPacketKind::Auth,
        }
    }

    pub fn to_byte(&self) -> u8 {
        let lower = match self {
            MPacketInfo::Publish(flags) => flags.to_bits(),
            other => other.kind().reserved_flags(),
        };

        (u8::from(self.kind()) << 4) | lower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MFixedHeader {
    pub info: MPacketInfo,
    pub remaining_length: u32,
}

impl MFixedHeader {
    pub fn binary_size(&self) -> usize {
        1 + variable_u32_binary_size(self.remaining_length)
    }

    /// Reads a fixed header from a byte stream, one byte at a time
    ///
    /// Nothing past the remaining length is read.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<MFixedHeader, MDecodeError> {
        let mut byte = [0u8; 1];

        reader
            .read_exact(&mut byte)
            .map_err(|e| MDecodeError::from_io(e, 0))?;
        let info = MPacketInfo::from_byte(byte[0]).map_err(|kind| MDecodeError::new(kind, 1))?;

        let mut remaining_length: u32 = 0;
        for exp in 0..4 {
            reader.read_exact(&mut byte).map_err(|e| {
                let mut err = MDecodeError::from_io(e, 1 + exp);
                // A stream ending after a continuation bit
                if exp > 0 && matches!(err.kind, MDecodeErrorKind::Truncated) {
                    err.kind = MDecodeErrorKind::MalformedVarint;
                }
                err
            })?;

            remaining_length += (byte[0] as u32 & 0b0111_1111) * 128u32.pow(exp as u32);

            if byte[0] & 0b1000_0000 == 0 {
                return Ok(MFixedHeader {
                    info,
                    remaining_length,
                });
            }
        }

        Err(MDecodeError::new(MDecodeErrorKind::MalformedVarint, 5))
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.remaining_length > VARIABLE_INTEGER_MAX {
            return Err(MPacketWriteError::InvalidSize(self.remaining_length as usize).into());
        }

        buffer.write_byte(self.info.to_byte())?;
        write_variable_u32(buffer, self.remaining_length)
    }
}

pub fn mpacketinfo(input: &[u8]) -> MResult<'_, MPacketInfo> {
    let (rest, byte) = nom::number::complete::u8(input)?;

    let info = MPacketInfo::from_byte(byte).map_err(|kind| MParseError::fail(rest, kind))?;

    Ok((rest, info))
}

pub fn mfixedheader(input: &[u8]) -> MResult<'_, MFixedHeader> {
    let (input, info) = mpacketinfo(input)?;
    let (input, remaining_length) = mvariable_u32(input)?;

    Ok((
        input,
        MFixedHeader {
            info,
            remaining_length,
        },
    ))
}
