//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Handling of MQTT Control Packets
//!
//! Every packet type implements [`MDecodePacket`], [`MEncodePacket`] or both,
//! depending on which side of a connection sends it. [`MPacket`] dispatches to
//! them and reports the missing direction as an error.

use std::io::Read;
use std::pin::Pin;

use futures::AsyncWriteExt;

use self::connack::MConnack;
use self::connect::MConnect;
use self::disconnect::MDisconnect;
use self::ping::{MPingreq, MPingresp};
use self::puback::MPuback;
use self::pubcomp::MPubcomp;
use self::publish::MPublish;
use self::pubrec::MPubrec;
use self::pubrel::MPubrel;
use self::suback::MSuback;
use self::subscribe::MSubscribe;
use self::unsuback::MUnsuback;
use self::unsubscribe::MUnsubscribe;
use crate::errors::{MDecodeError, MDecodeErrorKind, MPacketWriteError};
use crate::header::{mfixedheader, MFixedHeader, MPacketInfo, MPacketKind};
use crate::level::MProtocolLevel;
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod ping;
pub mod puback;
pub mod pubcomp;
pub mod publish;
pub mod pubrec;
pub mod pubrel;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

/// What a packet body needs to know about its surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MDecodeContext {
    pub info: MPacketInfo,
    pub protocol_level: MProtocolLevel,
}

/// Packets that can be read from the wire
pub trait MDecodePacket: Sized {
    /// Parses the variable header and payload
    ///
    /// `input` is exactly the span announced by the remaining length.
    fn parse(context: MDecodeContext, input: &[u8]) -> MResult<'_, Self>;
}

/// Packets that can be written to the wire
pub trait MEncodePacket {
    fn packet_info(&self) -> MPacketInfo;

    /// The size of the variable header and payload, i.e. the remaining length
    fn binary_size(&self) -> usize;

    /// Writes the variable header and payload
    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W>;

    /// Rejects field combinations that would not decode back into the same packet
    fn validate(&self) -> Result<(), MPacketWriteError> {
        Ok(())
    }

    /// Writes a freshly computed fixed header followed by the packet body
    fn write_packet<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        self.validate()?;

        let size = self.binary_size();
        let remaining_length = u32::try_from(size)
            .map_err(|_| W::Error::from(MPacketWriteError::InvalidSize(size)))?;

        MFixedHeader {
            info: self.packet_info(),
            remaining_length,
        }
        .write(buffer)?;

        self.write(buffer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MPacket {
    Connect(MConnect),
    Connack(MConnack),
    Publish(MPublish),
    Puback(MPuback),
    Pubrec(MPubrec),
    Pubrel(MPubrel),
    Pubcomp(MPubcomp),
    Subscribe(MSubscribe),
    Suback(MSuback),
    Unsubscribe(MUnsubscribe),
    Unsuback(MUnsuback),
    Pingreq(MPingreq),
    Pingresp(MPingresp),
    Disconnect(MDisconnect),
}

macro_rules! impl_from_packet {
    ($($kind:ident => $packet:ty),* $(,)?) => {
        $(
            impl From<$packet> for MPacket {
                fn from(p: $packet) -> MPacket {
                    MPacket::$kind(p)
                }
            }
        )*
    };
}

impl_from_packet! {
    Connect => MConnect,
    Connack => MConnack,
    Publish => MPublish,
    Puback => MPuback,
    Pubrec => MPubrec,
    Pubrel => MPubrel,
    Pubcomp => MPubcomp,
    Subscribe => MSubscribe,
    Suback => MSuback,
    Unsubscribe => MUnsubscribe,
    Unsuback => MUnsuback,
    Pingreq => MPingreq,
    Pingresp => MPingresp,
    Disconnect => MDisconnect,
}

fn decode_as<P>(context: MDecodeContext, input: &[u8]) -> MResult<'_, MPacket>
where
    P: MDecodePacket + Into<MPacket>,
{
    P::parse(context, input).map(|(rest, packet)| (rest, packet.into()))
}

impl MPacket {
    pub fn kind(&self) -> MPacketKind {
        match self {
            MPacket::Connect(_) => MPacketKind::Connect,
            MPacket::Connack(_) => MPacketKind::Connack,
            MPacket::Publish(_) => MPacketKind::Publish,
            MPacket::Puback(_) => MPacketKind::Puback,
            MPacket::Pubrec(_) => MPacketKind::Pubrec,
            MPacket::Pubrel(_) => MPacketKind::Pubrel,
            MPacket::Pubcomp(_) => MPacketKind::Pubcomp,
            MPacket::Subscribe(_) => MPacketKind::Subscribe,
            MPacket::Suback(_) => MPacketKind::Suback,
            MPacket::Unsubscribe(_) => MPacketKind::Unsubscribe,
            MPacket::Unsuback(_) => MPacketKind::Unsuback,
            MPacket::Pingreq(_) => MPacketKind::Pingreq,
            MPacket::Pingresp(_) => MPacketKind::Pingresp,
            MPacket::Disconnect(_) => MPacketKind::Disconnect,
        }
    }

    /// Parses a packet body that has been fully received
    ///
    /// `body` has to be exactly the remaining length announced by the fixed
    /// header described by `info`.
    pub fn parse_body(
        info: MPacketInfo,
        protocol_level: MProtocolLevel,
        body: &[u8],
    ) -> Result<MPacket, MDecodeError> {
        let context = MDecodeContext {
            info,
            protocol_level,
        };

        let result = match info.kind() {
            MPacketKind::Connect => decode_as::<MConnect>(context, body),
            MPacketKind::Publish => decode_as::<MPublish>(context, body),
            MPacketKind::Puback => decode_as::<MPuback>(context, body),
            MPacketKind::Pubrec => decode_as::<MPubrec>(context, body),
            MPacketKind::Pubrel => decode_as::<MPubrel>(context, body),
            MPacketKind::Pubcomp => decode_as::<MPubcomp>(context, body),
            MPacketKind::Subscribe => decode_as::<MSubscribe>(context, body),
            MPacketKind::Unsubscribe => decode_as::<MUnsubscribe>(context, body),
            MPacketKind::Pingreq => decode_as::<MPingreq>(context, body),
            MPacketKind::Disconnect => decode_as::<MDisconnect>(context, body),
            MPacketKind::Auth if !protocol_level.has_properties() => {
                return Err(MDecodeError::new(
                    MDecodeErrorKind::InvalidPacketType(MPacketKind::Auth.into()),
                    0,
                ));
            }
            // TODO: decode the broker-to-client packets once a client side needs them
            kind @ (MPacketKind::Connack
            | MPacketKind::Suback
            | MPacketKind::Unsuback
            | MPacketKind::Pingresp
            | MPacketKind::Auth) => {
                return Err(MDecodeError::new(
                    MDecodeErrorKind::DecodeUnsupported(kind),
                    0,
                ));
            }
        };

        let (rest, packet) = result.map_err(|e| MDecodeError::from_nom(e, body))?;

        if !rest.is_empty() {
            let consumed = body.len() - rest.len();
            return Err(MDecodeError::new(
                MDecodeErrorKind::RemainingLengthMismatch {
                    declared: body.len(),
                    consumed,
                },
                consumed,
            ));
        }

        tracing::trace!(kind = ?packet.kind(), size = body.len(), "Decoded packet");

        Ok(packet)
    }

    /// Reads exactly `remaining_length` bytes from `reader` and parses them
    pub fn decode<R: Read>(
        info: MPacketInfo,
        protocol_level: MProtocolLevel,
        remaining_length: u32,
        reader: &mut R,
    ) -> Result<MPacket, MDecodeError> {
        let mut body = Vec::new();

        reader
            .take(u64::from(remaining_length))
            .read_to_end(&mut body)
            .map_err(|e| MDecodeError::from_io(e, 0))?;

        if body.len() < remaining_length as usize {
            return Err(MDecodeError::new(MDecodeErrorKind::Truncated, body.len()));
        }

        MPacket::parse_body(info, protocol_level, &body)
    }

    /// Reads a fixed header and the packet it announces
    pub fn read_from<R: Read>(
        reader: &mut R,
        protocol_level: MProtocolLevel,
    ) -> Result<MPacket, MDecodeError> {
        let header = MFixedHeader::read_from(reader)?;

        MPacket::decode(
            header.info,
            protocol_level,
            header.remaining_length,
            reader,
        )
    }

    /// Parses a slice that contains exactly one complete packet
    pub fn parse_complete(
        input: &[u8],
        protocol_level: MProtocolLevel,
    ) -> Result<MPacket, MDecodeError> {
        if input.len() < 2 {
            return Err(MDecodeError::new(MDecodeErrorKind::Truncated, input.len()));
        }

        let (body, header) = mfixedheader(input).map_err(|e| MDecodeError::from_nom(e, input))?;
        let header_size = input.len() - body.len();
        let declared = header.remaining_length as usize;

        if body.len() < declared {
            return Err(MDecodeError::new(MDecodeErrorKind::Truncated, input.len()));
        }

        if body.len() > declared {
            return Err(MDecodeError::new(
                MDecodeErrorKind::RemainingLengthMismatch {
                    declared,
                    consumed: body.len(),
                },
                header_size + declared,
            ));
        }

        MPacket::parse_body(header.info, protocol_level, body).map_err(|mut e| {
            e.consumed += header_size;
            e
        })
    }

    /// Writes the complete packet, fixed header included
    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        tracing::trace!(kind = ?self.kind(), "Encoding packet");

        match self {
            MPacket::Connack(p) => p.write_packet(buffer),
            MPacket::Publish(p) => p.write_packet(buffer),
            MPacket::Puback(p) => p.write_packet(buffer),
            MPacket::Pubrec(p) => p.write_packet(buffer),
            MPacket::Pubrel(p) => p.write_packet(buffer),
            MPacket::Pubcomp(p) => p.write_packet(buffer),
            MPacket::Suback(p) => p.write_packet(buffer),
            MPacket::Unsuback(p) => p.write_packet(buffer),
            MPacket::Pingresp(p) => p.write_packet(buffer),
            MPacket::Connect(_)
            | MPacket::Subscribe(_)
            | MPacket::Unsubscribe(_)
            | MPacket::Pingreq(_)
            | MPacket::Disconnect(_) => {
                Err(MPacketWriteError::EncodeUnsupported(self.kind()).into())
            }
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, MPacketWriteError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    pub async fn write_to<W: futures::AsyncWrite>(
        &self,
        mut writer: Pin<&mut W>,
    ) -> Result<(), MPacketWriteError> {
        let buffer = self.encode()?;

        writer.write_all(&buffer).await?;

        Ok(())
    }
}
