//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Framing of packets on a byte stream

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use crate::errors::{MDecodeError, MPacketWriteError};
use crate::header::mfixedheader;
use crate::integers::{variable_u32_needs_more, VARIABLE_INTEGER_MAX};
use crate::level::MProtocolLevel;
use crate::packets::MPacket;

/// Upper bound for buffer space reserved ahead of the bytes of a frame
const MAX_RESERVE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum MPacketCodecError {
    #[error("A codec error")]
    Io(#[from] std::io::Error),

    #[error("Could not decode a packet")]
    Decode(#[from] MDecodeError),

    #[error("An error occured while writing to a buffer")]
    Write(#[from] MPacketWriteError),

    #[error("A packet of {size} bytes exceeds the maximum of {max} bytes")]
    PacketTooLarge { size: usize, max: usize },
}

/// Splits a byte stream into packets of one connection
///
/// The protocol level starts out as configured and follows the level announced
/// by a decoded CONNECT.
#[derive(Debug, Clone)]
pub struct MPacketCodec {
    protocol_level: MProtocolLevel,
    max_packet_size: usize,
}

impl MPacketCodec {
    /// The largest packet MQTT can express: a fixed header with a four byte remaining length
    pub const MAX_PACKET_SIZE: usize = 1 + 4 + VARIABLE_INTEGER_MAX as usize;

    pub fn new(protocol_level: MProtocolLevel) -> MPacketCodec {
        MPacketCodec {
            protocol_level,
            max_packet_size: MPacketCodec::MAX_PACKET_SIZE,
        }
    }

    /// Limits the size of received packets, fixed header included
    pub fn with_max_packet_size(mut self, max_packet_size: usize) -> MPacketCodec {
        self.max_packet_size = max_packet_size;
        self
    }

    pub fn protocol_level(&self) -> MProtocolLevel {
        self.protocol_level
    }
}

impl Decoder for MPacketCodec {
    type Item = MPacket;

    type Error = MPacketCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // 1. Byte: FixedHeader
        // 2-5. Byte: Variable-Size

        if src.len() < 2 {
            src.reserve(2 - src.len());
            return Ok(None);
        }

        if variable_u32_needs_more(&src[1..]) {
            src.reserve(1);
            return Ok(None);
        }

        let (body, header) =
            mfixedheader(&src[..]).map_err(|e| MDecodeError::from_nom(e, &src[..]))?;
        let header_size = src.len() - body.len();
        let total_packet_length = header_size + header.remaining_length as usize;

        if total_packet_length > self.max_packet_size {
            tracing::debug!(
                size = total_packet_length,
                max = self.max_packet_size,
                "Rejecting oversized packet"
            );

            return Err(MPacketCodecError::PacketTooLarge {
                size: total_packet_length,
                max: self.max_packet_size,
            });
        }

        if src.len() < total_packet_length {
            src.reserve((total_packet_length - src.len()).min(MAX_RESERVE));
            return Ok(None);
        }

        let frame = src.split_to(total_packet_length);

        let packet = MPacket::parse_body(header.info, self.protocol_level, &frame[header_size..])
            .map_err(|mut e| {
                e.consumed += header_size;
                e
            })?;

        if let MPacket::Connect(connect) = &packet {
            if connect.protocol_level != self.protocol_level {
                tracing::debug!(
                    from = ?self.protocol_level,
                    to = ?connect.protocol_level,
                    "Switching protocol level"
                );
                self.protocol_level = connect.protocol_level;
            }
        }

        Ok(Some(packet))
    }
}

impl Encoder<MPacket> for MPacketCodec {
    type Error = MPacketCodecError;

    fn encode(&mut self, packet: MPacket, dst: &mut BytesMut) -> Result<(), Self::Error> {
        packet.write(dst)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use futures::SinkExt;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio_util::codec::Decoder;
    use tokio_util::codec::Framed;

    use super::{MPacketCodec, MPacketCodecError, MAX_RESERVE};
    use crate::errors::MDecodeErrorKind;
    use crate::level::MProtocolLevel;
    use crate::packets::ping::{MPingreq, MPingresp};
    use crate::packets::MPacket;

    #[tokio::test]
    async fn simple_test_codec() {
        let (mut client, server) = tokio::io::duplex(100);
        let mut framed_server = Framed::new(server, MPacketCodec::new(MProtocolLevel::V311));

        tokio::spawn(async move {
            client.write_all(&[0xC0, 0x00]).await.unwrap();

            let mut response = [0u8; 2];
            client.read_exact(&mut response).await.unwrap();
            assert_eq!(response, [0xD0, 0x00]);
        });

        let recv_packet = framed_server.next().await.unwrap().unwrap();
        assert_eq!(recv_packet, MPacket::Pingreq(MPingreq));

        framed_server
            .send(MPacket::Pingresp(MPingresp))
            .await
            .unwrap();
    }

    #[test]
    fn check_partial_frames_wait_for_more() {
        let mut codec = MPacketCodec::new(MProtocolLevel::V311);
        let mut buffer = BytesMut::new();

        for byte in [0x40, 0x02, 0x00] {
            buffer.extend_from_slice(&[byte]);
            assert!(codec.decode(&mut buffer).unwrap().is_none());
        }

        buffer.extend_from_slice(&[0x01, 0xC0]);

        let packet = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(matches!(packet, MPacket::Puback(_)));
        assert_eq!(&buffer[..], &[0xC0]);
    }

    #[test]
    fn check_oversized_packets_are_rejected() {
        let mut codec = MPacketCodec::new(MProtocolLevel::V311).with_max_packet_size(16);
        let mut buffer = BytesMut::from(&[0x30, 0x80, 0x01][..]);

        let err = codec.decode(&mut buffer).unwrap_err();

        assert!(matches!(
            err,
            MPacketCodecError::PacketTooLarge { size: 131, max: 16 }
        ));
    }

    #[test]
    fn check_large_declared_length_reserves_little() {
        let mut codec = MPacketCodec::new(MProtocolLevel::V311);
        let mut buffer = BytesMut::from(&[0x30, 0xFF, 0xFF, 0xFF, 0x7F][..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.capacity() < 2 * MAX_RESERVE);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn check_malformed_frames_are_errors() {
        let mut codec = MPacketCodec::new(MProtocolLevel::V311);
        let mut buffer = BytesMut::from(&[0x00, 0x00][..]);

        match codec.decode(&mut buffer).unwrap_err() {
            MPacketCodecError::Decode(e) => {
                assert!(matches!(e.kind, MDecodeErrorKind::InvalidPacketType(0)))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_codec_follows_connect_level() {
        let mut codec = MPacketCodec::new(MProtocolLevel::V311);
        let mut buffer = BytesMut::from(
            &[
                0x10, 13, // Fixed header
                0, 4, b'M', b'Q', b'T', b'T', 5, 0, 0, 0, // Variable header
                0, // Properties
                0, 0, // Client id
                0xE0, 0x01, 0x04, // DISCONNECT with will
            ][..],
        );

        assert!(matches!(
            codec.decode(&mut buffer).unwrap(),
            Some(MPacket::Connect(_))
        ));
        assert_eq!(codec.protocol_level(), MProtocolLevel::V5);

        match codec.decode(&mut buffer).unwrap() {
            Some(MPacket::Disconnect(disconnect)) => {
                assert_eq!(disconnect.reason_code.0, 0x04)
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }
}
