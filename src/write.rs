//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Sinks that packets can be serialized into

use bytes::BufMut;
use bytes::BytesMut;

use crate::errors::MPacketWriteError;

pub type WResult<W> = core::result::Result<(), <W as WriteMqttPacket>::Error>;

pub trait WriteMqttPacket: Sized {
    type Error: From<MPacketWriteError>;

    fn write_byte(&mut self, u: u8) -> WResult<Self>;
    fn write_slice(&mut self, u: &[u8]) -> WResult<Self>;

    #[inline]
    fn write_u16(&mut self, u: u16) -> WResult<Self> {
        self.write_slice(&u.to_be_bytes())
    }
}

impl WriteMqttPacket for Vec<u8> {
    type Error = MPacketWriteError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        self.push(u);
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        self.extend_from_slice(u);
        Ok(())
    }
}

impl WriteMqttPacket for BytesMut {
    type Error = MPacketWriteError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        self.put_u8(u);
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        self.put_slice(u);
        Ok(())
    }
}

/// Adapts any [`std::io::Write`] so that packets can be written into it
///
/// Failures of the underlying writer are returned unchanged as [`MPacketWriteError::Io`].
#[derive(Debug)]
pub struct IoWriter<W>(pub W);

impl<W: std::io::Write> WriteMqttPacket for IoWriter<W> {
    type Error = MPacketWriteError;

    fn write_byte(&mut self, u: u8) -> WResult<Self> {
        self.0.write_all(&[u])?;
        Ok(())
    }

    fn write_slice(&mut self, u: &[u8]) -> WResult<Self> {
        self.0.write_all(u)?;
        Ok(())
    }
}
