//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use super::{MDecodeContext, MDecodePacket, MEncodePacket};
use crate::header::MPacketInfo;
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPingreq;

impl MDecodePacket for MPingreq {
    fn parse(_context: MDecodeContext, input: &[u8]) -> MResult<'_, MPingreq> {
        Ok((input, MPingreq))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPingresp;

impl MEncodePacket for MPingresp {
    fn packet_info(&self) -> MPacketInfo {
        MPacketInfo::Pingresp
    }

    fn binary_size(&self) -> usize {
        0
    }

    fn write<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }
}
