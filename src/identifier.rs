//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::{number::complete::be_u16, Parser};

use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MPacketIdentifier(pub u16);

pub fn mpacketidentifier(input: &[u8]) -> MResult<'_, MPacketIdentifier> {
    be_u16.map(MPacketIdentifier).parse(input)
}

impl MPacketIdentifier {
    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_u16(self.0)
    }

    pub fn binary_size(&self) -> usize {
        2
    }
}
