//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::number::complete::u8 as nom_u8;

use super::{MDecodeContext, MDecodePacket};
use crate::errors::{MDecodeErrorKind, MParseError};
use crate::integers::mu16;
use crate::level::{mprotocollevel, MProtocolLevel};
use crate::properties::{moptional_properties, MProperties};
use crate::qos::{mquality_of_service, MQualityOfService};
use crate::strings::{mbinary, mstring};
use crate::MResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MConnectFlags {
    pub username: bool,
    pub password: bool,
    pub will_retain: bool,
    pub will_qos: MQualityOfService,
    pub will: bool,
    pub clean_session: bool,
}

pub fn mconnectflags(input: &[u8]) -> MResult<'_, MConnectFlags> {
    let (rest, byte) = nom_u8(input)?;

    if byte & 0b0000_0001 != 0 {
        return Err(MParseError::fail(
            input,
            MDecodeErrorKind::ForbiddenReservedValue,
        ));
    }

    let will_qos = mquality_of_service((byte & 0b0001_1000) >> 3)
        .map_err(|kind| MParseError::fail(input, kind))?;

    let flags = MConnectFlags {
        username: byte & 0b1000_0000 != 0,
        password: byte & 0b0100_0000 != 0,
        will_retain: byte & 0b0010_0000 != 0,
        will_qos,
        will: byte & 0b0000_0100 != 0,
        clean_session: byte & 0b0000_0010 != 0,
    };

    // [MQTT-3.1.2-13] and [MQTT-3.1.2-15]
    if !flags.will && (flags.will_qos != MQualityOfService::AtMostOnce || flags.will_retain) {
        return Err(MParseError::fail(
            input,
            MDecodeErrorKind::InconsistentWillFlag,
        ));
    }

    Ok((rest, flags))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MLastWill {
    pub properties: Option<MProperties>,
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: MQualityOfService,
    pub retain: bool,
}

fn mlastwill(
    input: &[u8],
    flags: MConnectFlags,
    level: MProtocolLevel,
) -> MResult<'_, MLastWill> {
    let (input, properties) = moptional_properties(input, level)?;
    let (input, topic) = mstring(input)?;
    let (input, payload) = mbinary(input)?;

    Ok((
        input,
        MLastWill {
            properties,
            topic,
            payload,
            qos: flags.will_qos,
            retain: flags.will_retain,
        },
    ))
}

/// The identification fields of a CONNECT payload
///
/// Fields missing at the end of the payload are left empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MConnectPayload {
    pub client_id: String,
    pub username: String,
    pub password: Vec<u8>,
}

/// Runs `parser` unless the input is exhausted, in which case the value is left empty
fn mlenient<'i, O, P>(input: &'i [u8], parser: P) -> MResult<'i, O>
where
    O: Default,
    P: FnOnce(&'i [u8]) -> MResult<'i, O>,
{
    if input.is_empty() {
        Ok((input, O::default()))
    } else {
        parser(input)
    }
}

fn mcredentials(input: &[u8]) -> MResult<'_, (String, Vec<u8>)> {
    let (input, username) = mlenient(input, mstring)?;
    let (input, password) = mlenient(input, mbinary)?;

    Ok((input, (username, password)))
}

/// Parses a CONNECT payload without a will
///
/// The client identifier is required. Username and password may be cut off,
/// but a field that has begun has to be complete.
pub fn mconnectpayload(input: &[u8]) -> MResult<'_, MConnectPayload> {
    let (input, client_id) = mstring(input)?;
    let (input, (username, password)) = mcredentials(input)?;

    Ok((
        input,
        MConnectPayload {
            client_id,
            username,
            password,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MConnect {
    pub protocol_level: MProtocolLevel,
    pub flags: MConnectFlags,
    pub keep_alive: u16,
    pub properties: Option<MProperties>,
    pub will: Option<MLastWill>,
    pub payload: MConnectPayload,
}

fn mprotocolname(input: &[u8]) -> MResult<'_, MProtocolLevel> {
    let (rest, name) = mstring(input)?;

    if name != "MQTT" && name != "MQIsdp" {
        return Err(MParseError::fail(
            input,
            MDecodeErrorKind::InvalidProtocolName(name),
        ));
    }

    let (rest, level) = mprotocollevel(rest)?;

    if name != level.protocol_name() {
        return Err(MParseError::fail(
            input,
            MDecodeErrorKind::InvalidProtocolName(name),
        ));
    }

    Ok((rest, level))
}

impl MDecodePacket for MConnect {
    /// The protocol level of the context is ignored, CONNECT announces its own
    ///
    /// Username and password are read only when their connect flag is set.
    fn parse(_context: MDecodeContext, input: &[u8]) -> MResult<'_, MConnect> {
        let (input, protocol_level) = mprotocolname(input)?;
        let (input, flags) = mconnectflags(input)?;
        let (input, keep_alive) = mu16(input)?;
        let (input, properties) = moptional_properties(input, protocol_level)?;

        let (input, client_id) = mstring(input)?;

        let (input, will) = if flags.will {
            let (input, will) = mlastwill(input, flags, protocol_level)?;
            (input, Some(will))
        } else {
            (input, None)
        };

        let (input, username) = if flags.username {
            mstring(input)?
        } else {
            (input, String::new())
        };

        let (input, password) = if flags.password {
            mbinary(input)?
        } else {
            (input, Vec::new())
        };

        Ok((
            input,
            MConnect {
                protocol_level,
                flags,
                keep_alive,
                properties,
                will,
                payload: MConnectPayload {
                    client_id,
                    username,
                    password,
                },
            },
        ))
    }
}
