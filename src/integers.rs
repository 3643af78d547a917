//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Various ways to parse MQTT integers
//!
//! All integers in MQTT are big-endian

use nom::number::complete::{be_u16, be_u32};

use crate::errors::{MDecodeErrorKind, MParseError, MPacketWriteError};
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

pub const VARIABLE_INTEGER_MAX: u32 = 268_435_455;

pub fn mu16(input: &[u8]) -> MResult<'_, u16> {
    be_u16(input)
}

pub fn mu32(input: &[u8]) -> MResult<'_, u32> {
    be_u32(input)
}

/// Parse a variable sized integer
///
/// Value range: `0..=268_435_455`, encoded in at most 4 bytes.
/// A fifth continuation byte, or input ending inside the integer, is a
/// [`MDecodeErrorKind::MalformedVarint`].
pub fn mvariable_u32(input: &[u8]) -> MResult<'_, u32> {
    let mut output: u32 = 0;

    for (exp, val) in input.iter().take(4).enumerate() {
        output += (*val as u32 & 0b0111_1111) * 128u32.pow(exp as u32);

        if val & 0b1000_0000 == 0 {
            return Ok((&input[exp + 1..], output));
        }
    }

    Err(MParseError::fail(
        &input[input.len().min(4)..],
        MDecodeErrorKind::MalformedVarint,
    ))
}

/// Whether `input` is the beginning of a variable sized integer that has not been fully received yet
pub fn variable_u32_needs_more(input: &[u8]) -> bool {
    input.len() < 4 && input.iter().all(|b| b & 0b1000_0000 != 0)
}

#[inline]
pub const fn variable_u32_binary_size(u: u32) -> usize {
    match u {
        0..=127 => 1,
        128..=16383 => 2,
        16384..=2_097_151 => 3,
        _ => 4,
    }
}

pub fn write_variable_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    if u > VARIABLE_INTEGER_MAX {
        return Err(MPacketWriteError::InvalidSize(u as usize).into());
    }

    let mut rest = u;
    loop {
        let mut byte = (rest % 128) as u8;
        rest /= 128;

        if rest > 0 {
            byte |= 0b1000_0000;
        }

        buffer.write_byte(byte)?;

        if rest == 0 {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        mu16, mvariable_u32, variable_u32_binary_size, variable_u32_needs_more,
        write_variable_u32,
    };
    use crate::errors::{MDecodeErrorKind, MPacketWriteError};

    #[test]
    fn check_integer_parsing() {
        let input = 15u16.to_be_bytes();
        assert_eq!(mu16(&input).unwrap(), (&[][..], 15));

        let input = [0x01, 0x02, 0xFF];
        assert_eq!(mu16(&input).unwrap(), (&[0xFF][..], 258));
    }

    #[test]
    fn check_short_integer_is_truncated() {
        let err = mu16(&[0x01]).unwrap_err();

        match err {
            nom::Err::Error(e) => assert!(matches!(e.kind(), MDecodeErrorKind::Truncated)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_variable_integers() {
        let cases: &[(&[u8], u32)] = &[
            (&[0x0], 0),
            (&[0x7F], 127),
            (&[0x80, 0x01], 128),
            (&[0xFF, 0x7F], 16_383),
            (&[0x80, 0x80, 0x01], 16_384),
            (&[0xFF, 0xFF, 0x7F], 2_097_151),
            (&[0x80, 0x80, 0x80, 0x01], 2_097_152),
            (&[0xFF, 0xFF, 0xFF, 0x7F], 268_435_455),
        ];

        for (input, expected) in cases {
            let (rest, value) = mvariable_u32(input).unwrap();
            assert_eq!(value, *expected);
            assert!(rest.is_empty());
            assert_eq!(variable_u32_binary_size(value), input.len());
        }

        let (rest, value) = mvariable_u32(&[0xC1, 0x02, 0xAA]).unwrap();
        assert_eq!(value, 321);
        assert_eq!(rest, &[0xAA]);
    }

    #[test]
    fn check_malformed_variable_integers() {
        for input in [&[0xFF, 0xFF, 0xFF, 0x8F][..], &[0xFF, 0xFF, 0xFF, 0xFF, 0x01], &[0x80], &[]] {
            match mvariable_u32(input).unwrap_err() {
                nom::Err::Failure(e) => {
                    assert!(matches!(e.kind(), MDecodeErrorKind::MalformedVarint))
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn check_needs_more() {
        assert!(variable_u32_needs_more(&[]));
        assert!(variable_u32_needs_more(&[0x80, 0x80]));
        assert!(!variable_u32_needs_more(&[0x80, 0x01]));
        assert!(!variable_u32_needs_more(&[0x80, 0x80, 0x80, 0x80]));
    }

    #[test]
    fn check_write_variable_integers() {
        for value in [0, 127, 128, 16_383, 16_384, 2_097_151, 2_097_152, 268_435_455] {
            let mut buffer = Vec::new();
            write_variable_u32(&mut buffer, value).unwrap();

            assert_eq!(buffer.len(), variable_u32_binary_size(value));
            assert_eq!(mvariable_u32(&buffer).unwrap().1, value);
        }

        let err = write_variable_u32(&mut Vec::new(), 268_435_456).unwrap_err();
        assert!(matches!(err, MPacketWriteError::InvalidSize(268_435_456)));
    }
}
