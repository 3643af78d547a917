//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::{bytes::complete::take, number::complete::be_u16, Parser};
use nom_supreme::ParserExt;

use crate::errors::{MDecodeErrorKind, MPacketWriteError};
use crate::write::{WResult, WriteMqttPacket};
use crate::MResult;

fn validate_string(data: &[u8]) -> Result<String, MDecodeErrorKind> {
    let value = std::str::from_utf8(data).map_err(|_| MDecodeErrorKind::InvalidUtf8)?;

    if value.contains('\u{0000}') {
        return Err(MDecodeErrorKind::NullCharacter);
    }

    Ok(value.to_owned())
}

fn mlength_data(input: &[u8]) -> MResult<'_, &[u8]> {
    let (input, len) = be_u16(input)?;
    take(len)(input)
}

/// A length-prefixed UTF-8 string as defined in section 1.5.3
pub fn mstring(input: &[u8]) -> MResult<'_, String> {
    mlength_data.map_res(validate_string).parse(input)
}

/// Length-prefixed binary data, as used for passwords and will messages
pub fn mbinary(input: &[u8]) -> MResult<'_, Vec<u8>> {
    mlength_data.map(<[u8]>::to_vec).parse(input)
}

pub fn string_binary_size(s: &str) -> usize {
    2 + s.len()
}

pub fn write_binary<W: WriteMqttPacket>(buffer: &mut W, data: &[u8]) -> WResult<W> {
    let len: u16 = data
        .len()
        .try_into()
        .map_err(|_| W::Error::from(MPacketWriteError::FieldTooLong(data.len())))?;

    buffer.write_u16(len)?;
    buffer.write_slice(data)
}

pub fn write_string<W: WriteMqttPacket>(buffer: &mut W, s: &str) -> WResult<W> {
    write_binary(buffer, s.as_bytes())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{mbinary, mstring, write_string};
    use crate::errors::{MDecodeErrorKind, MPacketWriteError};

    #[test]
    fn check_simple_string() {
        let input = [0x00, 0x05, 0x41, 0xF0, 0xAA, 0x9B, 0x94];

        let (rest, s) = mstring(&input).unwrap();

        assert!(rest.is_empty());
        assert_eq!(s, "A\u{2A6D4}");
    }

    #[test]
    fn check_string_stops_at_its_length() {
        let input = [0x00, 0x02, b'h', b'i', 0x00, 0x01];

        let (rest, s) = mstring(&input).unwrap();

        assert_eq!(s, "hi");
        assert_eq!(rest, &[0x00, 0x01]);
    }

    #[test]
    fn check_truncated_string() {
        let input = [0x00, 0x05, b'a', b'b'];

        match mstring(&input).unwrap_err() {
            nom::Err::Error(e) => {
                assert!(matches!(e.kind(), MDecodeErrorKind::Truncated));
                // The length prefix was read, the data was not
                assert_eq!(e.input.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_invalid_utf8() {
        let input = [0x00, 0x02, 0xC3, 0x28];

        match mstring(&input).unwrap_err() {
            nom::Err::Error(e) => assert!(matches!(e.kind(), MDecodeErrorKind::InvalidUtf8)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_forbidden_null_character() {
        let input = [0x00, 0x02, 0x00, 0x41];

        match mstring(&input).unwrap_err() {
            nom::Err::Error(e) => assert!(matches!(e.kind(), MDecodeErrorKind::NullCharacter)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn check_binary_data() {
        let input = &[0x0, 0x2, 0x4, 0x2];

        assert_eq!(mbinary(input).unwrap().1, vec![0x4, 0x2]);
    }

    #[test]
    fn check_write_string() {
        let mut buffer = Vec::new();
        write_string(&mut buffer, "a/b").unwrap();

        assert_eq!(buffer, vec![0x00, 0x03, b'a', b'/', b'b']);

        let too_long = "x".repeat(65_536);
        let err = write_string(&mut Vec::new(), &too_long).unwrap_err();
        assert!(matches!(err, MPacketWriteError::FieldTooLong(65_536)));
    }
}
