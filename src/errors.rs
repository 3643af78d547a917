//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use nom::error::{ErrorKind, FromExternalError, ParseError};

use crate::header::MPacketKind;
use crate::qos::MQualityOfService;

#[derive(Debug, thiserror::Error)]
pub enum MDecodeErrorKind {
    #[error("The input ended before the field was complete")]
    Truncated,
    #[error("The variable length integer is longer than 4 bytes or ends early")]
    MalformedVarint,
    #[error("An invalid Quality of Service (QoS) was supplied: {}", .0)]
    InvalidQualityOfService(u8),
    #[error("The reserved bits of a subscription QoS byte are set: {:#04x}", .0)]
    ReservedBitsSet(u8),
    #[error("Both QoS bits of a subscription are set: {:#04x}", .0)]
    InvalidQoSEncoding(u8),
    #[error("The properties do not fit into their declared length of {}", .0)]
    PropertiesLengthMismatch(u32),
    #[error("An unknown property identifier was supplied: {:#04x}", .0)]
    UnknownPropertyIdentifier(u8),
    #[error("An invalid packet type was supplied: {}", .0)]
    InvalidPacketType(u8),
    #[error("The fixed header flags {:#06b} are not allowed for {:?}", .flags, .kind)]
    InvalidHeaderFlags { kind: MPacketKind, flags: u8 },
    #[error("A string was not valid UTF-8")]
    InvalidUtf8,
    #[error("A string contained the null character")]
    NullCharacter,
    #[error("The client sent an unsupported protocol name: {}", .0)]
    InvalidProtocolName(String),
    #[error("The client sent an unsupported protocol level: {}", .0)]
    UnsupportedProtocolLevel(u8),
    #[error("Received a forbidden reserved value")]
    ForbiddenReservedValue,
    #[error("The will QoS or retain flag was set without the will flag")]
    InconsistentWillFlag,
    #[error("The DUP flag was set in a publish message of Quality of Service (QoS) level 0")]
    InvalidDupFlag,
    #[error("The packet did not contain any topic filter")]
    NoTopicFilters,
    #[error("The packet declared {} bytes but its fields consumed {}", .declared, .consumed)]
    RemainingLengthMismatch { declared: usize, consumed: usize },
    #[error("Decoding {:?} packets is not supported", .0)]
    DecodeUnsupported(MPacketKind),
    #[error("The packet is malformed: {:?}", .0)]
    Malformed(ErrorKind),
    #[error("An IO error occurred")]
    Io(#[from] std::io::Error),
}

/// The error type used by all packet parsers
///
/// It remembers the input at which the failure happened, so that the amount
/// of consumed bytes can be recovered once parsing is aborted.
#[derive(Debug)]
pub struct MParseError<'i> {
    pub(crate) input: &'i [u8],
    pub(crate) kind: MDecodeErrorKind,
}

impl<'i> MParseError<'i> {
    pub(crate) fn new(input: &'i [u8], kind: MDecodeErrorKind) -> MParseError<'i> {
        MParseError { input, kind }
    }

    /// Abort parsing without allowing any backtracking
    pub(crate) fn fail(input: &'i [u8], kind: MDecodeErrorKind) -> nom::Err<MParseError<'i>> {
        nom::Err::Failure(MParseError::new(input, kind))
    }

    pub fn kind(&self) -> &MDecodeErrorKind {
        &self.kind
    }

    /// Converts into a [`MDecodeError`], given the input the parser was started with
    pub(crate) fn into_decode_error(self, start: &[u8]) -> MDecodeError {
        MDecodeError {
            consumed: start.len().saturating_sub(self.input.len()),
            kind: self.kind,
        }
    }
}

impl<'i> ParseError<&'i [u8]> for MParseError<'i> {
    fn from_error_kind(input: &'i [u8], kind: ErrorKind) -> Self {
        let kind = match kind {
            ErrorKind::Eof => MDecodeErrorKind::Truncated,
            other => MDecodeErrorKind::Malformed(other),
        };

        MParseError { input, kind }
    }

    fn append(_input: &'i [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'i> FromExternalError<&'i [u8], MDecodeErrorKind> for MParseError<'i> {
    fn from_external_error(input: &'i [u8], _kind: ErrorKind, e: MDecodeErrorKind) -> Self {
        MParseError { input, kind: e }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind} (after {consumed} bytes)")]
pub struct MDecodeError {
    pub kind: MDecodeErrorKind,
    /// How many bytes of the inspected span were consumed before the failure
    pub consumed: usize,
}

impl MDecodeError {
    pub(crate) fn new(kind: MDecodeErrorKind, consumed: usize) -> MDecodeError {
        MDecodeError { kind, consumed }
    }

    pub(crate) fn from_nom(err: nom::Err<MParseError<'_>>, start: &[u8]) -> MDecodeError {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e.into_decode_error(start),
            nom::Err::Incomplete(_) => MDecodeError::new(MDecodeErrorKind::Truncated, start.len()),
        }
    }

    pub(crate) fn from_io(err: std::io::Error, consumed: usize) -> MDecodeError {
        let kind = if err.kind() == std::io::ErrorKind::UnexpectedEof {
            MDecodeErrorKind::Truncated
        } else {
            MDecodeErrorKind::Io(err)
        };

        MDecodeError { kind, consumed }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MPacketWriteError {
    #[error("An IO error occurred")]
    Io(#[from] std::io::Error),
    #[error("Invalid remaining length: {}", .0)]
    InvalidSize(usize),
    #[error("A string or binary field is too long to be encoded: {} bytes", .0)]
    FieldTooLong(usize),
    #[error("Encoding {:?} packets is not supported", .0)]
    EncodeUnsupported(MPacketKind),
    #[error("A packet identifier has to be present exactly for QoS 1 and 2, got QoS {:?}", .0)]
    InconsistentPacketIdentifier(MQualityOfService),
}
