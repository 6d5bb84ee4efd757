use std::io;

use thiserror::Error;

pub type ParseResult<'a, O> = nom::IResult<&'a [u8], O, ParseError<'a>>;

/// Decode-side failure, tagged with the sub-slice where parsing stopped.
///
/// The top-level codec converts this into a [`CodecError`] with an
/// absolute byte offset; every slice handed to a parser here is a
/// sub-slice of the buffer the codec started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError<'a> {
    pub input: &'a [u8],
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input ended before a required field completed.
    Truncated,
    /// A varint carried more groups or bits than its declared width.
    Overflow,
    /// Structural mismatch: bad magic, wrong tag, length lies.
    Format(&'static str),
}

impl<'a> ParseError<'a> {
    pub fn new(input: &'a [u8], kind: ParseErrorKind) -> Self {
        ParseError { input, kind }
    }

    pub fn truncated(input: &'a [u8]) -> nom::Err<Self> {
        nom::Err::Error(Self::new(input, ParseErrorKind::Truncated))
    }

    pub fn overflow(input: &'a [u8]) -> nom::Err<Self> {
        nom::Err::Error(Self::new(input, ParseErrorKind::Overflow))
    }

    pub fn format(input: &'a [u8], reason: &'static str) -> nom::Err<Self> {
        nom::Err::Error(Self::new(input, ParseErrorKind::Format(reason)))
    }
}

impl<'a> nom::error::ParseError<&'a [u8]> for ParseError<'a> {
    fn from_error_kind(input: &'a [u8], code: nom::error::ErrorKind) -> Self {
        let kind = match code {
            nom::error::ErrorKind::Eof => ParseErrorKind::Truncated,
            _ => ParseErrorKind::Format("malformed input"),
        };
        ParseError { input, kind }
    }

    fn append(_input: &'a [u8], _code: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

/// Terminal error for a whole encode or decode operation.
///
/// The codec is fail-fast: the first error aborts the operation and no
/// partial module is ever produced.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("i/o failure")]
    Io(#[from] io::Error),

    #[error("truncated input at byte {offset}")]
    Truncated { offset: usize },

    #[error("varint overflow at byte {offset}")]
    Overflow { offset: usize },

    #[error("{what} out of range: {value}")]
    Range { what: &'static str, value: i64 },

    #[error("malformed module at byte {offset}: {reason}")]
    Format { offset: usize, reason: &'static str },

    #[error("no codec for section id {id}")]
    Unsupported { id: u8 },
}
