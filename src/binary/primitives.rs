use crate::binary::error::{CodecError, ParseError, ParseResult};
use crate::binary::leb128;
use crate::module::{MAGIC, VERSION};
use crate::types::ExternalKind;

type Input<'a> = &'a [u8];

/// Take exactly `n` bytes or report truncation at the current position.
pub fn take_bytes(input: Input, n: usize) -> ParseResult<'_, &[u8]> {
    if input.len() < n {
        return Err(ParseError::truncated(input));
    }
    Ok((&input[n..], &input[..n]))
}

pub fn parse_byte(input: Input) -> ParseResult<'_, u8> {
    let (remaining, bytes) = take_bytes(input, 1)?;
    Ok((remaining, bytes[0]))
}

pub fn parse_magic(input: Input) -> ParseResult<'_, ()> {
    let (remaining, bytes) = take_bytes(input, 4)?;
    if bytes != MAGIC {
        return Err(ParseError::format(input, "bad magic"));
    }
    Ok((remaining, ()))
}

/// Version is a fixed-width little-endian u32, not a varint.
pub fn parse_version(input: Input) -> ParseResult<'_, u32> {
    let (remaining, bytes) = take_bytes(input, 4)?;
    let version = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if version != VERSION {
        return Err(ParseError::format(input, "unsupported version"));
    }
    Ok((remaining, version))
}

pub fn parse_header(input: Input) -> ParseResult<'_, u32> {
    let (remaining, ()) = parse_magic(input)?;
    parse_version(remaining)
}

/// A length-prefixed UTF-8 name: varuint32 byte count, then that many bytes.
pub fn parse_name(input: Input) -> ParseResult<'_, String> {
    let (remaining, length) = leb128::decode_u32(input)?;
    let (rest, bytes) = take_bytes(remaining, length as usize)?;
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok((rest, s.to_string())),
        Err(_) => Err(ParseError::format(remaining, "name is not utf-8")),
    }
}

pub fn parse_external_kind(input: Input) -> ParseResult<'_, ExternalKind> {
    let (remaining, byte) = parse_byte(input)?;
    match ExternalKind::from_code(byte) {
        Some(kind) => Ok((remaining, kind)),
        None => Err(ParseError::format(input, "unknown external kind")),
    }
}

pub fn write_header(buf: &mut Vec<u8>, version: u32) {
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&version.to_le_bytes());
}

pub fn write_name(buf: &mut Vec<u8>, name: &str) -> Result<(), CodecError> {
    let length = leb128::checked_u32(name.len(), "name length")?;
    buf.extend_from_slice(&leb128::encode_u32(length));
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}
