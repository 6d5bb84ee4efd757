//! Top-level module codec: header plus ordered sections, one linear pass,
//! first error wins.

use std::io::{self, Read, Write};

use log::{debug, trace};

use crate::binary::error::{CodecError, ParseError, ParseErrorKind};
use crate::binary::{leb128, primitives, sections};
use crate::module::{section_id, Module, Section};

/// Encode a module into any byte sink.
///
/// Each section's payload is first encoded into a scratch buffer so its
/// byte length can be written before the bytes themselves. The first
/// failure aborts the write; the sink is left mid-stream.
pub fn encode<W: Write>(module: &Module, w: &mut W) -> Result<(), CodecError> {
    let mut header = Vec::new();
    primitives::write_header(&mut header, module.version);
    w.write_all(&header)?;

    for section in &module.sections {
        let payload = sections::encode_payload(section)?;
        trace!(
            "encoding section id {} ({} payload bytes)",
            section.id(),
            payload.len()
        );
        w.write_all(&[leb128::encode_u7(section.id() as u32)?])?;
        let payload_len = leb128::checked_u32(payload.len(), "section payload length")?;
        w.write_all(&leb128::encode_u32(payload_len))?;
        w.write_all(&payload)?;
    }

    Ok(())
}

pub fn encode_to_vec(module: &Module) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    encode(module, &mut out)?;
    Ok(out)
}

/// Decode a module from a complete byte buffer.
///
/// Sections are read as encountered until the buffer is exhausted; a clean
/// end exactly at a section boundary is success, anywhere else is
/// truncation. Duplicate or out-of-order sections are not re-validated.
pub fn decode(bytes: &[u8]) -> Result<Module, CodecError> {
    debug!("decoding module ({} bytes)", bytes.len());

    let (mut remaining, version) =
        primitives::parse_header(bytes).map_err(|e| stream_error(bytes, e))?;

    let mut parsed = Vec::new();
    while !remaining.is_empty() {
        let (rest, id) = leb128::decode_u7(remaining).map_err(|e| stream_error(bytes, e))?;
        let (rest, payload_len) = leb128::decode_u32(rest).map_err(|e| stream_error(bytes, e))?;
        let (rest, payload) = primitives::take_bytes(rest, payload_len as usize)
            .map_err(|e| stream_error(bytes, e))?;
        trace!("decoding section id {id} ({payload_len} payload bytes)");

        parsed.push(decode_section(bytes, id, payload)?);
        remaining = rest;
    }

    Ok(Module {
        version,
        sections: parsed,
    })
}

/// Decode a module from any byte source. The stream is drained first; a
/// read failure surfaces as [`CodecError::Io`].
pub fn decode_from<R: Read>(mut reader: R) -> Result<Module, CodecError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

fn decode_section(base: &[u8], id: u8, payload: &[u8]) -> Result<Section, CodecError> {
    let (rest, section) = match id {
        section_id::TYPE => sections::parse_type_section(payload)
            .map(|(rest, types)| (rest, Section::Type(types))),
        section_id::FUNCTION => sections::parse_function_section(payload)
            .map(|(rest, indices)| (rest, Section::Function(indices))),
        section_id::EXPORT => sections::parse_export_section(payload)
            .map(|(rest, exports)| (rest, Section::Export(exports))),
        section_id::CODE => sections::parse_code_section(payload)
            .map(|(rest, bodies)| (rest, Section::Code(bodies))),
        other => return Err(CodecError::Unsupported { id: other }),
    }
    .map_err(|e| payload_error(base, e))?;

    if !rest.is_empty() {
        return Err(CodecError::Format {
            offset: offset_in(base, rest),
            reason: "trailing bytes in section payload",
        });
    }

    Ok(section)
}

/// Absolute position of `at` inside `base`; every parser error slice is a
/// sub-slice of the buffer decode started from.
fn offset_in(base: &[u8], at: &[u8]) -> usize {
    at.as_ptr() as usize - base.as_ptr() as usize
}

/// Errors raised while reading the header or a section frame from the
/// outer stream: truncation here really is truncated input.
fn stream_error(base: &[u8], err: nom::Err<ParseError<'_>>) -> CodecError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = offset_in(base, e.input);
            match e.kind {
                ParseErrorKind::Truncated => CodecError::Truncated { offset },
                ParseErrorKind::Overflow => CodecError::Overflow { offset },
                ParseErrorKind::Format(reason) => CodecError::Format { offset, reason },
            }
        }
        nom::Err::Incomplete(_) => CodecError::Truncated { offset: base.len() },
    }
}

/// Errors raised inside a length-bounded section payload. The payload was
/// fully present, so running out of bytes there means the structure lied
/// about itself, not that the stream ended.
fn payload_error(base: &[u8], err: nom::Err<ParseError<'_>>) -> CodecError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = offset_in(base, e.input);
            match e.kind {
                ParseErrorKind::Truncated => CodecError::Format {
                    offset,
                    reason: "section payload ended early",
                },
                ParseErrorKind::Overflow => CodecError::Overflow { offset },
                ParseErrorKind::Format(reason) => CodecError::Format { offset, reason },
            }
        }
        nom::Err::Incomplete(_) => CodecError::Truncated { offset: base.len() },
    }
}
