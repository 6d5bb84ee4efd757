use crate::binary::error::{CodecError, ParseError, ParseResult};
use crate::binary::leb128;
use crate::binary::primitives::{parse_external_kind, parse_name, take_bytes, write_name};
use crate::module::{ExportEntry, FunctionBody, LocalEntry, Section};
use crate::types::{FuncType, ValueType};

type Input<'a> = &'a [u8];

/// Opcode that terminates every function body.
pub const END_OPCODE: u8 = 0x0B;

// Every parser here consumes from a payload slice the caller has already
// bounded to the section's declared length; the caller checks that nothing
// is left over. Every encoder produces payload bytes without a length
// prefix; the caller measures and prefixes them.

/// Parse a vector: varuint32 count followed by that many elements.
pub fn parse_vec<'a, T, F>(input: Input<'a>, parser: F) -> ParseResult<'a, Vec<T>>
where
    F: Fn(Input<'a>) -> ParseResult<'a, T>,
{
    let (mut remaining, count) = leb128::decode_u32(input)?;
    let mut elements = Vec::new();

    for _ in 0..count {
        let (rest, element) = parser(remaining)?;
        elements.push(element);
        remaining = rest;
    }

    Ok((remaining, elements))
}

pub fn parse_value_type(input: Input) -> ParseResult<'_, ValueType> {
    let (remaining, code) = leb128::decode_i7(input)?;
    match ValueType::from_code(code) {
        Some(vt) => Ok((remaining, vt)),
        None => Err(ParseError::format(input, "unknown value type")),
    }
}

/// Parse a function signature: form (fixed to the func sentinel), then the
/// parameter and result type vectors.
pub fn parse_func_type(input: Input) -> ParseResult<'_, FuncType> {
    let (remaining, form) = leb128::decode_i7(input)?;
    if form != FuncType::FORM {
        return Err(ParseError::format(input, "unsupported func type form"));
    }

    let (remaining, params) = parse_vec(remaining, parse_value_type)?;
    let (remaining, results) = parse_vec(remaining, parse_value_type)?;

    Ok((remaining, FuncType { params, results }))
}

pub fn parse_type_section(input: Input) -> ParseResult<'_, Vec<FuncType>> {
    parse_vec(input, parse_func_type)
}

/// Function section: a vector of type indices. Indices are taken as
/// encountered; bounds against the type section are not this codec's job.
pub fn parse_function_section(input: Input) -> ParseResult<'_, Vec<u32>> {
    parse_vec(input, leb128::decode_u32)
}

pub fn parse_export_entry(input: Input) -> ParseResult<'_, ExportEntry> {
    let (remaining, field) = parse_name(input)?;
    let (remaining, kind) = parse_external_kind(remaining)?;
    let (remaining, index) = leb128::decode_u32(remaining)?;
    Ok((
        remaining,
        ExportEntry {
            field,
            kind,
            index,
        },
    ))
}

pub fn parse_export_section(input: Input) -> ParseResult<'_, Vec<ExportEntry>> {
    parse_vec(input, parse_export_entry)
}

pub fn parse_local_entry(input: Input) -> ParseResult<'_, LocalEntry> {
    let (remaining, count) = leb128::decode_u32(input)?;
    let (remaining, ty) = parse_value_type(remaining)?;
    Ok((remaining, LocalEntry { count, ty }))
}

/// Parse one function body. The declared size bounds the read: locals and
/// instruction bytes must fit it exactly, and the last byte inside it must
/// be the end opcode.
pub fn parse_function_body(input: Input) -> ParseResult<'_, FunctionBody> {
    let (remaining, body_size) = leb128::decode_u32(input)?;
    let (rest, body) = take_bytes(remaining, body_size as usize)?;

    let (code_and_end, locals) = parse_vec(body, parse_local_entry)?;
    let Some((&last, code)) = code_and_end.split_last() else {
        return Err(ParseError::format(body, "missing end opcode"));
    };
    if last != END_OPCODE {
        return Err(ParseError::format(code_and_end, "missing end opcode"));
    }

    Ok((
        rest,
        FunctionBody {
            locals,
            code: code.to_vec(),
        },
    ))
}

pub fn parse_code_section(input: Input) -> ParseResult<'_, Vec<FunctionBody>> {
    parse_vec(input, parse_function_body)
}

fn write_value_type(buf: &mut Vec<u8>, vt: ValueType) -> Result<(), CodecError> {
    buf.push(leb128::encode_i7(vt.code() as i32)?);
    Ok(())
}

fn write_func_type(buf: &mut Vec<u8>, ft: &FuncType) -> Result<(), CodecError> {
    buf.push(leb128::encode_i7(FuncType::FORM as i32)?);

    let param_count = leb128::checked_u32(ft.params.len(), "param count")?;
    buf.extend_from_slice(&leb128::encode_u32(param_count));
    for &param in &ft.params {
        write_value_type(buf, param)?;
    }

    let result_count = leb128::checked_u32(ft.results.len(), "result count")?;
    buf.extend_from_slice(&leb128::encode_u32(result_count));
    for &result in &ft.results {
        write_value_type(buf, result)?;
    }

    Ok(())
}

pub fn encode_type_section(types: &[FuncType]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let count = leb128::checked_u32(types.len(), "type count")?;
    buf.extend_from_slice(&leb128::encode_u32(count));
    for ft in types {
        write_func_type(&mut buf, ft)?;
    }
    Ok(buf)
}

pub fn encode_function_section(indices: &[u32]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let count = leb128::checked_u32(indices.len(), "function count")?;
    buf.extend_from_slice(&leb128::encode_u32(count));
    for &index in indices {
        buf.extend_from_slice(&leb128::encode_u32(index));
    }
    Ok(buf)
}

pub fn encode_export_section(exports: &[ExportEntry]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let count = leb128::checked_u32(exports.len(), "export count")?;
    buf.extend_from_slice(&leb128::encode_u32(count));
    for export in exports {
        write_name(&mut buf, &export.field)?;
        buf.push(export.kind.code());
        buf.extend_from_slice(&leb128::encode_u32(export.index));
    }
    Ok(buf)
}

pub fn encode_code_section(bodies: &[FunctionBody]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    let count = leb128::checked_u32(bodies.len(), "body count")?;
    buf.extend_from_slice(&leb128::encode_u32(count));
    for body in bodies {
        // Body size is recomputed from the actual bytes, never trusted
        // from the model.
        let mut inner = Vec::new();
        let local_count = leb128::checked_u32(body.locals.len(), "local group count")?;
        inner.extend_from_slice(&leb128::encode_u32(local_count));
        for local in &body.locals {
            inner.extend_from_slice(&leb128::encode_u32(local.count));
            write_value_type(&mut inner, local.ty)?;
        }
        inner.extend_from_slice(&body.code);
        inner.push(END_OPCODE);

        let body_size = leb128::checked_u32(inner.len(), "body size")?;
        buf.extend_from_slice(&leb128::encode_u32(body_size));
        buf.extend_from_slice(&inner);
    }
    Ok(buf)
}

/// Encode one section's payload, without id or length prefix.
pub fn encode_payload(section: &Section) -> Result<Vec<u8>, CodecError> {
    match section {
        Section::Type(types) => encode_type_section(types),
        Section::Function(indices) => encode_function_section(indices),
        Section::Export(exports) => encode_export_section(exports),
        Section::Code(bodies) => encode_code_section(bodies),
    }
}
