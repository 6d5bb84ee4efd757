use crate::binary::error::{CodecError, ParseError, ParseResult};

type Input<'a> = &'a [u8];

// Decoders reject a varint that spans more groups than its width allows,
// and a final group whose value bits land past the width. Errors point at
// the first byte of the offending field.

pub fn decode_u32(input: Input) -> ParseResult<'_, u32> {
    let mut result: u32 = 0;
    let mut shift: u32 = 0;
    let mut remaining = input;

    loop {
        if remaining.is_empty() {
            return Err(ParseError::truncated(input));
        }

        let byte = remaining[0];
        remaining = &remaining[1..];

        let value = byte & 0x7F;
        if shift + 7 > 32 && value >> (32 - shift) != 0 {
            return Err(ParseError::overflow(input));
        }
        result |= (value as u32) << shift;

        if byte & 0x80 == 0 {
            return Ok((remaining, result));
        }

        shift += 7;
        if shift >= 32 {
            return Err(ParseError::overflow(input));
        }
    }
}

pub fn decode_u64(input: Input) -> ParseResult<'_, u64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut remaining = input;

    loop {
        if remaining.is_empty() {
            return Err(ParseError::truncated(input));
        }

        let byte = remaining[0];
        remaining = &remaining[1..];

        let value = byte & 0x7F;
        if shift + 7 > 64 && value >> (64 - shift) != 0 {
            return Err(ParseError::overflow(input));
        }
        result |= (value as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok((remaining, result));
        }

        shift += 7;
        if shift >= 64 {
            return Err(ParseError::overflow(input));
        }
    }
}

/// Single-group unsigned variant used for section ids and other one-byte
/// tag fields. A continuation bit here means the value cannot fit 7 bits.
pub fn decode_u7(input: Input) -> ParseResult<'_, u8> {
    if input.is_empty() {
        return Err(ParseError::truncated(input));
    }
    let byte = input[0];
    if byte & 0x80 != 0 {
        return Err(ParseError::overflow(input));
    }
    Ok((&input[1..], byte))
}

pub fn decode_i32(input: Input) -> ParseResult<'_, i32> {
    let mut result: i32 = 0;
    let mut shift: u32 = 0;
    let mut remaining = input;

    loop {
        if remaining.is_empty() {
            return Err(ParseError::truncated(input));
        }

        let byte = remaining[0];
        remaining = &remaining[1..];

        result |= ((byte & 0x7F) as i32) << shift;

        if byte & 0x80 == 0 {
            shift += 7;
            if shift < 32 && byte & 0x40 != 0 {
                // Terminal group is negative: all higher bits become 1.
                result |= -1i32 << shift;
            }
            return Ok((remaining, result));
        }

        shift += 7;
        if shift >= 32 {
            return Err(ParseError::overflow(input));
        }
    }
}

pub fn decode_i64(input: Input) -> ParseResult<'_, i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    let mut remaining = input;

    loop {
        if remaining.is_empty() {
            return Err(ParseError::truncated(input));
        }

        let byte = remaining[0];
        remaining = &remaining[1..];

        result |= ((byte & 0x7F) as i64) << shift;

        if byte & 0x80 == 0 {
            shift += 7;
            if shift < 64 && byte & 0x40 != 0 {
                result |= -1i64 << shift;
            }
            return Ok((remaining, result));
        }

        shift += 7;
        if shift >= 64 {
            return Err(ParseError::overflow(input));
        }
    }
}

/// Single-group signed variant, sign-extended from bit 6.
pub fn decode_i7(input: Input) -> ParseResult<'_, i8> {
    if input.is_empty() {
        return Err(ParseError::truncated(input));
    }
    let byte = input[0];
    if byte & 0x80 != 0 {
        return Err(ParseError::overflow(input));
    }
    let value = if byte & 0x40 != 0 {
        (byte | 0x80) as i8
    } else {
        byte as i8
    };
    Ok((&input[1..], value))
}

// Encoders always emit the minimal-length form: no trailing zero groups
// for unsigned, no redundant sign groups for signed.

pub fn encode_u32(value: u32) -> Vec<u8> {
    let mut result = Vec::new();
    let mut v = value;

    loop {
        let mut byte = (v & 0x7F) as u8;
        v >>= 7;

        if v == 0 {
            result.push(byte);
            break;
        } else {
            byte |= 0x80;
            result.push(byte);
        }
    }

    result
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut v = value;

    loop {
        let mut byte = (v & 0x7F) as u8;
        v >>= 7;

        if v == 0 {
            result.push(byte);
            break;
        } else {
            byte |= 0x80;
            result.push(byte);
        }
    }

    result
}

/// Narrow a count or byte length to the u32 domain of its wire field.
/// Collections assembled in memory can exceed it; the wire format cannot.
pub fn checked_u32(value: usize, what: &'static str) -> Result<u32, CodecError> {
    u32::try_from(value).map_err(|_| CodecError::Range {
        what,
        value: value as i64,
    })
}

pub fn encode_u7(value: u32) -> Result<u8, CodecError> {
    if value > 0x7F {
        return Err(CodecError::Range {
            what: "varuint7",
            value: value as i64,
        });
    }
    Ok(value as u8)
}

pub fn encode_i32(value: i32) -> Vec<u8> {
    let mut result = Vec::new();
    let mut v = value;

    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7; // arithmetic shift

        if (v == 0 && byte & 0x40 == 0) || (v == -1 && byte & 0x40 != 0) {
            result.push(byte);
            break;
        } else {
            result.push(byte | 0x80);
        }
    }

    result
}

pub fn encode_i64(value: i64) -> Vec<u8> {
    let mut result = Vec::new();
    let mut v = value;

    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7; // arithmetic shift

        if (v == 0 && byte & 0x40 == 0) || (v == -1 && byte & 0x40 != 0) {
            result.push(byte);
            break;
        } else {
            result.push(byte | 0x80);
        }
    }

    result
}

pub fn encode_i7(value: i32) -> Result<u8, CodecError> {
    if !(-64..=63).contains(&value) {
        return Err(CodecError::Range {
            what: "varint7",
            value: value as i64,
        });
    }
    Ok((value as u8) & 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::error::ParseErrorKind;
    use proptest::prelude::*;

    fn kind_of<O: std::fmt::Debug>(result: ParseResult<'_, O>) -> ParseErrorKind {
        match result.unwrap_err() {
            nom::Err::Error(e) | nom::Err::Failure(e) => e.kind,
            nom::Err::Incomplete(_) => panic!("complete parsers never suspend"),
        }
    }

    #[test]
    fn test_decode_u32_zero() {
        let input = [0x00];
        let (remaining, value) = decode_u32(&input).unwrap();
        assert_eq!(value, 0);
        assert_eq!(remaining.len(), 0);
    }

    #[test]
    fn test_decode_u32_small() {
        let input = [0x7F];
        let (remaining, value) = decode_u32(&input).unwrap();
        assert_eq!(value, 127);
        assert_eq!(remaining.len(), 0);
    }

    #[test]
    fn test_decode_u32_two_bytes() {
        let input = [0x80, 0x01];
        let (remaining, value) = decode_u32(&input).unwrap();
        assert_eq!(value, 128);
        assert_eq!(remaining.len(), 0);
    }

    #[test]
    fn test_decode_u32_three_bytes() {
        let input = [0x80, 0x81, 0x01];
        let (remaining, value) = decode_u32(&input).unwrap();
        assert_eq!(value, 16385);
        assert_eq!(remaining.len(), 0);
    }

    #[test]
    fn test_decode_u32_max() {
        let input = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
        let (remaining, value) = decode_u32(&input).unwrap();
        assert_eq!(value, u32::MAX);
        assert_eq!(remaining.len(), 0);
    }

    #[test]
    fn test_decode_u32_sixth_group_overflows() {
        // One continuation too many after the maximal 5-group form.
        let input = [0xFF, 0xFF, 0xFF, 0xFF, 0x8F, 0x00];
        assert_eq!(kind_of(decode_u32(&input)), ParseErrorKind::Overflow);
    }

    #[test]
    fn test_decode_u32_final_group_excess_bits() {
        // 5th group contributes bits past bit 31.
        let input = [0xFF, 0xFF, 0xFF, 0xFF, 0x1F];
        assert_eq!(kind_of(decode_u32(&input)), ParseErrorKind::Overflow);
    }

    #[test]
    fn test_decode_u32_incomplete() {
        let input = [0x80];
        assert_eq!(kind_of(decode_u32(&input)), ParseErrorKind::Truncated);
    }

    #[test]
    fn test_decode_u32_empty() {
        assert_eq!(kind_of(decode_u32(&[])), ParseErrorKind::Truncated);
    }

    #[test]
    fn test_decode_u64_max() {
        let input = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let (remaining, value) = decode_u64(&input).unwrap();
        assert_eq!(value, u64::MAX);
        assert_eq!(remaining.len(), 0);
    }

    #[test]
    fn test_decode_u64_incomplete() {
        let input = [0x80];
        assert_eq!(kind_of(decode_u64(&input)), ParseErrorKind::Truncated);
    }

    #[test]
    fn test_decode_u64_final_group_excess_bits() {
        let input = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert_eq!(kind_of(decode_u64(&input)), ParseErrorKind::Overflow);
    }

    #[test]
    fn test_decode_u7() {
        let input = [0x2A, 0xFF];
        let (remaining, value) = decode_u7(&input).unwrap();
        assert_eq!(value, 42);
        assert_eq!(remaining, &[0xFFu8]);
    }

    #[test]
    fn test_decode_u7_continuation_overflows() {
        let input = [0x80, 0x01];
        assert_eq!(kind_of(decode_u7(&input)), ParseErrorKind::Overflow);
    }

    #[test]
    fn test_decode_i32_zero() {
        let input = [0x00];
        let (_, value) = decode_i32(&input).unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn test_decode_i32_minus_one() {
        let input = [0x7F];
        let (_, value) = decode_i32(&input).unwrap();
        assert_eq!(value, -1);
    }

    #[test]
    fn test_decode_i32_minus_two() {
        let input = [0x7E];
        let (_, value) = decode_i32(&input).unwrap();
        assert_eq!(value, -2);
    }

    #[test]
    fn test_decode_i32_minus_sixty_four() {
        let input = [0x40];
        let (_, value) = decode_i32(&input).unwrap();
        assert_eq!(value, -64);
    }

    #[test]
    fn test_decode_i32_min() {
        let input = [0x80, 0x80, 0x80, 0x80, 0x78];
        let (_, value) = decode_i32(&input).unwrap();
        assert_eq!(value, i32::MIN);
    }

    #[test]
    fn test_decode_i32_sixth_group_overflows() {
        let input = [0x80, 0x80, 0x80, 0x80, 0x80, 0x7F];
        assert_eq!(kind_of(decode_i32(&input)), ParseErrorKind::Overflow);
    }

    #[test]
    fn test_decode_i32_incomplete() {
        let input = [0x80];
        assert_eq!(kind_of(decode_i32(&input)), ParseErrorKind::Truncated);
    }

    #[test]
    fn test_decode_i64_incomplete() {
        let input = [0x80];
        assert_eq!(kind_of(decode_i64(&input)), ParseErrorKind::Truncated);
    }

    #[test]
    fn test_decode_i7() {
        let input = [0x60];
        let (_, value) = decode_i7(&input).unwrap();
        assert_eq!(value, -0x20);
    }

    #[test]
    fn test_decode_i7_positive() {
        let input = [0x3F];
        let (_, value) = decode_i7(&input).unwrap();
        assert_eq!(value, 63);
    }

    #[test]
    fn test_encode_u32_zero() {
        assert_eq!(encode_u32(0), [0x00]);
    }

    #[test]
    fn test_encode_u32_small() {
        assert_eq!(encode_u32(127), [0x7F]);
    }

    #[test]
    fn test_encode_u32_two_bytes() {
        assert_eq!(encode_u32(128), [0x80, 0x01]);
    }

    #[test]
    fn test_encode_u32_max() {
        assert_eq!(encode_u32(u32::MAX), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_encode_u64_max() {
        assert_eq!(
            encode_u64(u64::MAX),
            [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn test_checked_u32_accepts_wire_domain() {
        assert_eq!(checked_u32(0, "count").unwrap(), 0);
        assert_eq!(checked_u32(u32::MAX as usize, "count").unwrap(), u32::MAX);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_checked_u32_rejects_oversized_lengths() {
        let too_big = u32::MAX as usize + 1;
        assert!(matches!(
            checked_u32(too_big, "name length"),
            Err(CodecError::Range {
                what: "name length",
                value,
            }) if value == too_big as i64
        ));
    }

    #[test]
    fn test_encode_u7_boundary() {
        assert_eq!(encode_u7(127).unwrap(), 0x7F);
        assert!(matches!(
            encode_u7(128),
            Err(CodecError::Range { value: 128, .. })
        ));
    }

    #[test]
    fn test_encode_i32_zero() {
        assert_eq!(encode_i32(0), [0x00]);
    }

    #[test]
    fn test_encode_i32_positive() {
        assert_eq!(encode_i32(127), [0xFF, 0x00]);
    }

    #[test]
    fn test_encode_i32_negative() {
        assert_eq!(encode_i32(-2), [0x7E]);
    }

    #[test]
    fn test_encode_i32_min() {
        assert_eq!(encode_i32(i32::MIN), [0x80, 0x80, 0x80, 0x80, 0x78]);
    }

    #[test]
    fn test_encode_i7_sentinels() {
        assert_eq!(encode_i7(-0x20).unwrap(), 0x60);
        assert_eq!(encode_i7(-1).unwrap(), 0x7F);
        assert_eq!(encode_i7(-64).unwrap(), 0x40);
        assert!(matches!(encode_i7(64), Err(CodecError::Range { .. })));
        assert!(matches!(encode_i7(-65), Err(CodecError::Range { .. })));
    }

    #[test]
    fn test_roundtrip_u32_values() {
        let test_values = vec![0, 1, 127, 128, 255, 256, 65535, 65536, u32::MAX];

        for value in test_values {
            let encoded = encode_u32(value);
            let (remaining, decoded) = decode_u32(&encoded).unwrap();
            assert_eq!(value, decoded);
            assert_eq!(remaining.len(), 0);
        }
    }

    #[test]
    fn test_roundtrip_i32_values() {
        let test_values = vec![
            0,
            1,
            127,
            128,
            255,
            256,
            -1,
            -2,
            -64,
            -65,
            -127,
            -128,
            i32::MIN,
            i32::MAX,
        ];

        for value in test_values {
            let encoded = encode_i32(value);
            let (remaining, decoded) = decode_i32(&encoded).unwrap();
            assert_eq!(value, decoded);
            assert_eq!(remaining.len(), 0);
        }
    }

    fn minimal_len_u64(value: u64) -> usize {
        if value == 0 {
            1
        } else {
            (64 - value.leading_zeros() as usize).div_ceil(7)
        }
    }

    proptest! {
        #[test]
        fn prop_roundtrip_u32(value in any::<u32>()) {
            let encoded = encode_u32(value);
            let (remaining, decoded) = decode_u32(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert!(remaining.is_empty());
        }

        #[test]
        fn prop_roundtrip_u64(value in any::<u64>()) {
            let encoded = encode_u64(value);
            let (remaining, decoded) = decode_u64(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert!(remaining.is_empty());
        }

        #[test]
        fn prop_roundtrip_i32(value in any::<i32>()) {
            let encoded = encode_i32(value);
            let (remaining, decoded) = decode_i32(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert!(remaining.is_empty());
        }

        #[test]
        fn prop_roundtrip_i64(value in any::<i64>()) {
            let encoded = encode_i64(value);
            let (remaining, decoded) = decode_i64(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert!(remaining.is_empty());
        }

        #[test]
        fn prop_unsigned_encoding_is_minimal(value in any::<u64>()) {
            prop_assert_eq!(encode_u64(value).len(), minimal_len_u64(value));
            prop_assert_eq!(encode_u32(value as u32).len(), minimal_len_u64(value as u32 as u64));
        }
    }
}
