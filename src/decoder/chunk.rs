//! Composite assembly from a chunk of `size` bytes.

use num_bigint::{BigInt, Sign};

use crate::error::DecodeError;
use crate::primitives::{BigDecimal, Value};
use crate::source::ByteInput;
use crate::types::ValueKind;

/// Bytes one chunked decode of `kind` needs: `size`, plus a 4-byte scale for decimals.
pub(crate) fn chunk_len(kind: &ValueKind, size: usize) -> usize {
    match kind {
        ValueKind::BigDecimal => size.saturating_add(4),
        _ => size,
    }
}

pub(crate) fn is_chunk_composite(kind: &ValueKind) -> bool {
    matches!(
        kind,
        ValueKind::String | ValueKind::Bytes | ValueKind::BigInteger | ValueKind::BigDecimal
    )
}

pub(crate) fn read_composite(input: &mut dyn ByteInput, kind: &ValueKind, size: usize) -> Result<Value, DecodeError> {
    match kind {
        ValueKind::String => Ok(Value::latin1(input.take(size)?)),
        ValueKind::Bytes => Ok(Value::Bytes(input.take(size)?.to_vec())),
        ValueKind::BigInteger => Ok(Value::BigInteger(from_sign_magnitude(input.take(size)?))),
        ValueKind::BigDecimal => {
            let unscaled = from_sign_magnitude(input.take(size)?);
            let scale = input.read_i32()?;
            Ok(Value::BigDecimal(BigDecimal::new(unscaled, scale)))
        }
        other => Err(DecodeError::Unsupported(other.clone())),
    }
}

/// Interprets bytes as sign-magnitude: the top bit of the first byte is the sign,
/// the remaining bits are a big-endian magnitude. Empty input and negative zero are zero.
pub fn from_sign_magnitude(bytes: &[u8]) -> BigInt {
    let Some((&first, rest)) = bytes.split_first() else {
        return BigInt::from(0u8);
    };
    let mut magnitude = Vec::with_capacity(bytes.len());
    magnitude.push(first & 0x7f);
    magnitude.extend_from_slice(rest);
    let sign = if first & 0x80 != 0 { Sign::Minus } else { Sign::Plus };
    BigInt::from_bytes_be(sign, &magnitude)
}

/// Encodes `value` in exactly `size` sign-magnitude bytes, if it fits.
pub fn to_sign_magnitude(value: &BigInt, size: usize) -> Option<Vec<u8>> {
    let (sign, magnitude) = value.to_bytes_be();
    let magnitude: &[u8] = if value.sign() == Sign::NoSign { &[] } else { &magnitude };
    if magnitude.len() > size {
        return None;
    }
    let mut out = vec![0u8; size - magnitude.len()];
    out.extend_from_slice(magnitude);
    match out.first_mut() {
        Some(first) if *first & 0x80 != 0 => return None,
        Some(first) if sign == Sign::Minus => *first |= 0x80,
        _ => {}
    }
    Some(out)
}
