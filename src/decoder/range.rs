//! Ranged decoding of integral kinds.

use crate::error::DecodeError;
use crate::primitives::Value;
use crate::source::ByteInput;
use crate::types::ValueKind;

/// Maps a raw unsigned draw into `[from, to]` as `from + (raw mod (to - from + 1))`.
///
/// Requires `from <= to`; the full `i64` span is handled without overflow.
#[inline]
pub fn map_into_range(raw: u64, from: i64, to: i64) -> i64 {
    debug_assert!(from <= to);
    let span = (to as i128 - from as i128 + 1) as u128;
    (from as i128 + (raw as u128 % span) as i128) as i64
}

/// Reads one raw value of `kind`'s width and maps it into the range, narrowed to
/// the kind's own domain. Nothing is consumed if the two do not intersect.
pub(crate) fn read_ranged(
    input: &mut dyn ByteInput,
    kind: &ValueKind,
    from: i64,
    to: i64,
) -> Result<Value, DecodeError> {
    let (lo, hi) = kind
        .integral_bounds()
        .ok_or_else(|| DecodeError::Unsupported(kind.clone()))?;
    let (start, end) = (from.max(lo), to.min(hi));
    let out_of_range = || DecodeError::OutOfRange {
        kind: kind.clone(),
        from,
        to,
    };
    if start > end {
        return Err(out_of_range());
    }

    let raw = input.read_unsigned(kind)?;
    let mapped = map_into_range(raw, start, end);
    let value = match kind {
        ValueKind::Byte => Value::Byte(i8::try_from(mapped).map_err(|_| out_of_range())?),
        ValueKind::Short => Value::Short(i16::try_from(mapped).map_err(|_| out_of_range())?),
        ValueKind::Char => Value::Char(u16::try_from(mapped).map_err(|_| out_of_range())?),
        ValueKind::Int => Value::Int(i32::try_from(mapped).map_err(|_| out_of_range())?),
        _ => Value::Long(mapped),
    };
    Ok(value)
}
