use proptest::prelude::*;
use num_bigint::BigInt;
use mockingbird_core::decoder::chunk::{from_sign_magnitude, to_sign_magnitude};
use mockingbird_core::primitives::BigDecimal;
use mockingbird_core::{ByteSource, Value, ValueDecoder, ValueKind};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A chunked string is exactly the chunk's bytes, one character per byte.
    #[test]
    fn prop_string_preserves_bytes(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut decoder = ValueDecoder::chunk(bytes.len());
        decoder.bind(ByteSource::new(bytes.clone()).shared());
        let value = decoder.decode(Some(&ValueKind::String)).unwrap();
        prop_assert_eq!(value.latin1_bytes(), Some(bytes));
    }

    /// Too few bytes for a chunk yields no value and consumes nothing.
    #[test]
    fn prop_short_source_consumes_nothing(size in 1usize..32, short_by in 1usize..32) {
        let available = size.saturating_sub(short_by);
        let source = ByteSource::new(vec![0x41; available]).shared();
        let mut decoder = ValueDecoder::chunk(size);
        decoder.bind(source.clone());
        prop_assert_eq!(decoder.decode(Some(&ValueKind::String)), None);
        prop_assert_eq!(source.borrow().position(), 0);
        prop_assert!(!decoder.chunk_in_progress());
    }

    /// Big integers that fit the chunk decode back to themselves.
    #[test]
    fn prop_big_integer_sign_magnitude(n in any::<i64>(), size in 9usize..16) {
        let value = BigInt::from(n);
        let bytes = to_sign_magnitude(&value, size).unwrap();
        prop_assert_eq!(from_sign_magnitude(&bytes), value.clone());

        let mut decoder = ValueDecoder::chunk(size);
        decoder.bind(ByteSource::new(bytes).shared());
        prop_assert_eq!(decoder.decode(Some(&ValueKind::BigInteger)), Some(Value::BigInteger(value)));
    }

    /// A decimal chunk is the unscaled value followed by a 4-byte scale.
    #[test]
    fn prop_big_decimal_layout(unscaled in any::<i32>(), scale in any::<i32>()) {
        let unscaled = BigInt::from(unscaled);
        let mut bytes = to_sign_magnitude(&unscaled, 5).unwrap();
        bytes.extend_from_slice(&scale.to_be_bytes());

        let source = ByteSource::new(bytes).shared();
        let mut decoder = ValueDecoder::chunk(5);
        decoder.bind(source.clone());
        prop_assert_eq!(
            decoder.decode(Some(&ValueKind::BigDecimal)),
            Some(Value::BigDecimal(BigDecimal::new(unscaled, scale)))
        );
        prop_assert_eq!(source.borrow().position(), 9);
    }
}

#[test]
fn chunk_string_example() {
    let mut decoder = ValueDecoder::chunk(3);
    decoder.bind(ByteSource::new(*b"ABC").shared());
    assert_eq!(decoder.decode(Some(&ValueKind::String)), Some(Value::String("ABC".into())));
}

#[test]
fn rebinding_recovers_after_exhaustion() {
    let mut decoder = ValueDecoder::chunk(4);
    decoder.bind(ByteSource::new([1, 2]).shared());
    assert_eq!(decoder.decode(Some(&ValueKind::Bytes)), None);

    decoder.bind(ByteSource::new([1, 2, 3, 4]).shared());
    assert_eq!(decoder.decode(Some(&ValueKind::Bytes)), Some(Value::Bytes(vec![1, 2, 3, 4])));
}
