use proptest::prelude::*;
use mockingbird_core::{ByteSource, Value, ValueDecoder, ValueKind};

fn arb_primitive_kind() -> impl Strategy<Value = ValueKind> {
    prop_oneof![
        Just(ValueKind::Boolean),
        Just(ValueKind::Byte),
        Just(ValueKind::Char),
        Just(ValueKind::Short),
        Just(ValueKind::Int),
        Just(ValueKind::Long),
        Just(ValueKind::Float),
        Just(ValueKind::Double),
    ]
}

fn decode_all(kinds: &[ValueKind], bytes: &[u8]) -> Vec<Option<Value>> {
    let mut decoder = ValueDecoder::default_decoder();
    decoder.bind(ByteSource::new(bytes.to_vec()).shared());
    kinds.iter().map(|kind| decoder.decode(Some(kind))).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A default decode consumes exactly the kind's natural width, or nothing.
    #[test]
    fn prop_default_consumes_natural_width(
        kind in arb_primitive_kind(),
        bytes in prop::collection::vec(any::<u8>(), 0..16)
    ) {
        let width = kind.natural_width().unwrap();
        let source = ByteSource::new(bytes.clone()).shared();
        let mut decoder = ValueDecoder::default_decoder();
        decoder.bind(source.clone());

        let value = decoder.decode(Some(&kind));
        if bytes.len() >= width {
            let value = value.expect("enough bytes for one value");
            prop_assert!(value.is_kind(&kind));
            prop_assert_eq!(source.borrow().position(), width);
        } else {
            prop_assert_eq!(value, None);
            prop_assert_eq!(source.borrow().position(), 0);
            prop_assert!(source.borrow().is_exhausted());
        }
    }

    /// The same bytes and the same call order always decode to the same values.
    #[test]
    fn prop_decoding_is_deterministic(
        kinds in prop::collection::vec(arb_primitive_kind(), 1..8),
        bytes in prop::collection::vec(any::<u8>(), 0..64)
    ) {
        // NaN never equals itself; compare the rendered values.
        let first = format!("{:?}", decode_all(&kinds, &bytes));
        let second = format!("{:?}", decode_all(&kinds, &bytes));
        prop_assert_eq!(first, second);
    }

    /// Int decoding is big-endian two's complement.
    #[test]
    fn prop_int_is_big_endian(n in any::<i32>(), tail in prop::collection::vec(any::<u8>(), 0..4)) {
        let mut bytes = n.to_be_bytes().to_vec();
        bytes.extend(tail);
        prop_assert_eq!(decode_all(&[ValueKind::Int], &bytes), vec![Some(Value::Int(n))]);
    }

    /// A failed decode leaves the decoder usable once more bytes arrive.
    #[test]
    fn prop_exhaustion_recovers_after_extend(n in any::<i64>(), split in 0usize..8) {
        let bytes = n.to_be_bytes();
        let source = ByteSource::new(bytes[..split].to_vec()).shared();
        let mut decoder = ValueDecoder::default_decoder();
        decoder.bind(source.clone());

        prop_assert_eq!(decoder.decode(Some(&ValueKind::Long)), None);
        source.borrow_mut().extend(&bytes[split..]);
        prop_assert_eq!(decoder.decode(Some(&ValueKind::Long)), Some(Value::Long(n)));
    }
}
