use proptest::prelude::*;
use mockingbird_core::decoder::range::map_into_range;
use mockingbird_core::{ByteSource, ConfigError, Constraint, Value, ValueDecoder, ValueKind};

fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Byte(v) => *v as i64,
        Value::Char(v) => *v as i64,
        Value::Short(v) => *v as i64,
        Value::Int(v) => *v as i64,
        Value::Long(v) => *v,
        other => panic!("not an integral value: {:?}", other),
    }
}

fn arb_integral_kind() -> impl Strategy<Value = ValueKind> {
    prop_oneof![
        Just(ValueKind::Byte),
        Just(ValueKind::Char),
        Just(ValueKind::Short),
        Just(ValueKind::Int),
        Just(ValueKind::Long),
    ]
}

fn arb_bounds() -> impl Strategy<Value = (i64, i64)> {
    (any::<i64>(), any::<i64>()).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_map_into_range_stays_in_bounds(raw in any::<u64>(), (from, to) in arb_bounds()) {
        let mapped = map_into_range(raw, from, to);
        prop_assert!(from <= mapped && mapped <= to);
    }

    #[test]
    fn prop_degenerate_range_is_constant(raw in any::<u64>(), at in any::<i64>()) {
        prop_assert_eq!(map_into_range(raw, at, at), at);
    }

    /// Decoded values land in the range narrowed to the kind's domain, or no value
    /// is produced when the two are disjoint.
    #[test]
    fn prop_ranged_decode_in_bounds(
        kind in arb_integral_kind(),
        (from, to) in arb_bounds(),
        bytes in prop::collection::vec(any::<u8>(), 8)
    ) {
        let (lo, hi) = kind.integral_bounds().unwrap();
        let mut decoder = ValueDecoder::range(from, to).unwrap();
        decoder.bind(ByteSource::new(bytes).shared());

        match decoder.decode(Some(&kind)) {
            Some(value) => {
                prop_assert!(value.is_kind(&kind));
                let n = as_i64(&value);
                prop_assert!(from.max(lo) <= n && n <= to.min(hi));
            }
            None => prop_assert!(from.max(lo) > to.min(hi)),
        }
    }

    #[test]
    fn prop_inverted_range_rejected(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let (from, to) = (a.max(b), a.min(b));
        prop_assert_eq!(Constraint::range(from, to), Err(ConfigError::InvalidRange { from, to }));
        prop_assert!(ValueDecoder::range(from, to).is_err());
    }
}

#[test]
fn ranged_int_example() {
    let mut decoder = ValueDecoder::range(10, 20).unwrap();
    decoder.bind(ByteSource::new([0, 0, 0, 5]).shared());
    assert_eq!(decoder.decode(Some(&ValueKind::Int)), Some(Value::Int(15)));
}
