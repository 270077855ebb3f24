#![no_main]

// Harness: decode_stream
// Drives one decoder over arbitrary bytes with an arbitrary kind sequence and
// checks that every produced value has the requested kind, ranged values stay in
// bounds, and replaying the same input yields the same values.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mockingbird_core::{ByteSource, Constraint, Value, ValueDecoder, ValueKind};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Kind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    BigInteger,
    BigDecimal,
}

impl From<Kind> for ValueKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Boolean => ValueKind::Boolean,
            Kind::Byte => ValueKind::Byte,
            Kind::Char => ValueKind::Char,
            Kind::Short => ValueKind::Short,
            Kind::Int => ValueKind::Int,
            Kind::Long => ValueKind::Long,
            Kind::Float => ValueKind::Float,
            Kind::Double => ValueKind::Double,
            Kind::String => ValueKind::String,
            Kind::Bytes => ValueKind::Bytes,
            Kind::BigInteger => ValueKind::BigInteger,
            Kind::BigDecimal => ValueKind::BigDecimal,
        }
    }
}

#[derive(Arbitrary, Debug)]
enum Strategy {
    Default,
    Range(i64, i64),
    Chunk(u8),
}

#[derive(Arbitrary, Debug)]
struct Input {
    strategy: Strategy,
    kinds: Vec<Kind>,
    data: Vec<u8>,
}

fn run(constraint: Constraint, kinds: &[ValueKind], data: &[u8]) -> Vec<Option<Value>> {
    let Ok(mut decoder) = ValueDecoder::new(constraint) else {
        return Vec::new();
    };
    decoder.bind(ByteSource::new(data.to_vec()).shared());
    kinds.iter().map(|kind| decoder.decode(Some(kind))).collect()
}

fuzz_target!(|input: Input| {
    let constraint = match input.strategy {
        Strategy::Default => Constraint::Default,
        Strategy::Range(a, b) => Constraint::Range { from: a.min(b), to: a.max(b) },
        Strategy::Chunk(size) => Constraint::Chunk { size: size as usize },
    };
    let kinds: Vec<ValueKind> = input.kinds.iter().copied().map(ValueKind::from).collect();

    let first = run(constraint, &kinds, &input.data);
    for (kind, value) in kinds.iter().zip(&first) {
        if let Some(value) = value {
            assert!(value.is_kind(kind), "{:?} decoded as {:?}", kind, value);
            if let (Constraint::Range { from, to }, Value::Long(n)) = (constraint, value) {
                assert!(from <= *n && *n <= to);
            }
        }
    }
    // NaN never equals itself; compare the rendered values.
    assert_eq!(format!("{:?}", first), format!("{:?}", run(constraint, &kinds, &input.data)));
});
