#![no_main]

// Harness: mock_dispatch
// Builds a small mock with one decoder-backed answer per return kind, replays an
// arbitrary call sequence against fuzz bytes, and checks every journaled record
// carries exactly one of a return value or a fault.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mockingbird_core::{ByteSource, Constraint, MethodSignature, MockBuilder, TargetType, ValueKind};

const METHODS: [(&str, ValueKind); 5] = [
    ("flag", ValueKind::Boolean),
    ("count", ValueKind::Int),
    ("stamp", ValueKind::Long),
    ("label", ValueKind::String),
    ("reset", ValueKind::Void),
];

#[derive(Arbitrary, Debug)]
struct Input {
    chunk: u8,
    calls: Vec<u8>,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let target = METHODS
        .iter()
        .fold(TargetType::new("Fuzzed"), |t, (name, kind)| t.method(name, [], kind.clone()));
    let mut builder = MockBuilder::new(target);
    for (name, kind) in METHODS.iter() {
        let constraint = match kind {
            ValueKind::String => Constraint::chunk(input.chunk as usize % 32),
            ValueKind::Int => Constraint::Range { from: -50, to: 50 },
            _ => Constraint::Default,
        };
        if builder.apply_constraint(constraint, &MethodSignature::nullary(*name)).is_err() {
            return;
        }
    }
    let Ok(ty) = builder.build() else {
        return;
    };
    ty.bind_source(&ByteSource::new(input.data).shared());

    let mock = ty.instantiate();
    for call in input.calls.iter().take(256) {
        let (name, _) = &METHODS[*call as usize % METHODS.len()];
        let _ = mock.invoke(&MethodSignature::nullary(*name), Vec::new());
    }
    for record in mock.take_records() {
        assert!(record.is_complete());
        if record.return_kind().is_void() {
            assert!(record.return_value().is_none());
        } else {
            assert!(record.return_value().is_some() != record.thrown().is_some());
        }
    }
});
