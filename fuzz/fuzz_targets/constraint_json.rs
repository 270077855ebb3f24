#![no_main]

// Harness: constraint_json
// Feeds arbitrary text to the constraint and mock-config parsers. Parsing must
// never panic, and any accepted range must be ordered.

use libfuzzer_sys::fuzz_target;
use mockingbird_core::{Constraint, MockConfig};

fuzz_target!(|text: &str| {
    if let Ok(Constraint::Range { from, to }) = Constraint::parse(text) {
        assert!(from <= to);
    }
    let _ = MockConfig::parse(text);
});
