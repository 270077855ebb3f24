#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Mockingbird-Core turns a fuzzer's raw byte buffer into typed values and mocked
//! object behavior.
//!
//! A harness declares the type it wants to mock ([`TargetType`]), binds an
//! [`Answer`] to some of its methods with a [`MockBuilder`], and finalizes the
//! descriptor into a [`MockType`]. Each fuzz iteration wraps the input in a
//! [`ByteSource`], binds it to the type, and runs the program under test against
//! instances of the mock. Decoder-backed answers consume the bytes in call order,
//! so a fixed input replays byte-for-byte; every call is journaled as an
//! [`InvocationRecord`] for triage.

// Shared type tags: value kinds and method signatures.
pub mod types;

// Values, faults and identifiers.
pub mod primitives;

pub use primitives::*;

pub mod error;

// Fuzz byte buffer and chunk windows.
pub mod source;

// Bytes -> typed values under a decoding constraint.
pub mod decoder;

// Per-call behavior of a mocked method.
pub mod answer;

pub mod invocation;

pub mod mock;

pub mod config;

// Coverage instrumentation of class files before a run.
pub mod instrument;

pub use answer::Answer;
pub use config::MockConfig;
pub use decoder::{Constraint, ValueDecoder};
pub use error::{ConfigError, DecodeError, HarnessError, HarnessResult};
pub use invocation::InvocationRecord;
pub use mock::{MockBuilder, MockInstance, MockType, TargetType};
pub use source::{ByteSource, SharedSource};
pub use types::{MethodSignature, ValueKind};

/// Installs a `RUST_LOG`-filtered fmt subscriber for fuzz drivers. Does nothing if
/// a global subscriber is already set.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
