//!
//! Defines error types for the Mockingbird harness core.

use crate::types::ValueKind;

/// Errors raised while turning fuzz bytes into values.
///
/// These never escape a mock: a failing decode yields no value for that call and
/// the decoder stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the read requires. Nothing was consumed.
    #[error("byte source exhausted: requested {requested} bytes, {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
    /// No decoding routine exists for the requested kind.
    #[error("unsupported value kind: {0}")]
    Unsupported(ValueKind),
    /// The configured range does not intersect the domain of the requested kind.
    #[error("range [{from}, {to}] does not fit kind {kind}")]
    OutOfRange { kind: ValueKind, from: i64, to: i64 },
    /// A composite layout nests deeper than the reader allows.
    #[error("composite nesting exceeds depth {0}")]
    DepthExceeded(usize),
}

/// Configuration errors, raised once at harness-build time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A range constraint with `from > to`.
    #[error("invalid range: from {from} is greater than to {to}")]
    InvalidRange { from: i64, to: i64 },
    /// A constraint is missing a parameter its type requires.
    #[error("constraint type '{kind}' requires parameter '{name}'")]
    MissingParameter { kind: String, name: String },
    /// A parameter is present but has the wrong shape.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    /// A mock configuration names a different target type than the builder's.
    #[error("configuration targets '{expected}' but builder targets '{actual}'")]
    TargetMismatch { expected: String, actual: String },
    /// The configuration document is not valid JSON for its schema.
    #[error("malformed configuration: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Structural errors surfaced to the harness driver during the build phase.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A method signature does not resolve against the target's declared methods.
    #[error("no method {signature} declared on {target}")]
    UnresolvedMethod { target: String, signature: String },
    /// The mock descriptor was already finalized into a concrete type.
    #[error("mock descriptor for {0} was already finalized")]
    AlreadyFinalized(String),
    /// The type-generation backend rejected the base type.
    #[error("type generation failed for {target}: {reason}")]
    Backend { target: String, reason: String },
    /// An invocation record's outcome was set more than once.
    #[error("outcome already recorded for call to {0}")]
    OutcomeAlreadySet(String),
    /// The coverage instrumentor could not process a class.
    #[error("cannot instrument {class}: {reason}")]
    Instrumentation { class: String, reason: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used by build-phase operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
