//!
//! Invocation records: the captured inputs and outcome of one intercepted call.
//!
//! A record is created when a mocked method starts executing, with its call identity
//! fixed. Its outcome is set exactly once, when the answer (and any original
//! implementation it ran) returns or faults.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::HarnessError;
use crate::primitives::{CallResult, Fault, MockId, Value};
use crate::types::{MethodShape, ValueKind};

pub mod probe;

pub use probe::{NoopProbe, ResidentMemoryProbe, ResourceProbe};
#[cfg(any(test, feature = "test-utils"))]
pub use probe::SteppingProbe;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InvocationRecord {
    mock: Option<MockId>,
    args: Vec<Value>,
    declaring_type: String,
    method_name: String,
    return_kind: ValueKind,
    param_kinds: Vec<ValueKind>,
    outcome: Option<Outcome>,
}

/// What a completed call produced, with its telemetry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Outcome {
    pub return_value: Option<Value>,
    pub thrown: Option<Fault>,
    pub duration: Duration,
    /// Advisory change in memory usage across the call.
    pub heap_delta: i64,
}

/// A call result with the time and memory it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured {
    pub result: CallResult,
    pub duration: Duration,
    pub heap_delta: i64,
}

/// Runs `call`, sampling the probe immediately before and after it.
pub fn measure<F>(probe: &dyn ResourceProbe, call: F) -> Measured
where
    F: FnOnce() -> CallResult,
{
    let before = probe.sample();
    let start = Instant::now();
    let result = call();
    let duration = start.elapsed();
    let heap_delta = probe.sample().saturating_sub(before);
    Measured {
        result,
        duration,
        heap_delta,
    }
}

impl InvocationRecord {
    pub fn begin(mock: Option<MockId>, args: Vec<Value>, method: &MethodShape) -> Self {
        InvocationRecord {
            mock,
            args,
            declaring_type: method.declaring_type.clone(),
            method_name: method.name.clone(),
            return_kind: method.return_kind.clone(),
            param_kinds: method.params.clone(),
            outcome: None,
        }
    }

    /// Records the outcome. A successful call of a non-void method always carries a
    /// return value (the kind's default if the answer produced none); a void call
    /// carries none; a faulting call carries only the fault.
    pub fn complete(&mut self, measured: Measured) -> Result<&Outcome, HarnessError> {
        if self.outcome.is_some() {
            return Err(HarnessError::OutcomeAlreadySet(format!(
                "{}.{}",
                self.declaring_type, self.method_name
            )));
        }
        let (return_value, thrown) = match measured.result {
            Ok(_) if self.return_kind.is_void() => (None, None),
            Ok(Some(value)) => (Some(value), None),
            Ok(None) => (Value::default_for(&self.return_kind), None),
            Err(fault) => (None, Some(fault)),
        };
        Ok(self.outcome.insert(Outcome {
            return_value,
            thrown,
            duration: measured.duration,
            heap_delta: measured.heap_delta,
        }))
    }

    pub fn mock(&self) -> Option<MockId> {
        self.mock
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn return_kind(&self) -> &ValueKind {
        &self.return_kind
    }

    pub fn param_kinds(&self) -> &[ValueKind] {
        &self.param_kinds
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.outcome.as_ref()?.return_value.as_ref()
    }

    pub fn thrown(&self) -> Option<&Fault> {
        self.outcome.as_ref()?.thrown.as_ref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.outcome.as_ref().map(|o| o.duration)
    }

    pub fn heap_delta(&self) -> Option<i64> {
        self.outcome.as_ref().map(|o| o.heap_delta)
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(outcome) = &self.outcome else {
            return write!(f, "Method: {} Duration: pending Memory: 0 Result: null", self.method_name);
        };
        write!(
            f,
            "Method: {} Duration: {:?} Memory: {} Result: ",
            self.method_name, outcome.duration, outcome.heap_delta
        )?;
        match (&outcome.return_value, &outcome.thrown) {
            (Some(value), _) => write!(f, "{}", value),
            (None, Some(fault)) => write!(f, "{}", fault),
            (None, None) => write!(f, "null"),
        }
    }
}
