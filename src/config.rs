//! JSON mock configuration: which methods of a target to override, and how.
//!
//! ```json
//! {
//!   "target": "Foo",
//!   "methods": [
//!     { "name": "bar", "answer": { "answer": "sub", "constraint": { "type": "range", "from": 10, "to": 20 } } },
//!     { "name": "baz", "params": ["int"], "answer": { "answer": "fixed", "value": { "string": "ok" } } },
//!     { "name": "close", "answer": { "answer": "empty" } }
//!   ]
//! }
//! ```
//!
//! Redefine and static answers carry code and can only be bound programmatically.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{ConfigError, HarnessResult};
use crate::primitives::Value;
use crate::types::{MethodSignature, ValueKind};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MockConfig {
    /// Name of the target type the bindings apply to.
    pub target: String,
    #[serde(default)]
    pub methods: Vec<MethodBinding>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MethodBinding {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ValueKind>,
    pub answer: AnswerSpec,
}

impl MethodBinding {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(self.name.clone(), self.params.iter().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "answer", rename_all = "snake_case")]
pub enum AnswerSpec {
    Empty,
    Fixed { value: Value },
    /// Decoded from fuzz bytes; the constraint descriptor is validated when applied.
    Sub {
        #[serde(default)]
        constraint: serde_json::Value,
    },
}

impl MockConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> HarnessResult<Self> {
        let text = fs::read_to_string(path)?;
        tracing::debug!("Loaded mock configuration from {}", path.display());
        Ok(Self::parse(&text)?)
    }
}
