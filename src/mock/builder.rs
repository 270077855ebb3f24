//! Incremental construction of a mock descriptor.

use std::rc::Rc;

use crate::answer::Answer;
use crate::config::{AnswerSpec, MockConfig};
use crate::decoder::{CompositeReader, Constraint, ValueDecoder};
use crate::error::{ConfigError, HarnessError, HarnessResult};
use crate::invocation::ResourceProbe;
use crate::primitives::Value;
use crate::types::MethodSignature;

use super::{Bindings, InterceptingGenerator, MockType, TargetType, TypeGenerator};

/// Binds answers to methods of a target type, then finalizes exactly once.
///
/// Signatures are resolved as they are applied, so a typo fails while the harness
/// is being built rather than during fuzzing. Applying the same signature twice
/// replaces the earlier binding.
#[derive(Debug)]
pub struct MockBuilder {
    target: Rc<TargetType>,
    bindings: Bindings,
    composite: Option<Rc<dyn CompositeReader>>,
    probe: Option<Rc<dyn ResourceProbe>>,
    finalized: bool,
}

impl MockBuilder {
    pub fn new(target: TargetType) -> Self {
        MockBuilder {
            target: Rc::new(target),
            bindings: Bindings::new(),
            composite: None,
            probe: None,
            finalized: false,
        }
    }

    /// Composite reader given to every decoder this builder creates from a constraint.
    pub fn with_composite(mut self, reader: Rc<dyn CompositeReader>) -> Self {
        self.composite = Some(reader);
        self
    }

    /// Probe sampled around each call of the built type.
    pub fn with_probe(mut self, probe: Rc<dyn ResourceProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn target(&self) -> &TargetType {
        &self.target
    }

    /// Binds an answer, or a plain value as a fixed answer, to one method.
    pub fn apply(&mut self, answer: impl Into<Answer>, signature: &MethodSignature) -> HarnessResult<&mut Self> {
        self.ensure_open()?;
        self.target.resolve(signature)?;
        let answer = answer.into();
        tracing::trace!("Binding {} answer to {}.{}", answer_name(&answer), self.target.name(), signature);
        self.bindings.insert(signature.clone(), answer);
        Ok(self)
    }

    pub fn apply_value(&mut self, value: Value, signature: &MethodSignature) -> HarnessResult<&mut Self> {
        self.apply(Answer::Fixed(value), signature)
    }

    pub fn apply_empty(&mut self, signature: &MethodSignature) -> HarnessResult<&mut Self> {
        self.apply(Answer::Empty, signature)
    }

    /// Binds a decoder-backed answer built from a constraint.
    pub fn apply_constraint(&mut self, constraint: Constraint, signature: &MethodSignature) -> HarnessResult<&mut Self> {
        let mut decoder = ValueDecoder::new(constraint)?;
        if let Some(reader) = &self.composite {
            decoder = decoder.with_composite(reader.clone());
        }
        self.apply(Answer::sub(decoder), signature)
    }

    /// Applies every binding of a configuration document.
    pub fn apply_config(&mut self, config: &MockConfig) -> HarnessResult<&mut Self> {
        if config.target != self.target.name() {
            return Err(ConfigError::TargetMismatch {
                expected: config.target.clone(),
                actual: self.target.name().to_string(),
            }
            .into());
        }
        for binding in &config.methods {
            let signature = binding.signature();
            match &binding.answer {
                AnswerSpec::Empty => self.apply_empty(&signature)?,
                AnswerSpec::Fixed { value } => self.apply_value(value.clone(), &signature)?,
                AnswerSpec::Sub { constraint } => {
                    self.apply_constraint(Constraint::from_json(constraint)?, &signature)?
                }
            };
        }
        Ok(self)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Finalizes with the in-process backend.
    pub fn build(&mut self) -> HarnessResult<MockType> {
        self.build_with(&InterceptingGenerator)
    }

    /// Finalizes with the given backend. A second call fails, even if the first
    /// was rejected by the backend.
    pub fn build_with(&mut self, backend: &dyn TypeGenerator) -> HarnessResult<MockType> {
        self.ensure_open()?;
        self.finalized = true;
        let bindings = std::mem::take(&mut self.bindings);
        tracing::info!("Finalizing mock of {} with {} bound methods", self.target.name(), bindings.len());
        let mock_type = backend.generate(self.target.clone(), bindings)?;
        Ok(match &self.probe {
            Some(probe) => mock_type.with_probe(probe.clone()),
            None => mock_type,
        })
    }

    fn ensure_open(&self) -> HarnessResult<()> {
        if self.finalized {
            return Err(HarnessError::AlreadyFinalized(self.target.name().to_string()));
        }
        Ok(())
    }
}

fn answer_name(answer: &Answer) -> &'static str {
    match answer {
        Answer::Empty => "empty",
        Answer::Fixed(_) => "fixed",
        Answer::Redefine(_) => "redefine",
        Answer::Static(_) => "static",
        Answer::Sub(_) => "sub",
    }
}
