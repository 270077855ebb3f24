//!
//! Mock descriptors and the concrete mock types they finalize into.
//!
//! A [`TargetType`] declares the methods a mock may override. A [`MockBuilder`]
//! binds an [`Answer`] to some of them and hands the bindings to a
//! [`TypeGenerator`] exactly once. The resulting [`MockType`] is immutable; its
//! instances dispatch every call through the bound answers and journal an
//! [`InvocationRecord`] per call.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::answer::{Answer, Call, Original, OriginalFn};
use crate::error::{HarnessError, HarnessResult};
use crate::invocation::{self, InvocationRecord, NoopProbe, ResourceProbe};
use crate::primitives::{CallResult, MockId, Value};
use crate::source::SharedSource;
use crate::types::{MethodShape, MethodSignature, ValueKind};

pub mod builder;

pub use builder::MockBuilder;

/// A declared method and, if it has one, its original implementation.
#[derive(Clone)]
pub struct MethodDecl {
    pub shape: MethodShape,
    pub original: Option<OriginalFn>,
}

impl std::fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDecl")
            .field("shape", &self.shape)
            .field("original", &self.original.is_some())
            .finish()
    }
}

/// The type being mocked: a name and its declared methods.
#[derive(Debug, Clone)]
pub struct TargetType {
    name: String,
    sealed: bool,
    methods: BTreeMap<MethodSignature, MethodDecl>,
}

impl TargetType {
    pub fn new(name: impl Into<String>) -> Self {
        TargetType {
            name: name.into(),
            sealed: false,
            methods: BTreeMap::new(),
        }
    }

    /// Declares an abstract instance method.
    pub fn method(self, name: &str, params: impl IntoIterator<Item = ValueKind>, return_kind: ValueKind) -> Self {
        self.declare(name, params, return_kind, false, None)
    }

    /// Declares an instance method with an original implementation.
    pub fn method_with<F>(
        self,
        name: &str,
        params: impl IntoIterator<Item = ValueKind>,
        return_kind: ValueKind,
        original: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> CallResult + 'static,
    {
        self.declare(name, params, return_kind, false, Some(Rc::new(original)))
    }

    /// Declares a static method, dispatched without a receiver.
    pub fn static_method(self, name: &str, params: impl IntoIterator<Item = ValueKind>, return_kind: ValueKind) -> Self {
        self.declare(name, params, return_kind, true, None)
    }

    /// Marks the type as not subclassable; type generation will reject it.
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    fn declare(
        mut self,
        name: &str,
        params: impl IntoIterator<Item = ValueKind>,
        return_kind: ValueKind,
        is_static: bool,
        original: Option<OriginalFn>,
    ) -> Self {
        let shape = MethodShape {
            declaring_type: self.name.clone(),
            name: name.to_string(),
            params: params.into_iter().collect(),
            return_kind,
            is_static,
        };
        self.methods.insert(shape.signature(), MethodDecl { shape, original });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.values()
    }

    /// Resolves a signature against the declared methods.
    pub fn resolve(&self, signature: &MethodSignature) -> HarnessResult<&MethodDecl> {
        self.methods.get(signature).ok_or_else(|| HarnessError::UnresolvedMethod {
            target: self.name.clone(),
            signature: signature.to_string(),
        })
    }
}

/// Method-to-answer bindings handed to a backend at finalization.
pub type Bindings = BTreeMap<MethodSignature, Answer>;

/// Materializes a concrete mock type from a base type and its overrides.
pub trait TypeGenerator {
    fn generate(&self, base: Rc<TargetType>, overrides: Bindings) -> HarnessResult<MockType>;
}

/// In-process backend: the generated type intercepts every call and dispatches it
/// through the bindings table.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterceptingGenerator;

impl TypeGenerator for InterceptingGenerator {
    fn generate(&self, base: Rc<TargetType>, overrides: Bindings) -> HarnessResult<MockType> {
        if base.is_sealed() {
            return Err(HarnessError::Backend {
                target: base.name().to_string(),
                reason: "type is sealed and cannot be subclassed".into(),
            });
        }
        Ok(MockType::new(base, overrides))
    }
}

#[derive(Debug)]
struct MockTypeInner {
    target: Rc<TargetType>,
    bindings: Bindings,
}

/// A finalized, instantiable mock type. Cheap to clone; clones share bindings.
#[derive(Debug, Clone)]
pub struct MockType {
    inner: Rc<MockTypeInner>,
    probe: Rc<dyn ResourceProbe>,
}

impl MockType {
    pub fn new(target: Rc<TargetType>, bindings: Bindings) -> Self {
        MockType {
            inner: Rc::new(MockTypeInner { target, bindings }),
            probe: Rc::new(NoopProbe),
        }
    }

    /// Replaces the probe sampled around each call.
    pub fn with_probe(mut self, probe: Rc<dyn ResourceProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn target(&self) -> &TargetType {
        &self.inner.target
    }

    pub fn answer_for(&self, signature: &MethodSignature) -> Option<&Answer> {
        self.inner.bindings.get(signature)
    }

    /// Points every decoder-backed answer at the source for the next iteration.
    pub fn bind_source(&self, source: &SharedSource) {
        for answer in self.inner.bindings.values() {
            answer.bind(source);
        }
    }

    pub fn instantiate(&self) -> MockInstance {
        MockInstance {
            id: MockId::generate(),
            ty: self.clone(),
            journal: RefCell::new(Vec::new()),
        }
    }

    /// Calls a static method; the answer sees no receiver.
    pub fn invoke_static(&self, signature: &MethodSignature, args: Vec<Value>) -> HarnessResult<InvocationRecord> {
        self.dispatch(None, signature, args)
    }

    fn dispatch(
        &self,
        receiver: Option<MockId>,
        signature: &MethodSignature,
        args: Vec<Value>,
    ) -> HarnessResult<InvocationRecord> {
        let decl = self.inner.target.resolve(signature)?;
        let receiver = if decl.shape.is_static { None } else { receiver };
        let mut record = InvocationRecord::begin(receiver, args, &decl.shape);
        let call = Call {
            receiver,
            args: record.args(),
            method: &decl.shape,
            original: Original::new(&decl.shape, decl.original.as_ref()),
        };
        let measured = invocation::measure(self.probe.as_ref(), || match self.answer_for(signature) {
            Some(answer) => answer.respond(&call),
            // Unbound methods keep their original behavior, or do nothing.
            None if call.original.exists() => call.original.invoke(call.args),
            None => Ok(None),
        });
        if let Err(fault) = &measured.result {
            tracing::debug!("{}.{} faulted: {}", decl.shape.declaring_type, decl.shape.name, fault);
        }
        record.complete(measured)?;
        Ok(record)
    }
}

/// One instance of a mock type. Journals every call made through it, in order.
#[derive(Debug)]
pub struct MockInstance {
    id: MockId,
    ty: MockType,
    journal: RefCell<Vec<InvocationRecord>>,
}

impl MockInstance {
    pub fn id(&self) -> MockId {
        self.id
    }

    pub fn mock_type(&self) -> &MockType {
        &self.ty
    }

    /// Calls a method on this instance.
    ///
    /// Faults raised by the answer or the original implementation are captured in
    /// the journaled record and yield `Ok(None)`; only structural errors (an
    /// undeclared signature) are returned as `Err`.
    pub fn invoke(&self, signature: &MethodSignature, args: Vec<Value>) -> HarnessResult<Option<Value>> {
        let record = self.ty.dispatch(Some(self.id), signature, args)?;
        let value = record.return_value().cloned();
        self.journal.borrow_mut().push(record);
        Ok(value)
    }

    /// Number of records journaled and not yet taken.
    pub fn call_count(&self) -> usize {
        self.journal.borrow().len()
    }

    /// The most recent record, if any.
    pub fn last_record(&self) -> Option<InvocationRecord> {
        self.journal.borrow().last().cloned()
    }

    /// Drains the journal for triage or replay.
    pub fn take_records(&self) -> Vec<InvocationRecord> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }

    /// The journal as JSON, without draining it.
    pub fn journal_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.journal.borrow())
    }
}
