//!
//! Answer strategies: what a mocked method does when it is called.
//!
//! Each binding resolves to exactly one [`Answer`], evaluated at call time. The
//! variants carry only what they need: nothing, a constant, a closure with access
//! to the original implementation, a closure over the static shape, or a decoder.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::decoder::ValueDecoder;
use crate::primitives::{CallResult, Fault, MockId, Value};
use crate::source::SharedSource;
use crate::types::{MethodShape, ValueKind};

/// The original (un-mocked) implementation of a method.
pub type OriginalFn = Rc<dyn Fn(&[Value]) -> CallResult>;

/// Behavior that wraps or inspects the original implementation.
pub type RedefineFn = Rc<dyn Fn(&Call<'_>) -> CallResult>;

/// Behavior that sees only the static shape of the method.
pub type StaticFn = Rc<dyn Fn(&StaticCall<'_>) -> CallResult>;

/// Handle to the original implementation of the method being intercepted.
#[derive(Clone, Copy)]
pub struct Original<'a> {
    method: &'a MethodShape,
    implementation: Option<&'a OriginalFn>,
}

impl<'a> Original<'a> {
    pub fn new(method: &'a MethodShape, implementation: Option<&'a OriginalFn>) -> Self {
        Original { method, implementation }
    }

    pub fn exists(&self) -> bool {
        self.implementation.is_some()
    }

    /// Runs the original implementation; a method without one faults.
    pub fn invoke(&self, args: &[Value]) -> CallResult {
        match self.implementation {
            Some(implementation) => implementation(args),
            None => Err(Fault::new(
                "AbstractMethodError",
                format!("{}.{} has no original implementation", self.method.declaring_type, self.method.name),
            )),
        }
    }
}

/// Everything known about one intercepted call.
pub struct Call<'a> {
    /// The mock instance receiving the call; `None` for static dispatch.
    pub receiver: Option<MockId>,
    pub args: &'a [Value],
    pub method: &'a MethodShape,
    pub original: Original<'a>,
}

impl<'a> Call<'a> {
    /// The view a static answer gets: no original implementation to call.
    pub fn as_static(&self) -> StaticCall<'a> {
        StaticCall {
            receiver: self.receiver,
            args: self.args,
            name: &self.method.name,
            return_kind: &self.method.return_kind,
        }
    }
}

pub struct StaticCall<'a> {
    pub receiver: Option<MockId>,
    pub args: &'a [Value],
    pub name: &'a str,
    pub return_kind: &'a ValueKind,
}

/// Synthesizes a fresh value per call from a bound decoder.
#[derive(Debug)]
pub struct SubAnswer {
    decoder: RefCell<ValueDecoder>,
}

impl SubAnswer {
    pub fn new(decoder: ValueDecoder) -> Self {
        SubAnswer {
            decoder: RefCell::new(decoder),
        }
    }

    pub fn bind(&self, source: SharedSource) {
        self.decoder.borrow_mut().bind(source);
    }

    /// One independent decode of the declared return kind.
    pub fn produce(&self, return_kind: &ValueKind) -> Option<Value> {
        self.decoder.borrow_mut().decode(Some(return_kind))
    }
}

pub enum Answer {
    /// Always produces no value.
    Empty,
    /// Always produces the same constant.
    Fixed(Value),
    /// Decides per call whether to invoke the original, substitute a value, or both.
    Redefine(RedefineFn),
    /// Dispatches on the static shape only.
    Static(StaticFn),
    /// Decodes a fresh value from the fuzz bytes.
    Sub(SubAnswer),
}

impl Answer {
    pub fn fixed(value: Value) -> Self {
        Answer::Fixed(value)
    }

    pub fn redefine<F>(f: F) -> Self
    where
        F: Fn(&Call<'_>) -> CallResult + 'static,
    {
        Answer::Redefine(Rc::new(f))
    }

    pub fn static_dispatch<F>(f: F) -> Self
    where
        F: Fn(&StaticCall<'_>) -> CallResult + 'static,
    {
        Answer::Static(Rc::new(f))
    }

    pub fn sub(decoder: ValueDecoder) -> Self {
        Answer::Sub(SubAnswer::new(decoder))
    }

    /// Evaluates the answer for one call.
    pub fn respond(&self, call: &Call<'_>) -> CallResult {
        match self {
            Answer::Empty => Ok(None),
            Answer::Fixed(value) => Ok(Some(value.clone())),
            Answer::Redefine(f) => f(call),
            Answer::Static(f) => f(&call.as_static()),
            Answer::Sub(sub) => Ok(sub.produce(&call.method.return_kind)),
        }
    }

    /// Points a decoder-backed answer at the source for the current iteration.
    pub fn bind(&self, source: &SharedSource) {
        if let Answer::Sub(sub) = self {
            sub.bind(source.clone());
        }
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Empty => write!(f, "Empty"),
            Answer::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Answer::Redefine(_) => write!(f, "Redefine(..)"),
            Answer::Static(_) => write!(f, "Static(..)"),
            Answer::Sub(sub) => f.debug_tuple("Sub").field(sub).finish(),
        }
    }
}

impl From<Value> for Answer {
    fn from(value: Value) -> Self {
        Answer::Fixed(value)
    }
}
