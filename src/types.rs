// Shared type tags used across the decoder, answer and mock modules.
// Runtime values live in `primitives.rs`; this file only describes shapes.

use std::fmt;

/// Semantic type of a value requested from a decoder or declared by a method.
///
/// This is the closed set of kinds the harness knows how to synthesize. Anything
/// outside the fixed primitive set is routed to a composite reader by name
/// (`Object`) instead of falling through silently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// No value; the method returns nothing.
    Void,
    Boolean,
    Byte,
    /// UTF-16 code unit.
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    /// Raw byte sequence.
    Bytes,
    BigInteger,
    BigDecimal,
    /// Composite type built by a registered construction routine.
    Object(String),
}

impl ValueKind {
    /// Number of bytes a primitive kind consumes, `None` for everything else.
    pub fn natural_width(&self) -> Option<usize> {
        match self {
            ValueKind::Boolean | ValueKind::Byte => Some(1),
            ValueKind::Char | ValueKind::Short => Some(2),
            ValueKind::Int | ValueKind::Float => Some(4),
            ValueKind::Long | ValueKind::Double => Some(8),
            ValueKind::Void
            | ValueKind::String
            | ValueKind::Bytes
            | ValueKind::BigInteger
            | ValueKind::BigDecimal
            | ValueKind::Object(_) => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ValueKind::Void)
    }

    pub fn is_primitive(&self) -> bool {
        self.natural_width().is_some()
    }

    /// Integral kinds and their inclusive domain, used by ranged decoding.
    pub fn integral_bounds(&self) -> Option<(i64, i64)> {
        match self {
            ValueKind::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            ValueKind::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            ValueKind::Char => Some((0, u16::MAX as i64)),
            ValueKind::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            ValueKind::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Void => write!(f, "void"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Byte => write!(f, "byte"),
            ValueKind::Char => write!(f, "char"),
            ValueKind::Short => write!(f, "short"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Long => write!(f, "long"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Double => write!(f, "double"),
            ValueKind::String => write!(f, "String"),
            ValueKind::Bytes => write!(f, "byte[]"),
            ValueKind::BigInteger => write!(f, "BigInteger"),
            ValueKind::BigDecimal => write!(f, "BigDecimal"),
            ValueKind::Object(name) => write!(f, "{}", name),
        }
    }
}

/// Identifies one method of a target type: its name plus ordered parameter kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ValueKind>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = ValueKind>) -> Self {
        MethodSignature {
            name: name.into(),
            params: params.into_iter().collect(),
        }
    }

    /// Signature of a method without parameters.
    pub fn nullary(name: impl Into<String>) -> Self {
        Self::new(name, [])
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

/// The static shape of a declared method: everything known without an instance.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MethodShape {
    pub declaring_type: String,
    pub name: String,
    pub params: Vec<ValueKind>,
    pub return_kind: ValueKind,
    /// Static methods are dispatched without a receiver.
    pub is_static: bool,
}

impl MethodShape {
    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(self.name.clone(), self.params.iter().cloned())
    }
}
