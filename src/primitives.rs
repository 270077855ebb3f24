use std::fmt;

use num_bigint::{BigInt, Sign};

use crate::types::ValueKind;

// --- Values -----------------------------------------------------------------

/// A value synthesized from fuzz bytes, passed into or returned from a mocked method.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Absent reference (the default for reference kinds).
    Null,
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    /// Floats serialize as IEEE-754 bits so NaN payloads and infinities survive JSON.
    Float(#[serde(with = "f32_bits")] f32),
    Double(#[serde(with = "f64_bits")] f64),
    /// Text whose characters are exactly the decoded bytes (ISO-8859-1).
    String(String),
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Object(ObjectValue),
}

impl Value {
    /// The kind this value inhabits; `None` for `Null`, which inhabits every reference kind.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Value::Null => return None,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Byte(_) => ValueKind::Byte,
            Value::Char(_) => ValueKind::Char,
            Value::Short(_) => ValueKind::Short,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::BigInteger(_) => ValueKind::BigInteger,
            Value::BigDecimal(_) => ValueKind::BigDecimal,
            Value::Object(obj) => ValueKind::Object(obj.type_name.clone()),
        })
    }

    pub fn is_kind(&self, kind: &ValueKind) -> bool {
        self.kind().as_ref() == Some(kind)
    }

    /// The value a method of `kind` yields when nothing else was produced:
    /// zero/false for primitives, `Null` for reference kinds, nothing for void.
    pub fn default_for(kind: &ValueKind) -> Option<Value> {
        let value = match kind {
            ValueKind::Void => return None,
            ValueKind::Boolean => Value::Boolean(false),
            ValueKind::Byte => Value::Byte(0),
            ValueKind::Char => Value::Char(0),
            ValueKind::Short => Value::Short(0),
            ValueKind::Int => Value::Int(0),
            ValueKind::Long => Value::Long(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::String
            | ValueKind::Bytes
            | ValueKind::BigInteger
            | ValueKind::BigDecimal
            | ValueKind::Object(_) => Value::Null,
        };
        Some(value)
    }

    /// Builds a string with one character per byte, no transcoding.
    pub fn latin1(bytes: &[u8]) -> Value {
        Value::String(bytes.iter().map(|&b| b as char).collect())
    }

    /// Inverse of [`Value::latin1`]: the bytes behind a decoded string.
    /// `None` if this is not a string or contains characters above U+00FF.
    pub fn latin1_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::String(s) => s.chars().map(|c| u8::try_from(c as u32).ok()).collect(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "{:?}", v),
            Value::BigInteger(v) => write!(f, "{}", v),
            Value::BigDecimal(v) => write!(f, "{}", v),
            Value::Object(v) => write!(f, "{}", v),
        }
    }
}

mod f32_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(value.to_bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        u32::deserialize(deserializer).map(f32::from_bits)
    }
}

mod f64_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.to_bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        u64::deserialize(deserializer).map(f64::from_bits)
    }
}

/// Arbitrary-precision decimal: `unscaled * 10^-scale`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BigDecimal {
    pub unscaled: BigInt,
    pub scale: i32,
}

impl BigDecimal {
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        BigDecimal { unscaled, scale }
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            if self.scale == 0 {
                return write!(f, "{}", self.unscaled);
            }
            return write!(f, "{}E+{}", self.unscaled, -(self.scale as i64));
        }
        let digits = self.unscaled.magnitude().to_string();
        let sign = if self.unscaled.sign() == Sign::Minus { "-" } else { "" };
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

/// A composite value assembled field-by-field by a registered layout.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ObjectValue {
    pub type_name: String,
    pub fields: Vec<Value>,
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.type_name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, "}}")
    }
}

// --- Call outcomes ----------------------------------------------------------

/// The error raised by one intercepted call, recorded rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fault {
    pub kind: String,
    pub message: String,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Fault {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Captures any error, naming it after its type.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let full = std::any::type_name::<E>();
        let kind = full.rsplit("::").next().unwrap_or(full);
        Fault::new(kind, err.to_string())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Fault {}

/// What one call produced: a value (or nothing), or a fault.
pub type CallResult = Result<Option<Value>, Fault>;

/// Identity of one mock instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MockId(pub uuid::Uuid);

impl MockId {
    pub fn generate() -> Self {
        MockId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_floats_survive_json() {
        let values = vec![
            Value::Float(f32::from_bits(0x7fc0_0001)),
            Value::Float(f32::INFINITY),
            Value::Double(f64::NEG_INFINITY),
            Value::Double(f64::from_bits(0x7ff8_0000_0000_00ff)),
            Value::Double(-0.0),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        for (before, after) in values.iter().zip(&back) {
            match (before, after) {
                (Value::Float(a), Value::Float(b)) => assert_eq!(a.to_bits(), b.to_bits()),
                (Value::Double(a), Value::Double(b)) => assert_eq!(a.to_bits(), b.to_bits()),
                other => panic!("kind changed: {:?}", other),
            }
        }
    }

    #[test]
    fn test_latin1_round_trip_high_bytes() {
        let bytes = [0x41, 0x00, 0xff, 0x80];
        let value = Value::latin1(&bytes);
        assert_eq!(value.latin1_bytes(), Some(bytes.to_vec()));
    }

    #[test]
    fn test_default_for_kinds() {
        assert_eq!(Value::default_for(&ValueKind::Void), None);
        assert_eq!(Value::default_for(&ValueKind::Int), Some(Value::Int(0)));
        assert_eq!(Value::default_for(&ValueKind::String), Some(Value::Null));
    }

    #[test]
    fn test_big_decimal_display() {
        assert_eq!(BigDecimal::new(BigInt::from(12345), 2).to_string(), "123.45");
        assert_eq!(BigDecimal::new(BigInt::from(-5), 3).to_string(), "-0.005");
        assert_eq!(BigDecimal::new(BigInt::from(7), 0).to_string(), "7");
        assert_eq!(BigDecimal::new(BigInt::from(123), -2).to_string(), "123E+2");
    }

    #[test]
    fn test_fault_from_error_uses_type_name() {
        let err = std::fmt::Error;
        let fault = Fault::from_error(&err);
        assert_eq!(fault.kind, "Error");
    }
}
