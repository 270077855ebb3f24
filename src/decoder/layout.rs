//! Extension point for kinds outside the fixed primitive set.

use std::collections::HashMap;
use std::fmt;

use crate::error::DecodeError;
use crate::primitives::{ObjectValue, Value};
use crate::source::ByteInput;
use crate::types::ValueKind;

/// Type-specific construction routine used when a decoder meets a composite kind
/// it has no built-in assembly for.
pub trait CompositeReader: fmt::Debug {
    fn read(&self, kind: &ValueKind, input: &mut dyn ByteInput) -> Result<Option<Value>, DecodeError>;
}

/// Builds [`ValueKind::Object`] values field-by-field from registered layouts.
///
/// Fields may be primitives or other registered objects; nesting is bounded so a
/// self-referencing layout fails instead of recursing forever.
#[derive(Debug, Clone)]
pub struct ObjectLayouts {
    layouts: HashMap<String, Vec<ValueKind>>,
    max_depth: usize,
}

impl Default for ObjectLayouts {
    fn default() -> Self {
        ObjectLayouts {
            layouts: HashMap::new(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl ObjectLayouts {
    pub const DEFAULT_MAX_DEPTH: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, type_name: impl Into<String>, fields: impl IntoIterator<Item = ValueKind>) -> Self {
        self.layouts.insert(type_name.into(), fields.into_iter().collect());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn read_object(&self, type_name: &str, input: &mut dyn ByteInput, depth: usize) -> Result<Value, DecodeError> {
        if depth >= self.max_depth {
            return Err(DecodeError::DepthExceeded(self.max_depth));
        }
        let layout = self
            .layouts
            .get(type_name)
            .ok_or_else(|| DecodeError::Unsupported(ValueKind::Object(type_name.to_string())))?;
        let mut fields = Vec::with_capacity(layout.len());
        for field in layout {
            let value = match field {
                ValueKind::Object(nested) => self.read_object(nested, input, depth + 1)?,
                primitive => input.read_primitive(primitive)?,
            };
            fields.push(value);
        }
        Ok(Value::Object(ObjectValue {
            type_name: type_name.to_string(),
            fields,
        }))
    }
}

impl CompositeReader for ObjectLayouts {
    fn read(&self, kind: &ValueKind, input: &mut dyn ByteInput) -> Result<Option<Value>, DecodeError> {
        match kind {
            ValueKind::Object(name) => self.read_object(name, input, 0).map(Some),
            other => Err(DecodeError::Unsupported(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ByteSource;

    #[test]
    fn test_nested_layout() {
        let layouts = ObjectLayouts::new()
            .register("Point", [ValueKind::Short, ValueKind::Short])
            .register("Segment", [ValueKind::Object("Point".into()), ValueKind::Boolean]);
        let mut source = ByteSource::new(vec![0, 1, 0, 2, 1]);
        let value = layouts.read(&ValueKind::Object("Segment".into()), &mut source).unwrap();
        assert_eq!(value.map(|v| v.to_string()), Some("Segment{Point{1, 2}, true}".to_string()));
    }

    #[test]
    fn test_recursive_layout_hits_depth_limit() {
        let layouts = ObjectLayouts::new()
            .register("Node", [ValueKind::Byte, ValueKind::Object("Node".into())])
            .with_max_depth(3);
        let mut source = ByteSource::new(vec![0; 16]);
        assert_eq!(
            layouts.read(&ValueKind::Object("Node".into()), &mut source),
            Err(DecodeError::DepthExceeded(3))
        );
    }

    #[test]
    fn test_unregistered_type_is_unsupported() {
        let mut source = ByteSource::new(vec![0; 4]);
        assert!(matches!(
            ObjectLayouts::new().read(&ValueKind::Object("Ghost".into()), &mut source),
            Err(DecodeError::Unsupported(_))
        ));
    }
}
