//!
//! Value decoders: turn the upcoming bytes of a [`ByteSource`](crate::source::ByteSource)
//! into a value of a requested [`ValueKind`].
//!
//! A decoder is built once per method binding and reused for every call of that
//! method during a fuzz run. Rebinding it to a new source is explicit and resets
//! its cached value and live chunk. Decode failures are swallowed: the call gets
//! no value and the next call may succeed once more bytes exist.

use std::rc::Rc;

use serde_json::{Map, Value as Json};

use crate::error::{ConfigError, DecodeError};
use crate::primitives::Value;
use crate::source::{ByteInput, Chunk, SharedSource};
use crate::types::ValueKind;

pub mod chunk;
pub mod constraint;
pub mod layout;
pub mod range;

pub use constraint::Constraint;
pub use layout::{CompositeReader, ObjectLayouts};

#[derive(Debug, Clone)]
pub struct ValueDecoder {
    constraint: Constraint,
    source: Option<SharedSource>,
    /// Chunk currently being served, for chunked decoders only.
    chunk: Option<Chunk>,
    cached: Option<Value>,
    composite: Option<Rc<dyn CompositeReader>>,
}

impl ValueDecoder {
    /// Builds a decoder for a constraint, rejecting an inverted range.
    pub fn new(constraint: Constraint) -> Result<Self, ConfigError> {
        Ok(ValueDecoder {
            constraint: constraint.validate()?,
            source: None,
            chunk: None,
            cached: None,
            composite: None,
        })
    }

    pub fn default_decoder() -> Self {
        ValueDecoder {
            constraint: Constraint::Default,
            source: None,
            chunk: None,
            cached: None,
            composite: None,
        }
    }

    pub fn range(from: i64, to: i64) -> Result<Self, ConfigError> {
        Self::new(Constraint::range(from, to)?)
    }

    pub fn chunk(size: usize) -> Self {
        ValueDecoder {
            constraint: Constraint::chunk(size),
            ..Self::default_decoder()
        }
    }

    /// Factory over a decoder kind string and parameter map; see [`Constraint::resolve`].
    pub fn resolve(kind: Option<&str>, params: Option<&Map<String, Json>>) -> Result<Self, ConfigError> {
        Self::new(Constraint::resolve(kind, params)?)
    }

    pub fn from_json(descriptor: &Json) -> Result<Self, ConfigError> {
        Self::new(Constraint::from_json(descriptor)?)
    }

    /// Installs the construction routine used for composite kinds.
    pub fn with_composite(mut self, reader: Rc<dyn CompositeReader>) -> Self {
        self.composite = Some(reader);
        self
    }

    pub fn constraint(&self) -> Constraint {
        self.constraint
    }

    /// Binds the decoder to a source, discarding any cached value and live chunk.
    pub fn bind(&mut self, source: SharedSource) {
        self.source = Some(source);
        self.reset();
    }

    pub fn unbind(&mut self) {
        self.source = None;
        self.reset();
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    pub fn reset(&mut self) {
        self.chunk = None;
        self.cached = None;
    }

    /// True while a chunk read by an earlier decode still has bytes to serve.
    pub fn chunk_in_progress(&self) -> bool {
        self.chunk.is_some()
    }

    /// The last decoded value, if the last decode succeeded.
    pub fn cached(&self) -> Option<&Value> {
        self.cached.as_ref()
    }

    /// Decodes a fresh value of `kind`, never answering from the cache.
    pub fn decode(&mut self, kind: Option<&ValueKind>) -> Option<Value> {
        self.decode_with(kind, true)
    }

    /// Decodes `kind`, answering from the cache when no chunk is in progress and
    /// the cached value already has that kind.
    pub fn decode_cached(&mut self, kind: Option<&ValueKind>) -> Option<Value> {
        self.decode_with(kind, false)
    }

    /// Returns no value, consuming nothing, for a missing kind, an unbound decoder
    /// or the void kind.
    pub fn decode_with(&mut self, kind: Option<&ValueKind>, force_reload: bool) -> Option<Value> {
        let kind = kind?;
        let source = self.source.clone()?;
        if kind.is_void() {
            return None;
        }
        if !force_reload && self.chunk.is_none() {
            if let Some(cached) = self.cached.as_ref().filter(|value| value.is_kind(kind)) {
                return Some(cached.clone());
            }
        }

        match self.read(kind, &source) {
            Ok(value) => {
                tracing::trace!("decoded {} as {:?}", kind, value);
                self.cached = value;
            }
            Err(err) => {
                tracing::debug!("decode of {} failed, yielding no value: {}", kind, err);
                self.chunk = None;
                self.cached = None;
            }
        }
        if self.chunk.as_ref().is_some_and(Chunk::is_exhausted) {
            self.chunk = None;
        }
        self.cached.clone()
    }

    /// Like [`decode`](Self::decode), but reports why no value was produced.
    pub fn try_decode(&mut self, kind: &ValueKind) -> Result<Option<Value>, DecodeError> {
        let Some(source) = self.source.clone() else {
            return Ok(None);
        };
        if kind.is_void() {
            return Ok(None);
        }
        let result = self.read(kind, &source);
        match &result {
            Ok(value) => self.cached = value.clone(),
            Err(_) => {
                self.chunk = None;
                self.cached = None;
            }
        }
        if self.chunk.as_ref().is_some_and(Chunk::is_exhausted) {
            self.chunk = None;
        }
        result
    }

    fn read(&mut self, kind: &ValueKind, source: &SharedSource) -> Result<Option<Value>, DecodeError> {
        if self.chunk.is_none() {
            if let Constraint::Chunk { size } = self.constraint {
                let len = chunk::chunk_len(kind, size);
                self.chunk = Some(source.borrow_mut().read_chunk(len)?);
            }
        }
        let composite = self.composite.as_deref();
        match self.chunk.as_mut() {
            Some(live) => read_value(&self.constraint, composite, kind, live),
            None => read_value(&self.constraint, composite, kind, &mut *source.borrow_mut()),
        }
    }
}

/// Exhaustive dispatch of (strategy, kind) to a reading routine.
fn read_value(
    constraint: &Constraint,
    composite: Option<&dyn CompositeReader>,
    kind: &ValueKind,
    input: &mut dyn ByteInput,
) -> Result<Option<Value>, DecodeError> {
    match (constraint, kind) {
        (_, ValueKind::Void) => Ok(None),
        (Constraint::Range { from, to }, k) if k.integral_bounds().is_some() => {
            range::read_ranged(input, k, *from, *to).map(Some)
        }
        (_, k) if k.is_primitive() => input.read_primitive(k).map(Some),
        (Constraint::Chunk { size }, k) if chunk::is_chunk_composite(k) => {
            chunk::read_composite(input, k, *size).map(Some)
        }
        (_, k) => match composite {
            Some(reader) => reader.read(k, input),
            None => Err(DecodeError::Unsupported(k.clone())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ByteSource;

    fn bound(mut decoder: ValueDecoder, bytes: Vec<u8>) -> (ValueDecoder, SharedSource) {
        let source = ByteSource::new(bytes).shared();
        decoder.bind(source.clone());
        (decoder, source)
    }

    #[test]
    fn test_unbound_or_missing_kind_yields_nothing() {
        let mut decoder = ValueDecoder::default_decoder();
        assert_eq!(decoder.decode(Some(&ValueKind::Int)), None);
        let (mut decoder, source) = bound(decoder, vec![0; 4]);
        assert_eq!(decoder.decode(None), None);
        assert_eq!(source.borrow().position(), 0);
    }

    #[test]
    fn test_void_consumes_nothing() {
        let (mut decoder, source) = bound(ValueDecoder::chunk(2), vec![1, 2]);
        assert_eq!(decoder.decode(Some(&ValueKind::Void)), None);
        assert_eq!(source.borrow().position(), 0);
        assert!(!decoder.chunk_in_progress());
    }

    #[test]
    fn test_default_reads_natural_width() {
        let (mut decoder, source) = bound(ValueDecoder::default_decoder(), vec![0, 0, 0, 7, 0, 9]);
        assert_eq!(decoder.decode(Some(&ValueKind::Int)), Some(Value::Int(7)));
        assert_eq!(decoder.decode(Some(&ValueKind::Short)), Some(Value::Short(9)));
        assert_eq!(source.borrow().position(), 6);
    }

    #[test]
    fn test_cached_decode_reuses_value() {
        let (mut decoder, source) = bound(ValueDecoder::default_decoder(), vec![0, 1, 0, 2]);
        assert_eq!(decoder.decode_cached(Some(&ValueKind::Short)), Some(Value::Short(1)));
        assert_eq!(decoder.decode_cached(Some(&ValueKind::Short)), Some(Value::Short(1)));
        assert_eq!(source.borrow().position(), 2);
        assert_eq!(decoder.decode_with(Some(&ValueKind::Short), true), Some(Value::Short(2)));
    }

    #[test]
    fn test_chunk_serves_primitives_until_exhausted() {
        let (mut decoder, source) = bound(ValueDecoder::chunk(4), vec![0, 1, 0, 2, 0, 3, 0, 4]);
        assert_eq!(decoder.decode_cached(Some(&ValueKind::Short)), Some(Value::Short(1)));
        assert!(decoder.chunk_in_progress());
        assert_eq!(source.borrow().position(), 4);
        // A live chunk bypasses the cache.
        assert_eq!(decoder.decode_cached(Some(&ValueKind::Short)), Some(Value::Short(2)));
        assert!(!decoder.chunk_in_progress());
        assert_eq!(decoder.decode(Some(&ValueKind::Short)), Some(Value::Short(3)));
        assert_eq!(source.borrow().position(), 8);
    }

    #[test]
    fn test_short_chunk_leftover_is_discarded() {
        let (mut decoder, source) = bound(ValueDecoder::chunk(3), vec![0, 5, 9, 0, 6, 9]);
        assert_eq!(decoder.decode(Some(&ValueKind::Short)), Some(Value::Short(5)));
        assert!(decoder.chunk_in_progress());
        assert_eq!(decoder.decode(Some(&ValueKind::Short)), None);
        assert!(!decoder.chunk_in_progress());
        assert_eq!(decoder.cached(), None);
        assert_eq!(decoder.decode(Some(&ValueKind::Short)), Some(Value::Short(6)));
        assert_eq!(source.borrow().position(), 6);
    }

    #[test]
    fn test_chunked_string() {
        let (mut decoder, _) = bound(ValueDecoder::chunk(3), vec![0x41, 0x42, 0x43]);
        assert_eq!(decoder.decode(Some(&ValueKind::String)), Some(Value::String("ABC".into())));
    }

    #[test]
    fn test_exhausted_chunk_recovers_after_rebind() {
        let (mut decoder, _) = bound(ValueDecoder::chunk(3), vec![0x41, 0x42]);
        assert_eq!(decoder.decode(Some(&ValueKind::String)), None);
        decoder.bind(ByteSource::new(vec![0x58, 0x59, 0x5a]).shared());
        assert_eq!(decoder.decode(Some(&ValueKind::String)), Some(Value::String("XYZ".into())));
    }

    #[test]
    fn test_default_composite_without_reader_is_unsupported() {
        let (mut decoder, source) = bound(ValueDecoder::default_decoder(), vec![0; 8]);
        assert_eq!(
            decoder.try_decode(&ValueKind::String),
            Err(DecodeError::Unsupported(ValueKind::String))
        );
        assert_eq!(decoder.decode(Some(&ValueKind::String)), None);
        assert_eq!(source.borrow().position(), 0);
    }

    #[test]
    fn test_default_composite_uses_reader() {
        let layouts = ObjectLayouts::new().register("Pair", [ValueKind::Byte, ValueKind::Byte]);
        let decoder = ValueDecoder::default_decoder().with_composite(Rc::new(layouts));
        let (mut decoder, _) = bound(decoder, vec![3, 4]);
        let value = decoder.decode(Some(&ValueKind::Object("Pair".into())));
        assert_eq!(value.map(|v| v.to_string()), Some("Pair{3, 4}".to_string()));
    }

    #[test]
    fn test_range_ignores_non_integral_kinds() {
        let (mut decoder, _) = bound(ValueDecoder::range(0, 1).unwrap(), vec![0x3f, 0x80, 0, 0]);
        assert_eq!(decoder.decode(Some(&ValueKind::Float)), Some(Value::Float(1.0)));
    }

    #[test]
    fn test_inverted_range_fails_at_construction() {
        assert_eq!(
            ValueDecoder::new(Constraint::Range { from: 3, to: 1 }).err(),
            Some(ConfigError::InvalidRange { from: 3, to: 1 })
        );
    }
}
