//!
//! Byte sources: the fuzzer's buffer for one iteration, and bounded chunks over it.
//!
//! Every read is all-or-nothing. A read that asks for more bytes than remain fails
//! immediately with [`DecodeError::Exhausted`] and consumes nothing, so a decoder
//! can retry once more bytes arrive. Multi-byte values are big-endian.

use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;

use crate::error::DecodeError;
use crate::primitives::Value;
use crate::types::ValueKind;

pub mod chunk;

pub use chunk::Chunk;

/// A byte source shared by every decoder bound during one fuzz iteration.
pub type SharedSource = Rc<RefCell<ByteSource>>;

/// Sequential, non-blocking byte input.
pub trait ByteInput {
    /// Bytes left to read.
    fn remaining(&self) -> usize;

    /// Consumes exactly `len` bytes, or fails without consuming any.
    fn take(&mut self, len: usize) -> Result<&[u8], DecodeError>;

    /// Reads a primitive kind at its natural width.
    fn read_primitive(&mut self, kind: &ValueKind) -> Result<Value, DecodeError> {
        let value = match kind {
            ValueKind::Boolean => Value::Boolean(self.take(1)?[0] != 0),
            ValueKind::Byte => Value::Byte(i8::from_be_bytes(fixed(self.take(1)?)?)),
            ValueKind::Char => Value::Char(u16::from_be_bytes(fixed(self.take(2)?)?)),
            ValueKind::Short => Value::Short(i16::from_be_bytes(fixed(self.take(2)?)?)),
            ValueKind::Int => Value::Int(i32::from_be_bytes(fixed(self.take(4)?)?)),
            ValueKind::Long => Value::Long(i64::from_be_bytes(fixed(self.take(8)?)?)),
            ValueKind::Float => Value::Float(f32::from_be_bytes(fixed(self.take(4)?)?)),
            ValueKind::Double => Value::Double(f64::from_be_bytes(fixed(self.take(8)?)?)),
            other => return Err(DecodeError::Unsupported(other.clone())),
        };
        Ok(value)
    }

    /// Reads the natural width of an integral kind as an unsigned integer.
    fn read_unsigned(&mut self, kind: &ValueKind) -> Result<u64, DecodeError> {
        let raw = match kind {
            ValueKind::Byte => u8::from_be_bytes(fixed(self.take(1)?)?) as u64,
            ValueKind::Char | ValueKind::Short => u16::from_be_bytes(fixed(self.take(2)?)?) as u64,
            ValueKind::Int => u32::from_be_bytes(fixed(self.take(4)?)?) as u64,
            ValueKind::Long => u64::from_be_bytes(fixed(self.take(8)?)?),
            other => return Err(DecodeError::Unsupported(other.clone())),
        };
        Ok(raw)
    }

    fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(fixed(self.take(4)?)?))
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    bytes.try_into().map_err(|_| DecodeError::Exhausted {
        requested: N,
        remaining: bytes.len(),
    })
}

/// The fuzzer-supplied bytes for one iteration, read front to back.
#[derive(Debug, Clone, Default)]
pub struct ByteSource {
    data: Vec<u8>,
    cursor: usize,
    /// Bytes dropped from the front of `data` by `extend`.
    discarded: usize,
    exhausted: bool,
}

impl ByteSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        ByteSource {
            data: data.into(),
            cursor: 0,
            discarded: 0,
            exhausted: false,
        }
    }

    /// Drains a reader into a new source.
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::new(data))
    }

    /// Wraps this source for sharing among the decoders of one iteration.
    pub fn shared(self) -> SharedSource {
        Rc::new(RefCell::new(self))
    }

    /// Appends bytes delivered after construction; clears the end-of-data signal.
    pub fn extend(&mut self, bytes: &[u8]) {
        // Drop the consumed prefix so long-running feeds stay bounded.
        if self.cursor > 0 {
            self.data.drain(..self.cursor);
            self.discarded += self.cursor;
            self.cursor = 0;
        }
        self.data.extend_from_slice(bytes);
        self.exhausted = false;
    }

    /// True once a read has failed for lack of bytes, or when nothing is left.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted || self.remaining() == 0
    }

    /// Total bytes consumed so far, including any dropped by [`extend`](Self::extend).
    pub fn position(&self) -> usize {
        self.discarded + self.cursor
    }

    /// Reads the next `size` bytes as a chunk. No partial chunk is ever produced.
    pub fn read_chunk(&mut self, size: usize) -> Result<Chunk, DecodeError> {
        let bytes = self.take(size)?.to_vec();
        Ok(Chunk::new(bytes))
    }
}

impl ByteInput for ByteSource {
    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn take(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            self.exhausted = true;
            return Err(DecodeError::Exhausted {
                requested: len,
                remaining,
            });
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.data[start..self.cursor])
    }
}
