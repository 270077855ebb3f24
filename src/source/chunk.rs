//! A bounded, single-use view over the next N bytes of a [`ByteSource`](super::ByteSource).

use super::ByteInput;
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    bytes: Vec<u8>,
    pos: usize,
}

impl Chunk {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Chunk { bytes, pos: 0 }
    }

    /// Size of the chunk when it was read.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Every byte of the chunk has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

impl ByteInput for Chunk {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::Exhausted {
                requested: len,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.bytes[start..self.pos])
    }
}
