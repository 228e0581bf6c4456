//! A growable, MSB-first bit buffer.
//!
//! Bit `i` lives in byte `i / 8` at position `7 - i % 8`, so converting a
//! byte-aligned stream to bytes is a plain copy and reading bytes back
//! yields the same bit order.

use crate::huffman::Code;
use crate::{HzError, HzResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    bytes: Vec<u8>,
    len: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stream with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        BitStream {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// View a byte buffer as a stream of `8 * bytes.len()` bits.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        BitStream {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Number of bits in the stream.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the length is a whole number of bytes.
    pub fn is_byte_aligned(&self) -> bool {
        self.len % 8 == 0
    }

    pub fn push_bit(&mut self, bit: bool) {
        let byte_idx = self.len / 8;
        let bit_offset = 7 - (self.len % 8);
        if byte_idx == self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte_idx] |= 1 << bit_offset;
        }
        self.len += 1;
    }

    /// Append the bits of a codeword, first bit first.
    pub fn push_code(&mut self, code: &Code) {
        for &bit in code.bits() {
            self.push_bit(bit);
        }
    }

    /// Append 8 bits, most significant first.
    pub fn push_byte(&mut self, value: u8) {
        if self.is_byte_aligned() {
            self.bytes.push(value);
            self.len += 8;
        } else {
            for bit_idx in (0..8).rev() {
                self.push_bit((value >> bit_idx) & 1 == 1);
            }
        }
    }

    /// Append every bit of `other`.
    pub fn extend(&mut self, other: &BitStream) {
        if self.is_byte_aligned() {
            self.bytes.extend_from_slice(&other.bytes);
            self.len += other.len;
        } else {
            for bit in other.iter() {
                self.push_bit(bit);
            }
        }
    }

    /// Append `count` zero bits.
    pub fn push_zeros(&mut self, count: usize) {
        for _ in 0..count {
            self.push_bit(false);
        }
    }

    /// Read the bit at `index`.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some((self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    /// Shorten the stream to `len` bits, clearing the dropped bits.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.bytes.truncate(len.div_ceil(8));
        let used = len % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFFu8 << (8 - used);
            }
        }
        self.len = len;
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| (self.bytes[i / 8] >> (7 - i % 8)) & 1 == 1)
    }

    /// Convert to bytes, eight bits per byte, most significant bit first.
    ///
    /// The stream must already be byte-aligned; anything else means a
    /// padding step was skipped and is reported as an internal defect.
    pub fn into_bytes(self) -> HzResult<Vec<u8>> {
        if !self.is_byte_aligned() {
            return Err(HzError::InvariantViolation(format!(
                "bit stream of {} bits is not byte-aligned",
                self.len
            )));
        }
        Ok(self.bytes)
    }
}
