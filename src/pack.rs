//! Bit packing and unpacking of Huffman-coded text.
//!
//! Packed layout, as a bit string cut into bytes MSB-first:
//!
//! ```text
//! [8 bits: padding count p] [encoded payload] [p zero bits]
//! ```
//!
//! `p` is the number of zero bits needed to byte-align the whole stream,
//! so `0 <= p <= 7`. The one exception is accepted on the unpacking side
//! only: `p = 8` followed by a single zero byte means an empty payload.

use crate::bitstream::BitStream;
use crate::huffman::{Code, CodeTable};
use crate::{HzError, HzResult};

/// Width of the padding-count field at the head of the packed stream.
pub const PADDING_FIELD_BITS: usize = 8;

/// Concatenate the code of each symbol of `input`, in order.
///
/// Fails with `MissingCode` if a symbol has no code in `table`.
pub fn encode_symbols(input: &str, table: &CodeTable) -> HzResult<BitStream> {
    let mut payload = BitStream::new();
    for symbol in input.chars() {
        let code = table.get(symbol).ok_or(HzError::MissingCode { symbol })?;
        payload.push_code(code);
    }
    Ok(payload)
}

/// Number of zero bits appended after a payload of `payload_bits` bits.
pub fn padding_for(payload_bits: u64) -> u8 {
    ((8 - payload_bits % 8) % 8) as u8
}

/// Total packed length in bytes for a payload of `payload_bits` bits,
/// or `None` if it does not fit in a `u64`.
pub fn packed_len(payload_bits: u64) -> Option<u64> {
    payload_bits
        .checked_add(PADDING_FIELD_BITS as u64 + padding_for(payload_bits) as u64)
        .map(|bits| bits / 8)
}

/// A payload framed with its padding count and padded to a byte boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBitStream {
    padding: u8,
    bits: BitStream,
}

impl PaddedBitStream {
    /// Frame `payload`: prepend the padding count, append the padding.
    pub fn pad(payload: &BitStream) -> Self {
        let padding = padding_for(payload.len() as u64);
        let mut bits = BitStream::with_capacity(PADDING_FIELD_BITS + payload.len() + 7);
        bits.push_byte(padding);
        bits.extend(payload);
        bits.push_zeros(padding as usize);
        PaddedBitStream { padding, bits }
    }

    /// Number of zero bits appended after the payload.
    pub fn padding(&self) -> u8 {
        self.padding
    }

    /// Length of the framed stream in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Convert the framed stream to bytes.
    pub fn into_bytes(self) -> HzResult<Vec<u8>> {
        self.bits.into_bytes()
    }
}

/// Encode `input` with `table` and pack it into bytes.
pub fn pack(input: &str, table: &CodeTable) -> HzResult<Vec<u8>> {
    let payload = encode_symbols(input, table)?;
    let padded = PaddedBitStream::pad(&payload);
    log::debug!(
        "pack: {} payload bits, {} padding bits, {} bytes",
        payload.len(),
        padded.padding(),
        padded.len() / 8
    );
    padded.into_bytes()
}

/// Recover the exact encoded payload from packed bytes.
///
/// Reads the padding count from the first byte and drops that many bits
/// from the end. Fails if the count is out of range or the dropped bits
/// are not all zero.
pub fn unpad(bytes: &[u8]) -> HzResult<BitStream> {
    let Some(&padding) = bytes.first() else {
        return Err(HzError::TruncatedPayload {
            expected: 1,
            actual: 0,
        });
    };
    let padding = padding as usize;
    let available = (bytes.len() - 1) * 8;

    let empty_payload = padding == 8 && available == 8;
    if padding > 7 && !empty_payload {
        return Err(HzError::decode(
            0,
            format!("padding count {padding} is out of range"),
        ));
    }
    if padding > available {
        return Err(HzError::decode(
            0,
            format!("padding count {padding} exceeds the {available} payload bits"),
        ));
    }

    let mut payload = BitStream::from_bytes(&bytes[1..]);
    let payload_len = available - padding;
    if let Some(offset) = (payload_len..available).find(|&i| payload.get(i) == Some(true)) {
        return Err(HzError::decode(
            PADDING_FIELD_BITS + offset,
            "padding bits are not zero",
        ));
    }
    payload.truncate(payload_len);
    Ok(payload)
}

/// Decode a payload bit by bit with the inverse code table.
///
/// Bits accumulate into a candidate code; each time the candidate names a
/// symbol, that symbol is emitted and the candidate is reset. Because the
/// codes are prefix-free no backtracking is needed. Fails when the
/// candidate outgrows the longest code or bits run out mid-code.
pub fn decode_symbols(payload: &BitStream, table: &CodeTable) -> HzResult<String> {
    let max_len = table.max_code_len();
    let mut output = String::new();
    let mut current = Code::new();
    let mut code_start = 0;

    for (pos, bit) in payload.iter().enumerate() {
        current.push(bit);
        if let Some(symbol) = table.symbol_for(&current) {
            output.push(symbol);
            current.clear();
            code_start = pos + 1;
        } else if current.len() >= max_len {
            return Err(HzError::decode(
                PADDING_FIELD_BITS + code_start,
                format!("bits {current} match no code"),
            ));
        }
    }

    if !current.is_empty() {
        return Err(HzError::decode(
            PADDING_FIELD_BITS + code_start,
            format!("payload ends inside a code ({current})"),
        ));
    }
    Ok(output)
}

/// Unpack bytes produced by [`pack`] back into text.
pub fn unpack(bytes: &[u8], table: &CodeTable) -> HzResult<String> {
    let payload = unpad(bytes)?;
    decode_symbols(&payload, table)
}
