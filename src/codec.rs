//! Compress and decompress entry points.
//!
//! Each call builds and drops its own frequency table, tree and code
//! table. Nothing is shared between calls.

use crate::container::{self, Container};
use crate::frequency::{get_frequency, FrequencyTable};
use crate::huffman::CodeTable;
use crate::pack;
use crate::{HzError, HzResult};

/// Options controlling compression.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Strip trailing whitespace from the text before compressing.
    ///
    /// This is lossy: the decompressed text will lack the stripped
    /// characters.
    pub trim_trailing_whitespace: bool,
}

/// Statistics for one compression call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStats {
    /// UTF-8 length of the text that was compressed.
    pub original_bytes: usize,
    /// Length of the whole container.
    pub compressed_bytes: usize,
    pub header_bytes: usize,
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub payload_bits: u64,
    pub padding_bits: u8,
    /// Shannon entropy of the text, in bits per symbol.
    pub entropy: f64,
}

impl CompressionStats {
    /// Compressed size as a percentage of the original size.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64 * 100.0
    }

    /// How much smaller the output is, in percent (negative if larger).
    pub fn savings(&self) -> f64 {
        100.0 - self.ratio()
    }

    /// Average payload bits per symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.symbols == 0 {
            return 0.0;
        }
        self.payload_bits as f64 / self.symbols as f64
    }
}

/// Container bytes plus the statistics gathered while producing them.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub data: Vec<u8>,
    pub stats: CompressionStats,
}

/// Compress `input` into a self-describing container.
///
/// Fails with `InvalidInput` if `input` is empty.
pub fn compress(input: &str) -> HzResult<Vec<u8>> {
    compress_with_options(input, &CompressOptions::default()).map(|c| c.data)
}

/// Compress `input` with the given options.
pub fn compress_with_options(input: &str, options: &CompressOptions) -> HzResult<Compressed> {
    let text = if options.trim_trailing_whitespace {
        input.trim_end()
    } else {
        input
    };
    if text.is_empty() {
        return Err(HzError::InvalidInput("nothing to compress"));
    }

    let freq = get_frequency(text);
    log::debug!(
        "analysis: {} symbols, {} distinct",
        freq.total(),
        freq.used()
    );

    let table = CodeTable::from_frequency_table(&freq)?;
    let payload_bits = table.encoded_bits(&freq)?;
    let payload = pack::pack(text, &table)?;

    let expected = pack::packed_len(payload_bits)
        .ok_or(HzError::InvalidInput("encoded payload is too large"))?;
    if payload.len() as u64 != expected {
        return Err(HzError::InvariantViolation(format!(
            "packed {} bytes, expected {expected}",
            payload.len()
        )));
    }

    let container = Container::new(freq, payload);
    let data = container.to_bytes()?;
    let header_bytes = data.len() - container::LENGTH_FIELD_SIZE - container.payload.len();

    let stats = CompressionStats {
        original_bytes: text.len(),
        compressed_bytes: data.len(),
        header_bytes,
        symbols: container.frequencies.total(),
        distinct_symbols: container.frequencies.used(),
        payload_bits,
        padding_bits: pack::padding_for(payload_bits),
        entropy: container.frequencies.entropy(),
    };
    log::info!(
        "compressed {} -> {} bytes ({:.2}% smaller)",
        stats.original_bytes,
        stats.compressed_bytes,
        stats.savings()
    );

    Ok(Compressed { data, stats })
}

/// Check the payload length against the header and return the number
/// of payload bits the header implies.
///
/// Counts whose payload size overflows can only come from a damaged
/// header, so they are reported as `CorruptHeader`.
fn check_payload(freq: &FrequencyTable, table: &CodeTable, payload: &[u8]) -> HzResult<u64> {
    let payload_bits = table.encoded_bits(freq).map_err(|e| match e {
        HzError::InvalidInput(_) => HzError::corrupt_header("encoded payload size overflows"),
        other => other,
    })?;
    let expected = pack::packed_len(payload_bits)
        .ok_or_else(|| HzError::corrupt_header("packed payload size overflows"))?;
    let expected = usize::try_from(expected)
        .map_err(|_| HzError::corrupt_header("symbol counts exceed addressable memory"))?;

    if payload.len() < expected {
        return Err(HzError::TruncatedPayload {
            expected,
            actual: payload.len(),
        });
    }
    if payload.len() > expected {
        return Err(HzError::decode(
            expected * 8,
            format!("{} trailing bytes after payload", payload.len() - expected),
        ));
    }
    Ok(payload_bits)
}

/// Decompress a container produced by [`compress`].
pub fn decompress(data: &[u8]) -> HzResult<String> {
    let container = Container::parse(data)?;
    let freq = &container.frequencies;
    let table = CodeTable::from_frequency_table(freq)?;
    let payload_bits = check_payload(freq, &table, &container.payload)?;

    let payload = pack::unpad(&container.payload)?;
    if payload.len() as u64 != payload_bits {
        return Err(HzError::decode(
            0,
            format!(
                "padding leaves {} payload bits, header implies {payload_bits}",
                payload.len()
            ),
        ));
    }

    let text = pack::decode_symbols(&payload, &table)?;
    if get_frequency(&text) != *freq {
        return Err(HzError::decode(
            pack::PADDING_FIELD_BITS,
            "decoded symbols do not match the header frequencies",
        ));
    }

    log::info!(
        "decompressed {} -> {} bytes",
        data.len(),
        text.len()
    );
    Ok(text)
}

/// Summary of a container, read without decoding the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInfo {
    pub header_bytes: usize,
    pub payload_bytes: usize,
    pub compressed_bytes: usize,
    /// UTF-8 length of the text the container decodes to.
    pub original_bytes: u64,
    pub symbols: u64,
    pub distinct_symbols: usize,
    pub payload_bits: u64,
    pub padding_bits: u8,
    pub max_code_len: usize,
    pub entropy: f64,
}

impl ContainerInfo {
    /// Compressed size as a percentage of the original size.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64 * 100.0
    }
}

/// Parse a container's header and check its payload length and padding
/// field, without decoding.
pub fn inspect(data: &[u8]) -> HzResult<ContainerInfo> {
    let header_bytes = container::header_len(data)?;
    let container = Container::parse(data)?;
    let freq = &container.frequencies;
    let table = CodeTable::from_frequency_table(freq)?;
    let payload_bits = check_payload(freq, &table, &container.payload)?;

    let padding_bits = container.payload.first().copied().unwrap_or(0);
    if padding_bits != pack::padding_for(payload_bits) {
        return Err(HzError::decode(
            0,
            format!(
                "padding count {padding_bits} does not fit {payload_bits} payload bits"
            ),
        ));
    }

    Ok(ContainerInfo {
        header_bytes,
        payload_bytes: container.payload.len(),
        compressed_bytes: data.len(),
        original_bytes: freq.utf8_len(),
        symbols: freq.total(),
        distinct_symbols: freq.used(),
        payload_bits,
        padding_bits,
        max_code_len: table.max_code_len(),
        entropy: freq.entropy(),
    })
}
