//! The hz container format.
//!
//! ```text
//! [4 bytes: header_length, big-endian u32]
//! [header_length bytes: frequency table as compact JSON]
//! [remaining bytes: packed payload, see `pack`]
//! ```
//!
//! The header maps each symbol, written as a one-character string, to its
//! count, e.g. `{"a":2,"b":2,"c":2}`. Keys appear in ascending symbol
//! order, so equal tables always serialize to equal bytes. A symbol may
//! appear only once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::frequency::FrequencyTable;
use crate::{HzError, HzResult};

/// Size of the big-endian header length field.
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Serialize a frequency table into header bytes.
pub fn encode_header(freq: &FrequencyTable) -> HzResult<Vec<u8>> {
    let map: BTreeMap<String, u64> = freq
        .iter()
        .map(|(symbol, count)| (symbol.to_string(), count))
        .collect();
    serde_json::to_vec(&map)
        .map_err(|e| HzError::InvariantViolation(format!("header serialization failed: {e}")))
}

/// Header entries in the order they appear, repeated keys included.
struct HeaderEntries(Vec<(String, u64)>);

impl<'de> Deserialize<'de> for HeaderEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = HeaderEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map from symbols to counts")
            }

            fn visit_map<V>(self, mut map: V) -> Result<HeaderEntries, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, u64>()? {
                    entries.push(entry);
                }
                Ok(HeaderEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse header bytes back into a frequency table.
pub fn decode_header(bytes: &[u8]) -> HzResult<FrequencyTable> {
    let HeaderEntries(entries) = serde_json::from_slice(bytes)
        .map_err(|e| HzError::corrupt_header(format!("frequency table is not valid: {e}")))?;

    let mut seen = BTreeSet::new();
    let mut pairs = Vec::with_capacity(entries.len());
    for (key, count) in entries {
        let mut chars = key.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(HzError::corrupt_header(format!(
                    "key {key:?} is not a single symbol"
                )))
            }
        };
        if !seen.insert(symbol) {
            return Err(HzError::corrupt_header(format!(
                "symbol {symbol:?} appears more than once"
            )));
        }
        if count == 0 {
            return Err(HzError::corrupt_header(format!(
                "symbol {symbol:?} has a zero count"
            )));
        }
        pairs.push((symbol, count));
    }

    let freq = FrequencyTable::from_counts(pairs)
        .ok_or_else(|| HzError::corrupt_header("symbol counts overflow"))?;
    if freq.is_empty() {
        return Err(HzError::corrupt_header("frequency table is empty"));
    }
    Ok(freq)
}

/// A parsed container: the frequency table and the packed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub frequencies: FrequencyTable,
    pub payload: Vec<u8>,
}

impl Container {
    pub fn new(frequencies: FrequencyTable, payload: Vec<u8>) -> Self {
        Container {
            frequencies,
            payload,
        }
    }

    /// Write the length field, the header and the payload.
    pub fn to_bytes(&self) -> HzResult<Vec<u8>> {
        let header = encode_header(&self.frequencies)?;
        let header_len = u32::try_from(header.len())
            .map_err(|_| HzError::InvalidInput("frequency table header exceeds 4 GiB"))?;

        let mut out = Vec::with_capacity(LENGTH_FIELD_SIZE + header.len() + self.payload.len());
        out.extend_from_slice(&header_len.to_be_bytes());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.payload);
        log::debug!(
            "container: {} header bytes, {} payload bytes",
            header.len(),
            self.payload.len()
        );
        Ok(out)
    }

    /// Parse a container. The payload is everything after the header.
    pub fn parse(data: &[u8]) -> HzResult<Self> {
        let header_len = header_len(data)?;
        let start = LENGTH_FIELD_SIZE;
        let end = start + header_len;
        let frequencies = decode_header(&data[start..end])?;
        Ok(Container {
            frequencies,
            payload: data[end..].to_vec(),
        })
    }
}

/// Read and bounds-check the header length field.
pub fn header_len(data: &[u8]) -> HzResult<usize> {
    let Some(field) = data.get(..LENGTH_FIELD_SIZE) else {
        return Err(HzError::corrupt_header(format!(
            "container is {} bytes, too short for the length field",
            data.len()
        )));
    };
    let declared = u32::from_be_bytes([field[0], field[1], field[2], field[3]]) as usize;
    let available = data.len() - LENGTH_FIELD_SIZE;
    if declared > available {
        return Err(HzError::corrupt_header(format!(
            "header length {declared} exceeds the {available} bytes available"
        )));
    }
    Ok(declared)
}
