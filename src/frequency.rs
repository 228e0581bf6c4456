//! Frequency analysis for text.
//!
//! Counts the occurrence of each symbol (one `char`) in an input string
//! and computes Shannon entropy.

use std::collections::BTreeMap;

/// A frequency table that tracks symbol occurrence counts.
///
/// Symbols with a zero count are never stored. Iteration is in ascending
/// symbol order, which fixes both the header encoding and the order in
/// which leaves enter the tree builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<char, u64>,
    total: u64,
}

impl FrequencyTable {
    /// Create a new, empty frequency table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(symbol, count)` pairs.
    ///
    /// Zero counts are dropped and repeated symbols are summed. Returns
    /// `None` if the total overflows `u64`.
    pub fn from_counts<I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        let mut table = Self::new();
        for (symbol, count) in pairs {
            table.add(symbol, count)?;
        }
        Some(table)
    }

    /// Count symbol frequencies in `input`, adding to any existing counts.
    pub fn count(&mut self, input: &str) {
        let mut n = 0u64;
        for c in input.chars() {
            *self.counts.entry(c).or_insert(0) += 1;
            n += 1;
        }
        self.total += n;
    }

    /// Add the counts of `other` into this table.
    ///
    /// Tables computed over separate chunks of a text merge into the table
    /// of the whole text. Returns `None` and leaves `self` unchanged if a
    /// count would overflow `u64`.
    pub fn merge(&mut self, other: &FrequencyTable) -> Option<()> {
        let total = self.total.checked_add(other.total)?;
        let mut merged = Vec::with_capacity(other.counts.len());
        for (&symbol, &count) in &other.counts {
            merged.push((symbol, self.get(symbol).checked_add(count)?));
        }
        self.counts.extend(merged);
        self.total = total;
        Some(())
    }

    fn add(&mut self, symbol: char, count: u64) -> Option<()> {
        if count == 0 {
            return Some(());
        }
        let total = self.total.checked_add(count)?;
        let slot = self.counts.entry(symbol).or_insert(0);
        *slot = slot.checked_add(count)?;
        self.total = total;
        Some(())
    }

    /// Get the count for a specific symbol.
    pub fn get(&self, symbol: char) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct symbols.
    pub fn used(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(symbol, count)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }

    /// Length in bytes of the UTF-8 text this table was counted from.
    pub fn utf8_len(&self) -> u64 {
        self.iter()
            .map(|(symbol, count)| symbol.len_utf8() as u64 * count)
            .sum()
    }

    /// Compute the Shannon entropy of the distribution (in bits per symbol).
    ///
    /// Returns 0.0 if the table is empty.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.counts
            .values()
            .map(|&c| {
                let prob = c as f64 / total;
                -prob * prob.log2()
            })
            .sum()
    }
}

/// Convenience function: compute a frequency table from input.
pub fn get_frequency(input: &str) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    table.count(input);
    table
}
