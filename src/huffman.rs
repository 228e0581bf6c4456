//! Huffman coding: tree construction and code table derivation.
//!
//! The tree is stored as a flat arena of nodes addressed by index. Leaves
//! enter the priority queue in ascending symbol order, and equal weights
//! pop in insertion order (see [`crate::pqueue`]), so a frequency table
//! always produces the same tree. The first node popped in each merge
//! becomes the left child (bit `0`), the second the right child (bit `1`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::frequency::{get_frequency, FrequencyTable};
use crate::pqueue::MinHeap;
use crate::{HzError, HzResult};

/// A node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        symbol: char,
        weight: u64,
    },
    /// Children are indices into the tree's node arena.
    Internal {
        weight: u64,
        left: usize,
        right: usize,
    },
}

impl HuffmanNode {
    /// Frequency weight of this node (or subtree).
    pub fn weight(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }
}

/// A Huffman tree built from a frequency table.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Leaves first (in symbol order), then internal nodes in merge order.
    nodes: Vec<HuffmanNode>,
    /// Index of the root node in `nodes`.
    root: usize,
}

impl HuffmanTree {
    /// Build a Huffman tree from input text.
    pub fn from_text(input: &str) -> HzResult<Self> {
        Self::from_frequency_table(&get_frequency(input))
    }

    /// Build a Huffman tree from a frequency table.
    ///
    /// Fails with `InvalidInput` when the table is empty. A table with one
    /// distinct symbol yields a tree whose root is that symbol's leaf.
    pub fn from_frequency_table(freq: &FrequencyTable) -> HzResult<Self> {
        if freq.is_empty() {
            return Err(HzError::InvalidInput("frequency table is empty"));
        }

        let leaf_count = freq.used();
        let mut nodes: Vec<HuffmanNode> = Vec::with_capacity(2 * leaf_count - 1);
        let mut heap: MinHeap<usize> = MinHeap::with_capacity(leaf_count);
        for (symbol, weight) in freq.iter() {
            heap.push(weight, nodes.len());
            nodes.push(HuffmanNode::Leaf { symbol, weight });
        }

        while heap.len() > 1 {
            let (left_weight, left) = pop_node(&mut heap)?;
            let (right_weight, right) = pop_node(&mut heap)?;

            let weight = left_weight + right_weight;
            heap.push(weight, nodes.len());
            nodes.push(HuffmanNode::Internal {
                weight,
                left,
                right,
            });
        }

        let (_, root) = pop_node(&mut heap)?;
        log::debug!(
            "huffman: built tree with {} leaves, {} nodes, weight {}",
            leaf_count,
            nodes.len(),
            nodes[root].weight()
        );

        Ok(HuffmanTree { nodes, root })
    }

    /// The root node.
    pub fn root(&self) -> &HuffmanNode {
        &self.nodes[self.root]
    }

    /// Look up a node by arena index.
    pub fn node(&self, index: usize) -> Option<&HuffmanNode> {
        self.nodes.get(index)
    }

    /// Number of distinct symbols in the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Total node count (leaves and internal nodes).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Derive the code table for this tree.
    pub fn code_table(&self) -> CodeTable {
        CodeTable::from_tree(self)
    }
}

fn pop_node(heap: &mut MinHeap<usize>) -> HzResult<(u64, usize)> {
    heap.pop_entry()
        .ok_or_else(|| HzError::InvariantViolation("priority queue ran dry".into()))
}

/// A Huffman codeword: a non-empty sequence of bits, first bit first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code {
    bits: Vec<bool>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// This code extended by one bit.
    fn child(&self, bit: bool) -> Code {
        let mut bits = Vec::with_capacity(self.bits.len() + 1);
        bits.extend_from_slice(&self.bits);
        bits.push(bit);
        Code { bits }
    }

    /// True if `self` is a proper or equal prefix of `other`.
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.bits.starts_with(&self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = HzError;

    /// Parse a string of `0`/`1` digits.
    fn from_str(s: &str) -> HzResult<Self> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(HzError::InvalidInput("code digits must be 0 or 1")),
            })
            .collect::<HzResult<Vec<bool>>>()?;
        Ok(Code { bits })
    }
}

/// Bijective mapping between symbols and their codes.
///
/// Built once per compress or decompress call and immutable afterwards.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: BTreeMap<char, Code>,
    inverse: HashMap<Code, char>,
    max_len: usize,
}

impl CodeTable {
    /// Derive codes from a tree: `0` for each left edge, `1` for each right
    /// edge from the root down to a leaf.
    ///
    /// Traversal uses an explicit worklist, depth-first and left before
    /// right, so skewed trees cannot exhaust the call stack. A lone leaf at
    /// the root has no path and is given the code `0`.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = BTreeMap::new();
        let mut stack: Vec<(usize, Code)> = vec![(tree.root, Code::new())];

        while let Some((idx, code)) = stack.pop() {
            match &tree.nodes[idx] {
                HuffmanNode::Leaf { symbol, .. } => {
                    let code = if code.is_empty() {
                        code.child(false)
                    } else {
                        code
                    };
                    codes.insert(*symbol, code);
                }
                HuffmanNode::Internal { left, right, .. } => {
                    // Right is pushed first so the left subtree is visited first.
                    stack.push((*right, code.child(true)));
                    stack.push((*left, code.child(false)));
                }
            }
        }

        let max_len = codes.values().map(Code::len).max().unwrap_or(0);
        let inverse = codes.iter().map(|(&s, c)| (c.clone(), s)).collect();
        log::debug!(
            "huffman: derived {} codes, longest {} bits",
            codes.len(),
            max_len
        );

        CodeTable {
            codes,
            inverse,
            max_len,
        }
    }

    /// Build the code table for a frequency table in one step.
    pub fn from_frequency_table(freq: &FrequencyTable) -> HzResult<Self> {
        Ok(HuffmanTree::from_frequency_table(freq)?.code_table())
    }

    /// Get the code for a symbol.
    pub fn get(&self, symbol: char) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    /// Get the symbol a complete code stands for.
    pub fn symbol_for(&self, code: &Code) -> Option<char> {
        self.inverse.get(code).copied()
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Length of the longest code, in bits.
    pub fn max_code_len(&self) -> usize {
        self.max_len
    }

    /// Iterate over `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &Code)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c))
    }

    /// Number of payload bits needed to encode a text with these counts.
    pub fn encoded_bits(&self, freq: &FrequencyTable) -> HzResult<u64> {
        let mut total: u64 = 0;
        for (symbol, count) in freq.iter() {
            let code = self.get(symbol).ok_or(HzError::MissingCode { symbol })?;
            total = (code.len() as u64)
                .checked_mul(count)
                .and_then(|bits| total.checked_add(bits))
                .ok_or(HzError::InvalidInput("encoded payload is too large"))?;
        }
        Ok(total)
    }
}
