// src/encode/huffman.rs

//! Static Huffman coding of byte streams.
//!
//! Trees are kept in an arena (`Vec<Node>`) and linked by index. The merge
//! queue orders nodes by `(weight, node id)`. Leaves are created in ascending
//! symbol order and internal nodes after them, so equal weights always pop
//! in the same order and identical input yields identical codes.

use crate::utils::error::{CodecError, Result};
use bitvec::prelude::*;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Owned bit string, most significant bit first within each byte.
pub type BitString = BitVec<u8, Msb0>;
/// Borrowed view of a [`BitString`].
pub type Bits = BitSlice<u8, Msb0>;

type NodeId = usize;

#[derive(Debug, Clone)]
struct Node {
    weight: u64,
    symbol: Option<u8>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// A Huffman tree built by greedy merging of the two lightest nodes.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl HuffmanTree {
    /// Builds the tree for a 256-entry frequency table. Zero entries are skipped.
    pub fn from_frequencies(frequencies: &[u64; 256]) -> Self {
        let mut nodes = Vec::new();
        let mut queue = BinaryHeap::new();

        for (symbol, &weight) in frequencies.iter().enumerate() {
            if weight > 0 {
                queue.push(Reverse((weight, nodes.len())));
                nodes.push(Node {
                    weight,
                    symbol: Some(symbol as u8),
                    left: None,
                    right: None,
                });
            }
        }

        let root = loop {
            let Some(Reverse((left_weight, left))) = queue.pop() else {
                break None;
            };
            let Some(Reverse((right_weight, right))) = queue.pop() else {
                break Some(left);
            };
            let weight = left_weight + right_weight;
            queue.push(Reverse((weight, nodes.len())));
            nodes.push(Node {
                weight,
                symbol: None,
                left: Some(left),
                right: Some(right),
            });
        };

        Self { nodes, root }
    }

    /// Builds the tree for the symbol counts of `data`.
    pub fn from_data(data: &[u8]) -> Self {
        let mut frequencies = [0u64; 256];
        for &byte in data {
            frequencies[byte as usize] += 1;
        }
        Self::from_frequencies(&frequencies)
    }

    /// Number of distinct symbols in the tree.
    pub fn symbol_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.symbol.is_some()).count()
    }

    /// Total weight at the root.
    pub fn total_weight(&self) -> u64 {
        self.root.map_or(0, |id| self.nodes[id].weight)
    }

    /// Assigns codes by walking the tree: `0` for left, `1` for right.
    ///
    /// A tree with a single leaf gets the one-bit code `0`.
    pub fn code_table(&self) -> CodeTable {
        let mut codes = BTreeMap::new();
        let Some(root) = self.root else {
            return CodeTable { codes };
        };

        if let Some(symbol) = self.nodes[root].symbol {
            codes.insert(symbol, bitvec![u8, Msb0; 0]);
            return CodeTable { codes };
        }

        let mut stack: Vec<(NodeId, BitString)> = vec![(root, BitString::new())];
        while let Some((id, prefix)) = stack.pop() {
            let node = &self.nodes[id];
            if let Some(symbol) = node.symbol {
                codes.insert(symbol, prefix);
                continue;
            }
            if let Some(right) = node.right {
                let mut code = prefix.clone();
                code.push(true);
                stack.push((right, code));
            }
            if let Some(left) = node.left {
                let mut code = prefix;
                code.push(false);
                stack.push((left, code));
            }
        }

        CodeTable { codes }
    }
}

/// Symbol to code mapping. Iterates in ascending symbol order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitString>,
}

impl CodeTable {
    /// Rebuilds a table from stored entries, rejecting empty codes,
    /// repeated symbols and tables that are not prefix-free.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, BitString)>,
    {
        let mut codes = BTreeMap::new();
        for (symbol, code) in entries {
            if code.is_empty() {
                return Err(CodecError::Decode(format!("empty code for symbol {}", symbol)));
            }
            if codes.insert(symbol, code).is_some() {
                return Err(CodecError::Decode(format!("symbol {} listed twice", symbol)));
            }
        }
        let table = Self { codes };
        DecodeTrie::build(&table)?;
        Ok(table)
    }

    pub fn get(&self, symbol: u8) -> Option<&Bits> {
        self.codes.get(&symbol).map(|code| code.as_bitslice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Bits)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_bitslice()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Longest code in the table.
    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|c| c.len()).max().unwrap_or(0)
    }

    /// Storage cost: every entry costs its code length plus an 8-bit symbol tag.
    pub fn serialized_bits(&self) -> u64 {
        self.codes.values().map(|c| c.len() as u64 + 8).sum()
    }

    pub fn is_prefix_free(&self) -> bool {
        DecodeTrie::build(self).is_ok()
    }

    /// Concatenates the codes of `data` in order.
    pub fn encode(&self, data: &[u8]) -> Result<BitString> {
        let mut lookup: [Option<&Bits>; 256] = [None; 256];
        for (symbol, code) in self.iter() {
            lookup[symbol as usize] = Some(code);
        }

        let mut bits = BitString::new();
        for &symbol in data {
            let code = lookup[symbol as usize].ok_or_else(|| {
                CodecError::Decode(format!("no code for symbol {}", symbol))
            })?;
            bits.extend_from_bitslice(code);
        }
        Ok(bits)
    }
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<u8>,
}

/// Binary trie over the codes of a table; node 0 is the root.
struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

impl DecodeTrie {
    fn build(table: &CodeTable) -> Result<Self> {
        let mut nodes = vec![TrieNode::default()];

        for (symbol, code) in table.iter() {
            if code.is_empty() {
                return Err(CodecError::Decode(format!("empty code for symbol {}", symbol)));
            }
            let mut at = 0;
            for bit in code.iter().by_vals() {
                if nodes[at].symbol.is_some() {
                    return Err(CodecError::Decode(format!(
                        "code for symbol {} extends another code",
                        symbol
                    )));
                }
                let branch = bit as usize;
                let existing = nodes[at].children[branch];
                at = match existing {
                    Some(next) => next,
                    None => {
                        nodes.push(TrieNode::default());
                        let next = nodes.len() - 1;
                        nodes[at].children[branch] = Some(next);
                        next
                    }
                };
            }
            let leaf = &mut nodes[at];
            if leaf.symbol.is_some() || leaf.children.iter().any(Option::is_some) {
                return Err(CodecError::Decode(format!(
                    "code for symbol {} is a prefix of another code",
                    symbol
                )));
            }
            leaf.symbol = Some(symbol);
        }

        Ok(Self { nodes })
    }
}

/// Builds a code from the symbol frequencies of `data` and encodes it.
pub fn build_and_encode(data: &[u8]) -> (BitString, CodeTable) {
    let table = HuffmanTree::from_data(data).code_table();
    let mut bits = BitString::with_capacity(data.len());
    for &symbol in data {
        // the table was built from `data`, so every symbol has a code
        bits.extend_from_bitslice(&table.codes[&symbol]);
    }
    (bits, table)
}

/// Decodes `bits` against `table`.
///
/// Fails if a bit leads off the code tree or the stream ends part way
/// through a code.
pub fn decode(bits: &Bits, table: &CodeTable) -> Result<Vec<u8>> {
    if bits.is_empty() {
        return Ok(Vec::new());
    }
    if table.is_empty() {
        return Err(CodecError::Decode(format!(
            "{} bits against an empty code table",
            bits.len()
        )));
    }

    let trie = DecodeTrie::build(table)?;
    let mut out = Vec::new();
    let mut at = 0;
    for (pos, bit) in bits.iter().by_vals().enumerate() {
        at = trie.nodes[at].children[bit as usize].ok_or_else(|| {
            CodecError::Decode(format!("no code matches the bits ending at offset {}", pos))
        })?;
        if let Some(symbol) = trie.nodes[at].symbol {
            out.push(symbol);
            at = 0;
        }
    }

    if at != 0 {
        return Err(CodecError::Decode(
            "bit stream ends inside a code".to_string(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitString {
        s.chars().map(|c| c == '1').collect()
    }

    /// Skewed towards small values like MTF output.
    fn skewed_bytes(len: usize, spread: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let r = (i * 31 + i / 7) % spread;
                (r * r / spread) as u8
            })
            .collect()
    }

    #[test]
    fn test_round_trip() {
        for spread in [4, 64, 256] {
            let data = skewed_bytes(5000, spread);
            let (encoded, table) = build_and_encode(&data);
            assert!(table.is_prefix_free());
            assert_eq!(decode(&encoded, &table).unwrap(), data);
        }
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let data = vec![17u8; 9];
        let (encoded, table) = build_and_encode(&data);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(17).unwrap(), bits("0").as_bitslice());
        assert_eq!(encoded.len(), 9);
        assert_eq!(decode(&encoded, &table).unwrap(), data);
    }

    #[test]
    fn test_empty_input() {
        let (encoded, table) = build_and_encode(&[]);
        assert!(encoded.is_empty());
        assert!(table.is_empty());
        assert!(decode(&encoded, &table).unwrap().is_empty());
    }

    #[test]
    fn test_optimal_lengths() {
        // weights 5, 2, 1, 1 -> lengths 1, 2, 3, 3
        let data = [0u8, 0, 0, 0, 0, 1, 1, 2, 3];
        let (encoded, table) = build_and_encode(&data);
        let lens: Vec<usize> = table.iter().map(|(_, c)| c.len()).collect();
        assert_eq!(lens, vec![1, 2, 3, 3]);
        assert_eq!(encoded.len(), 15);
        assert_eq!(table.max_code_len(), 3);
    }

    #[test]
    fn test_uniform_weights_balanced() {
        let data = [0u8, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];
        let (encoded, table) = build_and_encode(&data);
        assert!(table.iter().all(|(_, c)| c.len() == 2));
        assert_eq!(encoded.len(), 32);
        assert_eq!(table.serialized_bits(), 4 * (2 + 8));
    }

    #[test]
    fn test_deterministic() {
        let data = skewed_bytes(3000, 32);
        let (a_bits, a_table) = build_and_encode(&data);
        let (b_bits, b_table) = build_and_encode(&data);
        assert_eq!(a_table, b_table);
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_tree_weights() {
        let tree = HuffmanTree::from_data(&[3, 3, 9, 200]);
        assert_eq!(tree.symbol_count(), 3);
        assert_eq!(tree.total_weight(), 4);
        assert_eq!(HuffmanTree::from_data(&[]).total_weight(), 0);
    }

    #[test]
    fn test_every_symbol_is_emitted() {
        let data: Vec<u8> = (0..=255u8).chain([0, 0, 7]).collect();
        let (encoded, table) = build_and_encode(&data);
        assert_eq!(table.len(), 256);
        let expected: usize = data.iter().map(|&s| table.get(s).unwrap().len()).sum();
        assert_eq!(encoded.len(), expected);
        assert_eq!(table.encode(&data).unwrap(), encoded);
    }

    #[test]
    fn test_truncated_stream_fails() {
        let data = [0u8, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];
        let (mut encoded, table) = build_and_encode(&data);
        encoded.pop();
        assert!(matches!(decode(&encoded, &table), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_bits_off_the_tree_fail() {
        let table = CodeTable::from_entries([(5u8, bits("0"))]).unwrap();
        assert_eq!(decode(&bits("00"), &table).unwrap(), vec![5, 5]);
        assert!(matches!(decode(&bits("01"), &table), Err(CodecError::Decode(_))));
        assert!(matches!(
            decode(&bits("1"), &CodeTable::default()),
            Err(CodecError::Decode(_))
        ));
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(CodeTable::from_entries([(1u8, bits("0")), (2u8, bits("01"))]).is_err());
        assert!(CodeTable::from_entries([(1u8, bits("01")), (2u8, bits("0"))]).is_err());
        assert!(CodeTable::from_entries([(1u8, bits(""))]).is_err());
        assert!(CodeTable::from_entries([(1u8, bits("0")), (1u8, bits("1"))]).is_err());
        assert!(CodeTable::from_entries([(1u8, bits("0")), (2u8, bits("10"))]).is_ok());
    }

    #[test]
    fn test_table_encode_matches() {
        let data = skewed_bytes(500, 16);
        let (encoded, table) = build_and_encode(&data);
        assert_eq!(table.encode(&data).unwrap(), encoded);
        assert!(table.get(255).is_none());
        assert!(matches!(table.encode(&[255]), Err(CodecError::Decode(_))));
    }
}
