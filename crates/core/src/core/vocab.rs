//! Token tables keyed by raw bytes and by id.
//!
//! A `TokenTable` keeps entries in insertion order (the order they are
//! written to the store and rendered into the header) alongside hash
//! indexes for lookups in both directions.

use crate::error::{ExportError, Result};
use ahash::AHashMap;

/// Token ID. Ids are non-negative by construction.
pub type TokenId = u32;

/// A raw byte sequence paired with its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenEntry {
    /// Raw token bytes, any octet values
    pub bytes: Vec<u8>,
    /// Token ID
    pub id: TokenId,
}

impl TokenEntry {
    pub fn new(bytes: impl Into<Vec<u8>>, id: TokenId) -> Self {
        Self {
            bytes: bytes.into(),
            id,
        }
    }
}

/// Reserved token such as `<|endoftext|>`.
pub type SpecialToken = TokenEntry;

/// Regular (merge-derived or single byte) vocabulary entry.
pub type VocabEntry = TokenEntry;

/// Ordered token table with forward and reverse lookups.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    /// Entries in stored order
    entries: Vec<TokenEntry>,
    /// Forward mapping: bytes -> ID
    by_bytes: AHashMap<Vec<u8>, TokenId>,
    /// Reverse mapping: ID -> position in `entries`
    by_id: AHashMap<TokenId, usize>,
}

impl TokenTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            by_bytes: AHashMap::with_capacity(capacity),
            by_id: AHashMap::with_capacity(capacity),
        }
    }

    /// Add a token with a specific ID.
    ///
    /// Returns an error if either the ID or the byte sequence is already taken.
    pub fn add_token_with_id(&mut self, bytes: &[u8], id: TokenId) -> Result<()> {
        if self.by_id.contains_key(&id) {
            return Err(ExportError::InvalidConfig(format!(
                "Token ID {} already exists",
                id
            )));
        }
        if let Some(&existing) = self.by_bytes.get(bytes) {
            return Err(ExportError::InvalidConfig(format!(
                "Token bytes {:?} already mapped to ID {}",
                String::from_utf8_lossy(bytes),
                existing
            )));
        }

        self.by_id.insert(id, self.entries.len());
        self.by_bytes.insert(bytes.to_vec(), id);
        self.entries.push(TokenEntry::new(bytes, id));

        Ok(())
    }

    /// Get the ID for a byte sequence.
    #[inline]
    pub fn get_id(&self, bytes: &[u8]) -> Option<TokenId> {
        self.by_bytes.get(bytes).copied()
    }

    /// Get the byte sequence for an ID.
    #[inline]
    pub fn get_bytes(&self, id: TokenId) -> Option<&[u8]> {
        self.by_id
            .get(&id)
            .map(|&index| self.entries[index].bytes.as_slice())
    }

    #[inline]
    pub fn contains_id(&self, id: TokenId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Entries in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[TokenEntry] {
        &self.entries
    }

    /// Get the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorder entries by ascending id.
    pub fn sort_by_id(&mut self) {
        self.entries.sort_by_key(|entry| entry.id);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            self.by_id.insert(entry.id, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_token_with_id() {
        let mut table = TokenTable::new();
        table.add_token_with_id(b"hello", 5).unwrap();
        table.add_token_with_id(b"world", 10).unwrap();

        assert_eq!(table.get_id(b"hello"), Some(5));
        assert_eq!(table.get_id(b"world"), Some(10));
        assert_eq!(table.get_bytes(5), Some(&b"hello"[..]));
        assert_eq!(table.get_bytes(10), Some(&b"world"[..]));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rejects_duplicate_id_and_bytes() {
        let mut table = TokenTable::new();
        table.add_token_with_id(b"a", 0).unwrap();

        assert!(table.add_token_with_id(b"b", 0).is_err());
        assert!(table.add_token_with_id(b"a", 1).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_binary_bytes_are_keys() {
        let mut table = TokenTable::new();
        table.add_token_with_id(&[0x00], 0).unwrap();
        table.add_token_with_id(&[0x00, 0x00], 1).unwrap();
        table.add_token_with_id(&[0xff, 0xfe], 2).unwrap();

        assert_eq!(table.get_id(&[0x00]), Some(0));
        assert_eq!(table.get_id(&[0x00, 0x00]), Some(1));
        assert_eq!(table.get_bytes(2), Some(&[0xff, 0xfe][..]));
    }

    #[test]
    fn test_sort_by_id_keeps_lookups() {
        let mut table = TokenTable::new();
        table.add_token_with_id(b"c", 2).unwrap();
        table.add_token_with_id(b"a", 0).unwrap();
        table.add_token_with_id(b"b", 1).unwrap();
        table.sort_by_id();

        let ids: Vec<_> = table.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(table.get_bytes(2), Some(&b"c"[..]));
    }
}
