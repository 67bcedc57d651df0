//! In-memory vocabulary source.

use super::{id_space, Capability, VocabularySource};
use crate::bpe::{derive_merges, RankMap};
use ahash::AHashMap;
use tikbake_core::{ExportError, MergeRule, SpecialToken, TokenId, VocabEntry};

/// Source over data held in memory, with every optional capability
/// switchable. Useful for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    special_tokens: Vec<SpecialToken>,
    tokens: AHashMap<TokenId, Vec<u8>>,
    explicit_vocabulary: bool,
    merges: Option<std::result::Result<Vec<MergeRule>, String>>,
    derive_from_ids: bool,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_special_token(mut self, bytes: impl Into<Vec<u8>>, id: TokenId) -> Self {
        self.special_tokens.push(SpecialToken::new(bytes, id));
        self
    }

    pub fn with_token(mut self, bytes: impl Into<Vec<u8>>, id: TokenId) -> Self {
        self.tokens.insert(id, bytes.into());
        self
    }

    /// Report the tokens as an explicit mapping instead of an id space.
    pub fn with_explicit_vocabulary(mut self) -> Self {
        self.explicit_vocabulary = true;
        self
    }

    /// Publish a merge table.
    pub fn with_merges(mut self, merges: Vec<MergeRule>) -> Self {
        self.merges = Some(Ok(merges));
        self
    }

    /// Publish a merge table that fails when read.
    pub fn with_failing_merges(mut self, reason: impl Into<String>) -> Self {
        self.merges = Some(Err(reason.into()));
        self
    }

    /// Offer merges derived from the tokens, treating each id as a rank.
    pub fn with_derived_merges(mut self) -> Self {
        self.derive_from_ids = true;
        self
    }
}

impl VocabularySource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn special_tokens(&self) -> Vec<SpecialToken> {
        self.special_tokens.clone()
    }

    fn n_vocab(&self) -> u32 {
        let specials = self.special_tokens.iter().map(|token| token.id);
        id_space(self.tokens.keys().copied().chain(specials))
    }

    fn token_ids(&self) -> Option<Vec<TokenId>> {
        let mut ids: Vec<TokenId> = self.tokens.keys().copied().collect();
        ids.sort_unstable();
        Some(ids)
    }

    fn decode_token(&self, id: TokenId) -> Option<Vec<u8>> {
        self.tokens.get(&id).cloned()
    }

    fn vocabulary(&self) -> Option<Vec<VocabEntry>> {
        if !self.explicit_vocabulary {
            return None;
        }
        let mut entries: Vec<_> = self
            .tokens
            .iter()
            .map(|(&id, bytes)| VocabEntry::new(bytes.clone(), id))
            .collect();
        entries.sort_by_key(|entry| entry.id);
        Some(entries)
    }

    fn merge_ranks(&self) -> Capability<Vec<MergeRule>> {
        self.merges.as_ref().map(|merges| {
            merges.clone().map_err(ExportError::MergeAccessDegraded)
        })
    }

    fn derived_merge_ranks(&self) -> Capability<Vec<MergeRule>> {
        if !self.derive_from_ids {
            return None;
        }
        let ranks: RankMap = self
            .tokens
            .iter()
            .map(|(&id, bytes)| (bytes.clone(), id))
            .collect();
        Some(Ok(derive_merges(&ranks).rules))
    }
}
