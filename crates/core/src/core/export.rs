//! The canonical export record.
//!
//! Built once per run from a single source snapshot and immutable afterwards.
//! The extractor produces it, the store persists it, and the header generator
//! consumes all of it.

use super::merges::{MergeRules, MergeStats, Rank};
use super::vocab::{TokenId, TokenTable};
use tracing::warn;

/// Special tokens, regular vocabulary and ordered merges of one encoding.
#[derive(Debug, Clone, Default)]
pub struct CanonicalExport {
    special_tokens: TokenTable,
    vocab: TokenTable,
    merges: MergeRules,
}

impl CanonicalExport {
    pub fn new(special_tokens: TokenTable, vocab: TokenTable, merges: MergeRules) -> Self {
        Self {
            special_tokens,
            vocab,
            merges,
        }
    }

    pub fn special_tokens(&self) -> &TokenTable {
        &self.special_tokens
    }

    pub fn vocab(&self) -> &TokenTable {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Derived counts for progress lines and header constants.
    pub fn stats(&self) -> ExportStats {
        ExportStats {
            special_tokens: self.special_tokens.len(),
            vocab: self.vocab.len(),
            merges: self.merges.stats(),
        }
    }

    /// Check the invariants the pipeline relies on.
    ///
    /// Nothing here is fatal on its own; callers decide which findings to
    /// reject.
    pub fn validate(&self) -> ValidationReport {
        let mut id_overlap: Vec<TokenId> = self
            .special_tokens
            .iter()
            .filter(|entry| self.vocab.contains_id(entry.id))
            .map(|entry| entry.id)
            .collect();
        id_overlap.sort_unstable();

        let mut unknown_merge_parts = 0;
        let mut first_unknown_rank = None;
        for rule in self.merges.iter() {
            let known = self.vocab.get_id(&rule.first).is_some()
                && self.vocab.get_id(&rule.second).is_some();
            if !known {
                unknown_merge_parts += 1;
                first_unknown_rank.get_or_insert(rule.rank);
            }
        }

        ValidationReport {
            id_overlap,
            duplicate_ranks: self.merges.duplicate_ranks(),
            unknown_merge_parts,
            first_unknown_rank,
            empty_vocab: self.vocab.is_empty(),
        }
    }
}

/// Counts of the three tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub special_tokens: usize,
    pub vocab: usize,
    pub merges: MergeStats,
}

impl std::fmt::Display for ExportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} special tokens, {} vocabulary entries, {} merges",
            self.special_tokens, self.vocab, self.merges.count
        )?;
        if self.merges.count > 0 {
            write!(
                f,
                " (ranks {}..={})",
                self.merges.min_rank, self.merges.max_rank
            )?;
        }
        Ok(())
    }
}

/// Findings from [`CanonicalExport::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Ids present in both the special-token set and the vocabulary
    pub id_overlap: Vec<TokenId>,
    /// Rank values used by more than one merge
    pub duplicate_ranks: Vec<Rank>,
    /// Merges whose first or second part is not a vocabulary entry
    pub unknown_merge_parts: usize,
    pub first_unknown_rank: Option<Rank>,
    pub empty_vocab: bool,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.id_overlap.is_empty()
            && self.duplicate_ranks.is_empty()
            && self.unknown_merge_parts == 0
            && !self.empty_vocab
    }

    /// Emit one warning per finding.
    pub fn log_findings(&self) {
        if !self.id_overlap.is_empty() {
            warn!(
                "{} ids are both special and regular (first: {})",
                self.id_overlap.len(),
                self.id_overlap[0]
            );
        }
        if !self.duplicate_ranks.is_empty() {
            warn!(
                "{} merge ranks are duplicated (first: {}); stored order breaks ties",
                self.duplicate_ranks.len(),
                self.duplicate_ranks[0]
            );
        }
        if let Some(rank) = self.first_unknown_rank {
            warn!(
                "{} merges reference byte sequences missing from the vocabulary (first at rank {})",
                self.unknown_merge_parts, rank
            );
        }
        if self.empty_vocab {
            warn!("Vocabulary is empty; the export is degenerate");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merges::MergeRule;

    fn table(entries: &[(&[u8], TokenId)]) -> TokenTable {
        let mut table = TokenTable::new();
        for (bytes, id) in entries {
            table.add_token_with_id(bytes, *id).unwrap();
        }
        table
    }

    #[test]
    fn test_clean_export() {
        let export = CanonicalExport::new(
            table(&[(b"<|endoftext|>", 4)]),
            table(&[(b"a", 0), (b"b", 1), (b"ab", 2), (b"c", 3)]),
            vec![MergeRule::new(b"a".to_vec(), b"b".to_vec(), 0)]
                .into_iter()
                .collect(),
        );

        let report = export.validate();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(export.stats().special_tokens, 1);
        assert_eq!(export.stats().vocab, 4);
        assert_eq!(export.stats().merges.count, 1);
    }

    #[test]
    fn test_detects_id_overlap() {
        let export = CanonicalExport::new(
            table(&[(b"<|endoftext|>", 1)]),
            table(&[(b"a", 0), (b"b", 1)]),
            MergeRules::new(),
        );

        assert_eq!(export.validate().id_overlap, vec![1]);
    }

    #[test]
    fn test_detects_unknown_merge_parts() {
        let export = CanonicalExport::new(
            TokenTable::new(),
            table(&[(b"a", 0), (b"b", 1)]),
            vec![
                MergeRule::new(b"a".to_vec(), b"b".to_vec(), 0),
                MergeRule::new(b"ab".to_vec(), b"z".to_vec(), 1),
                MergeRule::new(b"q".to_vec(), b"b".to_vec(), 2),
            ]
            .into_iter()
            .collect(),
        );

        let report = export.validate();
        assert_eq!(report.unknown_merge_parts, 2);
        assert_eq!(report.first_unknown_rank, Some(1));
    }

    #[test]
    fn test_flags_empty_vocabulary() {
        let export = CanonicalExport::default();
        let report = export.validate();

        assert!(report.empty_vocab);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_stats_display() {
        let export = CanonicalExport::new(
            TokenTable::new(),
            table(&[(b"a", 0), (b"b", 1), (b"ab", 2)]),
            vec![MergeRule::new(b"a".to_vec(), b"b".to_vec(), 2)]
                .into_iter()
                .collect(),
        );

        assert_eq!(
            export.stats().to_string(),
            "0 special tokens, 3 vocabulary entries, 1 merges (ranks 2..=2)"
        );
    }
}
