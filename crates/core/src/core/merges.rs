//! Merge rule storage for BPE.
//!
//! Merges are kept as an ordered list of byte-sequence pairs. The list order
//! is itself meaningful: once a store is written, consumers may rely on either
//! the order or the rank field, so nothing after extraction reorders it.

use ahash::AHashSet;

/// Merge rank (lower rank = applied earlier).
pub type Rank = u32;

/// A single BPE merge: `first ++ second` at priority `rank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub first: Vec<u8>,
    pub second: Vec<u8>,
    pub rank: Rank,
}

impl MergeRule {
    pub fn new(first: impl Into<Vec<u8>>, second: impl Into<Vec<u8>>, rank: Rank) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            rank,
        }
    }
}

/// Ordered collection of BPE merge rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRules {
    /// Merge rules in stored order
    rules: Vec<MergeRule>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
        }
    }

    /// Append a merge rule, keeping insertion order.
    pub fn add_merge(&mut self, rule: MergeRule) {
        self.rules.push(rule);
    }

    /// Stable sort by rank. Rules sharing a rank keep their relative order.
    pub fn sort_by_rank(&mut self) {
        self.rules.sort_by_key(|rule| rule.rank);
    }

    /// Rank values that occur more than once, ascending.
    pub fn duplicate_ranks(&self) -> Vec<Rank> {
        let mut seen = AHashSet::with_capacity(self.rules.len());
        let mut duplicates: Vec<Rank> = self
            .rules
            .iter()
            .filter(|rule| !seen.insert(rule.rank))
            .map(|rule| rule.rank)
            .collect();
        duplicates.sort_unstable();
        duplicates.dedup();
        duplicates
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergeRule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<MergeRule> for MergeRules {
    fn from_iter<I: IntoIterator<Item = MergeRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Statistics about merge rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of merge rules
    pub count: usize,
    /// Maximum rank
    pub max_rank: Rank,
    /// Minimum rank
    pub min_rank: Rank,
}

impl MergeRules {
    /// Get statistics about the merge rules.
    pub fn stats(&self) -> MergeStats {
        let mut min_rank = Rank::MAX;
        let mut max_rank = 0;

        for rule in &self.rules {
            min_rank = min_rank.min(rule.rank);
            max_rank = max_rank.max(rule.rank);
        }

        MergeStats {
            count: self.len(),
            max_rank,
            min_rank: if min_rank == Rank::MAX { 0 } else { min_rank },
        }
    }
}
