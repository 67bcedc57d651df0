//! Rank-driven byte-pair merging.
//!
//! Tiktoken-style sources only publish `bytes -> rank`. The same merge loop
//! serves two purposes here: recovering the `(first, second)` pair behind
//! every multi-byte token, and encoding the fixed sample strings.

use ahash::AHashMap;
use rayon::prelude::*;
use std::ops::Range;
use tikbake_core::{MergeRule, Rank};

/// Mergeable token bytes -> rank.
pub type RankMap = AHashMap<Vec<u8>, Rank>;

/// Split `piece` by repeatedly merging the adjacent pair whose concatenation
/// has the lowest rank, considering only ranks below `limit`.
///
/// Returns the byte ranges of the final parts, in order.
pub fn byte_pair_split(piece: &[u8], ranks: &RankMap, limit: Rank) -> Vec<Range<usize>> {
    let mut bounds: Vec<usize> = (0..=piece.len()).collect();

    while bounds.len() > 2 {
        let mut best: Option<(Rank, usize)> = None;
        for i in 0..bounds.len() - 2 {
            if let Some(&rank) = ranks.get(&piece[bounds[i]..bounds[i + 2]]) {
                if rank < limit && best.map_or(true, |(best_rank, _)| rank < best_rank) {
                    best = Some((rank, i));
                }
            }
        }

        match best {
            Some((_, i)) => {
                bounds.remove(i + 1);
            }
            None => break,
        }
    }

    bounds.windows(2).map(|w| w[0]..w[1]).collect()
}

/// Encode one pre-tokenized piece to ranks.
///
/// Returns `None` if some part of the piece is not a mergeable token, which
/// only happens when the rank table lacks single bytes.
pub fn encode_piece(piece: &[u8], ranks: &RankMap) -> Option<Vec<Rank>> {
    if let Some(&rank) = ranks.get(piece) {
        return Some(vec![rank]);
    }

    byte_pair_split(piece, ranks, Rank::MAX)
        .into_iter()
        .map(|range| ranks.get(&piece[range]).copied())
        .collect()
}

/// Merge pairs recovered from a rank table.
#[derive(Debug, Clone, Default)]
pub struct DerivedMerges {
    /// One rule per multi-byte token, sorted by rank
    pub rules: Vec<MergeRule>,
    /// Multi-byte tokens that do not reduce to exactly two lower-ranked parts
    pub unresolved: usize,
}

/// Recover the merge behind every multi-byte token.
///
/// A token of rank `r` is replayed through [`byte_pair_split`] with only
/// ranks below `r` available; when that ends in exactly two parts, those
/// parts are the merge that produced the token at rank `r`.
pub fn derive_merges(ranks: &RankMap) -> DerivedMerges {
    let candidates: Vec<(&[u8], Rank)> = ranks
        .iter()
        .filter(|(bytes, _)| bytes.len() >= 2)
        .map(|(bytes, &rank)| (bytes.as_slice(), rank))
        .collect();

    let derived: Vec<Option<MergeRule>> = candidates
        .par_iter()
        .map(|&(bytes, rank)| match byte_pair_split(bytes, ranks, rank).as_slice() {
            [first, second] => Some(MergeRule::new(
                &bytes[first.clone()],
                &bytes[second.clone()],
                rank,
            )),
            _ => None,
        })
        .collect();

    let unresolved = derived.iter().filter(|rule| rule.is_none()).count();
    let mut rules: Vec<MergeRule> = derived.into_iter().flatten().collect();
    rules.sort_by_key(|rule| rule.rank);

    DerivedMerges { rules, unresolved }
}
