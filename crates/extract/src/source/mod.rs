//! Vocabulary sources.
//!
//! A source is the upstream provider of one encoding's data. Only the
//! special-token table, the id space and per-id byte lookup are mandatory;
//! an explicit vocabulary mapping, the merge table and ordinary encoding are
//! optional capabilities that return `None` when a source does not have them.

pub mod encodings;
pub mod huggingface;
pub mod memory;
pub mod tiktoken;

pub use encodings::{lookup, EncodingSpec, KNOWN_ENCODINGS};
pub use huggingface::HuggingFaceSource;
pub use memory::MemorySource;
pub use tiktoken::TiktokenFileSource;

use tikbake_core::{MergeRule, Result, SpecialToken, TokenId, VocabEntry};

/// Outcome of an optional capability: `None` when the source lacks it,
/// `Some(Err(_))` when it exists but failed.
pub type Capability<T> = Option<Result<T>>;

/// `u32::MAX` cannot be a token id: the id space `max + 1` must fit a `u32`.
pub const MAX_TOKEN_ID: TokenId = TokenId::MAX - 1;

/// Size of the id space covering `ids`.
pub(crate) fn id_space(ids: impl Iterator<Item = TokenId>) -> u32 {
    ids.max().map_or(0, |max| max.saturating_add(1))
}

/// Upstream provider of a BPE encoding.
pub trait VocabularySource {
    /// Name of the encoding this source was opened for.
    fn name(&self) -> &str;

    /// Special token bytes and ids.
    fn special_tokens(&self) -> Vec<SpecialToken>;

    /// Size of the id space, special ids included.
    fn n_vocab(&self) -> u32;

    /// Ids of the regular tokens, ascending, when the source knows them.
    ///
    /// Lets enumeration visit only occupied ids of a sparse id space instead
    /// of walking `0..n_vocab`.
    fn token_ids(&self) -> Option<Vec<TokenId>> {
        None
    }

    /// Bytes of the regular token with this id, `None` for unused ids.
    fn decode_token(&self, id: TokenId) -> Option<Vec<u8>>;

    /// Complete regular vocabulary when the source holds one as a mapping.
    ///
    /// Sources without it are enumerated over `0..n_vocab` instead.
    fn vocabulary(&self) -> Option<Vec<VocabEntry>> {
        None
    }

    /// Merge table published by the source.
    fn merge_ranks(&self) -> Capability<Vec<MergeRule>> {
        None
    }

    /// Merge table reconstructed from other source data. Consulted only
    /// when [`VocabularySource::merge_ranks`] is absent.
    fn derived_merge_ranks(&self) -> Capability<Vec<MergeRule>> {
        None
    }

    /// Encode text without special-token handling.
    fn encode_ordinary(&self, _text: &str) -> Capability<Vec<TokenId>> {
        None
    }
}
