//! Tiktoken rank files.
//!
//! A rank file has one mergeable token per line: the padded base64 token
//! bytes, a space, and the rank. The rank doubles as the token id. Rank files
//! carry no pair table, so merges are only available through derivation.

use super::encodings::{self, EncodingSpec};
use super::{id_space, Capability, VocabularySource, MAX_TOKEN_ID};
use crate::bpe::{derive_merges, encode_piece, RankMap};
use ahash::AHashMap;
use fancy_regex::Regex;
use std::path::Path;
use tikbake_core::{
    decode_token, ExportError, MergeRule, Rank, Result, SpecialToken, TokenId,
};
use tracing::{debug, warn};

/// Source backed by a `<name>.tiktoken` rank file.
pub struct TiktokenFileSource {
    spec: EncodingSpec,
    /// Token bytes -> rank
    encoder: RankMap,
    /// Rank -> token bytes
    decoder: AHashMap<Rank, Vec<u8>>,
    pattern: Regex,
}

impl TiktokenFileSource {
    /// Open a named encoding from `dir`.
    ///
    /// Fails with [`ExportError::ProviderUnavailable`] for unknown names and
    /// unreadable rank files.
    pub fn open(name: &str, dir: &Path) -> Result<Self> {
        let spec = encodings::lookup(name).ok_or_else(|| ExportError::ProviderUnavailable {
            name: name.to_string(),
            reason: format!("unknown encoding (known: {})", encodings::known_names()),
        })?;

        let path = dir.join(spec.file_name);
        let contents =
            std::fs::read_to_string(&path).map_err(|e| ExportError::ProviderUnavailable {
                name: spec.name.to_string(),
                reason: format!(
                    "cannot read rank file {}: {}. Place {} in {}",
                    path.display(),
                    e,
                    spec.file_name,
                    dir.display()
                ),
            })?;

        debug!("Read rank file {} ({} bytes)", path.display(), contents.len());
        Self::from_rank_file(spec, &contents)
    }

    /// Build from rank file contents.
    ///
    /// Malformed lines, duplicate tokens and duplicate ranks are skipped with
    /// a warning.
    pub fn from_rank_file(spec: EncodingSpec, contents: &str) -> Result<Self> {
        let pattern = Regex::new(spec.pattern).map_err(|e| ExportError::ProviderUnavailable {
            name: spec.name.to_string(),
            reason: format!("invalid pre-tokenization pattern: {}", e),
        })?;

        let mut encoder = RankMap::new();
        let mut decoder = AHashMap::new();

        for (line_num, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let parsed = match parts.as_slice() {
                [token, rank] => decode_token(token)
                    .ok()
                    .zip(rank.parse::<Rank>().ok()),
                _ => None,
            };
            let Some((bytes, rank)) = parsed else {
                warn!("Skipping malformed line {} in {}: {}", line_num + 1, spec.file_name, line);
                continue;
            };

            if rank > MAX_TOKEN_ID {
                warn!(
                    "Skipping line {} in {}: rank {} is outside the id space",
                    line_num + 1,
                    spec.file_name,
                    rank
                );
                continue;
            }

            if encoder.contains_key(&bytes) || decoder.contains_key(&rank) {
                warn!(
                    "Skipping duplicate token or rank on line {} in {}",
                    line_num + 1,
                    spec.file_name
                );
                continue;
            }

            decoder.insert(rank, bytes.clone());
            encoder.insert(bytes, rank);
        }

        Ok(Self {
            spec,
            encoder,
            decoder,
            pattern,
        })
    }

    /// Number of mergeable tokens read from the rank file.
    pub fn mergeable_count(&self) -> usize {
        self.encoder.len()
    }
}

impl VocabularySource for TiktokenFileSource {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn special_tokens(&self) -> Vec<SpecialToken> {
        self.spec
            .special_tokens
            .iter()
            .map(|&(text, id)| SpecialToken::new(text.as_bytes(), id))
            .collect()
    }

    fn n_vocab(&self) -> u32 {
        let specials = self.spec.special_tokens.iter().map(|&(_, id)| id);
        id_space(self.decoder.keys().copied().chain(specials))
    }

    fn token_ids(&self) -> Option<Vec<TokenId>> {
        let mut ids: Vec<TokenId> = self.decoder.keys().copied().collect();
        ids.sort_unstable();
        Some(ids)
    }

    fn decode_token(&self, id: TokenId) -> Option<Vec<u8>> {
        self.decoder.get(&id).cloned()
    }

    fn derived_merge_ranks(&self) -> Capability<Vec<MergeRule>> {
        let derived = derive_merges(&self.encoder);
        if derived.unresolved > 0 {
            warn!(
                "{} multi-byte tokens of {} do not reduce to a two-part merge; they have no merge rule",
                derived.unresolved, self.spec.name
            );
        }
        Some(Ok(derived.rules))
    }

    fn encode_ordinary(&self, text: &str) -> Capability<Vec<TokenId>> {
        let mut ids = Vec::new();
        for piece in self.pattern.find_iter(text) {
            let piece = match piece {
                Ok(piece) => piece,
                Err(e) => {
                    return Some(Err(ExportError::InvalidConfig(format!(
                        "pre-tokenization failed: {}",
                        e
                    ))))
                }
            };
            match encode_piece(piece.as_str().as_bytes(), &self.encoder) {
                Some(ranks) => ids.extend(ranks),
                None => {
                    return Some(Err(ExportError::InvalidConfig(format!(
                        "{} cannot encode {:?}: rank file lacks single-byte tokens",
                        self.spec.name,
                        piece.as_str()
                    ))))
                }
            }
        }
        Some(Ok(ids))
    }
}
