//! HuggingFace byte-level BPE directories (`vocab.json` + `merges.txt`).
//!
//! Token strings in these files use the GPT-2 byte-to-unicode table, where
//! every byte maps to one printable character. They are mapped back to raw
//! bytes on load.

use super::{id_space, Capability, VocabularySource, MAX_TOKEN_ID};
use ahash::AHashMap;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tikbake_core::{ExportError, MergeRule, Result, SpecialToken, TokenId, VocabEntry};
use tracing::{debug, warn};

/// Source backed by a HuggingFace tokenizer directory.
pub struct HuggingFaceSource {
    name: String,
    special_tokens: Vec<SpecialToken>,
    vocab: Vec<VocabEntry>,
    by_id: AHashMap<TokenId, usize>,
    /// Raw `merges.txt`, parsed on demand; `None` when the file is absent
    merges_txt: Option<String>,
    byte_decoder: AHashMap<char, u8>,
}

impl HuggingFaceSource {
    /// Load `vocab.json` and, if present, `merges.txt` from `dir`.
    ///
    /// Entries of `vocab.json` whose text matches one of `special_tokens`
    /// become special tokens.
    pub fn open(dir: &Path, special_tokens: &[String]) -> Result<Self> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        let unavailable = |reason: String| ExportError::ProviderUnavailable {
            name: name.clone(),
            reason,
        };

        let vocab_path = dir.join("vocab.json");
        let vocab_file = File::open(&vocab_path)
            .map_err(|e| unavailable(format!("cannot open {}: {}", vocab_path.display(), e)))?;
        let vocab_map: HashMap<String, TokenId> =
            serde_json::from_reader(BufReader::new(vocab_file))
                .map_err(|e| unavailable(format!("cannot parse {}: {}", vocab_path.display(), e)))?;

        let merges_path = dir.join("merges.txt");
        let merges_txt = match std::fs::read_to_string(&merges_path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(unavailable(format!(
                    "cannot read {}: {}",
                    merges_path.display(),
                    e
                )))
            }
        };

        Ok(Self::from_parts(&name, vocab_map, merges_txt, special_tokens))
    }

    /// Build from an already parsed `vocab.json` and optional `merges.txt`.
    pub fn from_parts(
        name: &str,
        vocab_map: HashMap<String, TokenId>,
        merges_txt: Option<String>,
        special_tokens: &[String],
    ) -> Self {
        let byte_decoder = byte_decoder();

        let mut entries: Vec<(String, TokenId)> = vocab_map.into_iter().collect();
        entries.sort_by_key(|(_, id)| *id);

        let mut specials = Vec::new();
        let mut vocab = Vec::with_capacity(entries.len());
        let mut undecodable = 0;
        let mut out_of_range = 0;
        for (text, id) in entries {
            if id > MAX_TOKEN_ID {
                out_of_range += 1;
                continue;
            }
            if special_tokens.contains(&text) {
                specials.push(SpecialToken::new(text.into_bytes(), id));
                continue;
            }
            match decode_symbol(&text, &byte_decoder) {
                Some(bytes) => vocab.push(VocabEntry::new(bytes, id)),
                None => undecodable += 1,
            }
        }
        if undecodable > 0 {
            warn!(
                "Skipped {} vocabulary entries of {} that are not byte-level symbols",
                undecodable, name
            );
        }

        if out_of_range > 0 {
            warn!(
                "Skipped {} entries of {} whose id is outside the id space",
                out_of_range, name
            );
        }

        let by_id = vocab
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id, index))
            .collect();

        debug!(
            "Loaded {}: {} vocabulary entries, {} special tokens, merges {}",
            name,
            vocab.len(),
            specials.len(),
            if merges_txt.is_some() { "present" } else { "absent" }
        );

        Self {
            name: name.to_string(),
            special_tokens: specials,
            vocab,
            by_id,
            merges_txt,
            byte_decoder,
        }
    }

    fn parse_merges(&self, contents: &str) -> Result<Vec<MergeRule>> {
        let mut merges = Vec::new();
        let lines = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.starts_with("#version") && !line.trim().is_empty());

        for (line_num, line) in lines {
            let parts: Vec<&str> = line.split(' ').collect();
            let [first, second] = parts.as_slice() else {
                return Err(ExportError::InvalidConfig(format!(
                    "Invalid merge format at line {}: '{}'",
                    line_num + 1,
                    line
                )));
            };

            let decode = |symbol: &str| {
                decode_symbol(symbol, &self.byte_decoder).ok_or_else(|| {
                    ExportError::InvalidConfig(format!(
                        "Unknown symbol '{}' in merges at line {}",
                        symbol,
                        line_num + 1
                    ))
                })
            };

            let rank = merges.len() as u32;
            merges.push(MergeRule::new(decode(*first)?, decode(*second)?, rank));
        }

        Ok(merges)
    }
}

impl VocabularySource for HuggingFaceSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn special_tokens(&self) -> Vec<SpecialToken> {
        self.special_tokens.clone()
    }

    fn n_vocab(&self) -> u32 {
        id_space(self.vocab.iter().chain(&self.special_tokens).map(|entry| entry.id))
    }

    fn decode_token(&self, id: TokenId) -> Option<Vec<u8>> {
        self.by_id
            .get(&id)
            .map(|&index| self.vocab[index].bytes.clone())
    }

    fn vocabulary(&self) -> Option<Vec<VocabEntry>> {
        Some(self.vocab.clone())
    }

    fn merge_ranks(&self) -> Capability<Vec<MergeRule>> {
        self.merges_txt
            .as_deref()
            .map(|contents| self.parse_merges(contents))
    }
}

/// Reverse of GPT-2's byte-to-unicode table.
///
/// Printable Latin-1 bytes map to themselves; the remaining 68 bytes map to
/// consecutive code points starting at U+0100.
fn byte_decoder() -> AHashMap<char, u8> {
    let mut decoder = AHashMap::with_capacity(256);
    let mut next = 0u32;
    for b in 0u8..=255 {
        let printable = matches!(b, b'!'..=b'~' | 0xa1..=0xac | 0xae..=0xff);
        let code = if printable {
            b as u32
        } else {
            next += 1;
            255 + next
        };
        if let Some(ch) = char::from_u32(code) {
            decoder.insert(ch, b);
        }
    }
    decoder
}

fn decode_symbol(symbol: &str, decoder: &AHashMap<char, u8>) -> Option<Vec<u8>> {
    symbol.chars().map(|ch| decoder.get(&ch).copied()).collect()
}
