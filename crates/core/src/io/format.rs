//! On-disk schema of the canonical store.
//!
//! ```json
//! {
//!   "special_tokens": { "<base64>": 100257 },
//!   "vocab": { "<base64>": 0, ... },
//!   "merges": [["<base64>", "<base64>", 0], ...]
//! }
//! ```
//!
//! Exactly these three fields are accepted. Object members keep document
//! order in both directions, so the store is the single source of table
//! order for the header generator.

use crate::core::{CanonicalExport, MergeRule, MergeRules, TokenTable};
use crate::encoding::{decode_token, encode_token};
use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};

/// Serialized form of a [`CanonicalExport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalStore {
    /// Base64 token -> ID, in stored order
    #[serde(with = "ordered_ids")]
    pub special_tokens: Vec<(String, u32)>,
    /// Base64 token -> ID, in stored order
    #[serde(with = "ordered_ids")]
    pub vocab: Vec<(String, u32)>,
    /// `[first, second, rank]` triples, in stored order
    pub merges: Vec<StoredMerge>,
}

/// A merge serialized as a 3-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMerge(pub String, pub String, pub u32);

impl CanonicalStore {
    /// Encode every byte sequence of an export.
    pub fn from_export(export: &CanonicalExport) -> Self {
        let encode_table = |table: &TokenTable| {
            table
                .iter()
                .map(|entry| (encode_token(&entry.bytes), entry.id))
                .collect()
        };

        Self {
            special_tokens: encode_table(export.special_tokens()),
            vocab: encode_table(export.vocab()),
            merges: export
                .merges()
                .iter()
                .map(|rule| {
                    StoredMerge(encode_token(&rule.first), encode_token(&rule.second), rule.rank)
                })
                .collect(),
        }
    }

    /// Decode back into an export, rejecting undecodable strings and ids
    /// reused within a table.
    pub fn into_export(self) -> Result<CanonicalExport> {
        let special_tokens = decode_table(&self.special_tokens, "special_tokens")?;
        let vocab = decode_table(&self.vocab, "vocab")?;

        let mut merges = MergeRules::with_capacity(self.merges.len());
        for StoredMerge(first, second, rank) in &self.merges {
            merges.add_merge(MergeRule::new(
                decode_token(first)?,
                decode_token(second)?,
                *rank,
            ));
        }

        Ok(CanonicalExport::new(special_tokens, vocab, merges))
    }
}

fn decode_table(entries: &[(String, u32)], field: &str) -> Result<TokenTable> {
    let mut table = TokenTable::with_capacity(entries.len());
    for (encoded, id) in entries {
        let bytes = decode_token(encoded)?;
        table
            .add_token_with_id(&bytes, *id)
            .map_err(|e| ExportError::InvalidConfig(format!("{}: {}", field, e)))?;
    }
    Ok(table)
}

/// Serde adapter: ordered `(key, id)` pairs as a JSON object.
mod ordered_ids {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(
        entries: &[(String, u32)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, id) in entries {
            map.serialize_entry(key, id)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, u32)>, D::Error> {
        deserializer.deserialize_map(OrderedIdsVisitor)
    }

    struct OrderedIdsVisitor;

    impl<'de> Visitor<'de> for OrderedIdsVisitor {
        type Value = Vec<(String, u32)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping base64 strings to non-negative integer ids")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            let mut seen = ahash::AHashSet::with_capacity(entries.capacity());
            while let Some((key, id)) = access.next_entry::<String, u32>()? {
                if !seen.insert(key.clone()) {
                    return Err(serde::de::Error::custom(format!("duplicate key '{}'", key)));
                }
                entries.push((key, id));
            }
            Ok(entries)
        }
    }
}
