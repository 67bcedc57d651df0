//! Named tiktoken-style encodings.
//!
//! Each descriptor names the rank file that carries the mergeable tokens,
//! the pre-tokenization pattern used for ordinary encoding, and the special
//! tokens layered on top of the ranks.

use tikbake_core::TokenId;

pub const ENDOFTEXT: &str = "<|endoftext|>";
pub const FIM_PREFIX: &str = "<|fim_prefix|>";
pub const FIM_MIDDLE: &str = "<|fim_middle|>";
pub const FIM_SUFFIX: &str = "<|fim_suffix|>";
pub const ENDOFPROMPT: &str = "<|endofprompt|>";

const GPT2_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

const CL100K_PATTERN: &str = r"(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+(?!\S)|\s+";

const O200K_PATTERN: &str = concat!(
    r"[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]*[\p{Ll}\p{Lm}\p{Lo}\p{M}]+(?i:'s|'t|'re|'ve|'m|'ll|'d)?",
    r"|[^\r\n\p{L}\p{N}]?[\p{Lu}\p{Lt}\p{Lm}\p{Lo}\p{M}]+[\p{Ll}\p{Lm}\p{Lo}\p{M}]*(?i:'s|'t|'re|'ve|'m|'ll|'d)?",
    r"|\p{N}{1,3}",
    r"| ?[^\s\p{L}\p{N}]+[\r\n/]*",
    r"|\s*[\r\n]+",
    r"|\s+(?!\S)",
    r"|\s+",
);

/// Static description of a named encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingSpec {
    /// Canonical encoding name
    pub name: &'static str,
    /// Rank file name inside the source directory
    pub file_name: &'static str,
    /// Pre-tokenization regex
    pub pattern: &'static str,
    /// Special token text -> id
    pub special_tokens: &'static [(&'static str, TokenId)],
}

pub const R50K_BASE: EncodingSpec = EncodingSpec {
    name: "r50k_base",
    file_name: "r50k_base.tiktoken",
    pattern: GPT2_PATTERN,
    special_tokens: &[(ENDOFTEXT, 50256)],
};

pub const P50K_BASE: EncodingSpec = EncodingSpec {
    name: "p50k_base",
    file_name: "p50k_base.tiktoken",
    pattern: GPT2_PATTERN,
    special_tokens: &[(ENDOFTEXT, 50256)],
};

pub const CL100K_BASE: EncodingSpec = EncodingSpec {
    name: "cl100k_base",
    file_name: "cl100k_base.tiktoken",
    pattern: CL100K_PATTERN,
    special_tokens: &[
        (ENDOFTEXT, 100257),
        (FIM_PREFIX, 100258),
        (FIM_MIDDLE, 100259),
        (FIM_SUFFIX, 100260),
        (ENDOFPROMPT, 100276),
    ],
};

pub const O200K_BASE: EncodingSpec = EncodingSpec {
    name: "o200k_base",
    file_name: "o200k_base.tiktoken",
    pattern: O200K_PATTERN,
    special_tokens: &[(ENDOFTEXT, 199999), (ENDOFPROMPT, 200018)],
};

/// Every encoding that can be opened by name.
pub const KNOWN_ENCODINGS: &[EncodingSpec] = &[R50K_BASE, P50K_BASE, CL100K_BASE, O200K_BASE];

/// Find an encoding by name. `gpt2` is accepted as an alias of `r50k_base`.
pub fn lookup(name: &str) -> Option<EncodingSpec> {
    let name = match name {
        "gpt2" => "r50k_base",
        other => other,
    };
    KNOWN_ENCODINGS.iter().find(|spec| spec.name == name).copied()
}

/// Comma-separated list of names, for error messages.
pub fn known_names() -> String {
    KNOWN_ENCODINGS
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("cl100k_base"), Some(CL100K_BASE));
        assert_eq!(lookup("gpt2"), Some(R50K_BASE));
        assert_eq!(lookup("cl200k_base"), None);
    }

    #[test]
    fn test_patterns_compile() {
        for spec in KNOWN_ENCODINGS {
            assert!(
                fancy_regex::Regex::new(spec.pattern).is_ok(),
                "pattern for {} does not compile",
                spec.name
            );
        }
    }

    #[test]
    fn test_special_ids_unique() {
        for spec in KNOWN_ENCODINGS {
            let mut ids: Vec<_> = spec.special_tokens.iter().map(|(_, id)| *id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), spec.special_tokens.len(), "{}", spec.name);
        }
    }
}
