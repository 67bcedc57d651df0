//! Sample encodings written next to the store, used to spot-check a C
//! tokenizer against the source.

use crate::source::VocabularySource;
use std::path::Path;
use tikbake_core::{write_atomic, Result, TokenId};

/// Default sample strings.
pub const SAMPLE_TEXTS: &[&str] = &[
    "Hello world",
    "const char *message = \"Hello, world!\";",
    "This is a test of the tiktoken encoding system.",
    "GPT-4 uses the cl100k_base encoding.",
    "Hello 你好 नमस्ते こんにちは",
];

/// A sample string and its token ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEncoding {
    pub text: String,
    pub ids: Vec<TokenId>,
}

/// Encode each text with the source's ordinary encoder.
///
/// `None` when the source cannot encode; the first failure otherwise.
pub fn encode_samples<S: VocabularySource + ?Sized>(
    source: &S,
    texts: &[String],
) -> Option<Result<Vec<SampleEncoding>>> {
    let mut samples = Vec::with_capacity(texts.len());
    for text in texts {
        match source.encode_ordinary(text)? {
            Ok(ids) => samples.push(SampleEncoding {
                text: text.clone(),
                ids,
            }),
            Err(e) => return Some(Err(e)),
        }
    }
    Some(Ok(samples))
}

/// One block per sample:
///
/// ```text
/// Hello world
/// Token count: 2
/// Tokens: [9906, 1917]
///
/// ```
pub fn render_samples(samples: &[SampleEncoding]) -> String {
    samples
        .iter()
        .map(|sample| {
            format!(
                "{}\nToken count: {}\nTokens: {:?}\n\n",
                sample.text,
                sample.ids.len(),
                sample.ids
            )
        })
        .collect()
}

pub fn write_samples(path: &Path, samples: &[SampleEncoding]) -> Result<()> {
    write_atomic(path, render_samples(samples).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use tikbake_core::{ExportError, SpecialToken};

    struct Echo;

    impl VocabularySource for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn special_tokens(&self) -> Vec<SpecialToken> {
            Vec::new()
        }

        fn n_vocab(&self) -> u32 {
            256
        }

        fn decode_token(&self, id: TokenId) -> Option<Vec<u8>> {
            u8::try_from(id).ok().map(|b| vec![b])
        }

        fn encode_ordinary(&self, text: &str) -> Option<Result<Vec<TokenId>>> {
            if text.is_empty() {
                return Some(Err(ExportError::InvalidConfig("empty text".to_string())));
            }
            Some(Ok(text.bytes().map(TokenId::from).collect()))
        }
    }

    #[test]
    fn test_render_block_format() {
        let samples = vec![SampleEncoding {
            text: "Hi".to_string(),
            ids: vec![72, 105],
        }];
        assert_eq!(
            render_samples(&samples),
            "Hi\nToken count: 2\nTokens: [72, 105]\n\n"
        );
    }

    #[test]
    fn test_render_blocks_in_order() {
        let samples = vec![
            SampleEncoding {
                text: "a".to_string(),
                ids: vec![97],
            },
            SampleEncoding {
                text: String::new(),
                ids: Vec::new(),
            },
        ];
        assert_eq!(
            render_samples(&samples),
            "a\nToken count: 1\nTokens: [97]\n\n\nToken count: 0\nTokens: []\n\n"
        );
        assert_eq!(render_samples(&[]), "");
    }

    #[test]
    fn test_encode_samples() {
        let texts = vec!["ab".to_string(), "c".to_string()];
        let samples = encode_samples(&Echo, &texts).unwrap().unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].ids, vec![97, 98]);
        assert_eq!(samples[1].text, "c");
    }

    #[test]
    fn test_encode_failure_is_reported() {
        let texts = vec!["ok".to_string(), String::new()];
        assert!(matches!(encode_samples(&Echo, &texts), Some(Err(_))));
    }

    #[test]
    fn test_source_without_encoder() {
        let texts = vec!["a".to_string()];
        assert!(encode_samples(&MemorySource::new("mem"), &texts).is_none());
    }

    #[test]
    fn test_write_samples() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token_tests.txt");
        let texts: Vec<String> = SAMPLE_TEXTS.iter().map(|s| s.to_string()).collect();
        let samples = encode_samples(&Echo, &texts).unwrap().unwrap();

        write_samples(&path, &samples).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Hello world\nToken count: 11\n"));
        assert_eq!(written.matches("Token count:").count(), SAMPLE_TEXTS.len());
    }
}
