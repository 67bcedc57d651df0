//! Extraction of a canonical export from a vocabulary source.

use crate::samples::{encode_samples, write_samples, SAMPLE_TEXTS};
use crate::source::{HuggingFaceSource, TiktokenFileSource, VocabularySource};
use std::path::{Path, PathBuf};
use tikbake_core::{
    CanonicalExport, ExportError, ExportStats, MergeRules, Result, StoreSaver, TokenId,
    TokenTable, ValidationReport,
};
use tracing::{debug, info, warn};

/// Where the source data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Directory holding `<encoding>.tiktoken` rank files
    TiktokenFile { dir: PathBuf },
    /// HuggingFace directory with `vocab.json` and `merges.txt`
    HuggingFace {
        dir: PathBuf,
        special_tokens: Vec<String>,
    },
}

/// Configuration for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Encoding name, also the store file stem
    pub encoding: String,
    pub source: SourceKind,
    /// Directory receiving the store and sample files
    pub output_dir: PathBuf,
    /// Strings encoded into the sample file
    pub sample_texts: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            encoding: "cl100k_base".to_string(),
            source: SourceKind::TiktokenFile {
                dir: PathBuf::from("assets"),
            },
            output_dir: PathBuf::from("src/tiktoken_data"),
            sample_texts: SAMPLE_TEXTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractConfig {
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }

    /// `<output_dir>/<encoding>_data.json`
    pub fn store_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_data.json", self.encoding))
    }

    /// `<output_dir>/token_tests.txt`
    pub fn samples_path(&self) -> PathBuf {
        self.output_dir.join("token_tests.txt")
    }

    /// Open the configured source.
    pub fn open_source(&self) -> Result<Box<dyn VocabularySource>> {
        Ok(match &self.source {
            SourceKind::TiktokenFile { dir } => {
                Box::new(TiktokenFileSource::open(&self.encoding, dir)?)
            }
            SourceKind::HuggingFace {
                dir,
                special_tokens,
            } => Box::new(HuggingFaceSource::open(dir, special_tokens)?),
        })
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Clone, Default)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoding(mut self, name: impl Into<String>) -> Self {
        self.config.encoding = name.into();
        self
    }

    /// Read `<encoding>.tiktoken` from `dir`.
    pub fn tiktoken_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source = SourceKind::TiktokenFile { dir: dir.into() };
        self
    }

    /// Read a HuggingFace directory instead of a rank file.
    pub fn huggingface_dir(mut self, dir: impl Into<PathBuf>, special_tokens: Vec<String>) -> Self {
        self.config.source = SourceKind::HuggingFace {
            dir: dir.into(),
            special_tokens,
        };
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn sample_texts(mut self, texts: Vec<String>) -> Self {
        self.config.sample_texts = texts;
        self
    }

    pub fn build(self) -> Result<ExtractConfig> {
        let name = &self.config.encoding;
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid {
            return Err(ExportError::InvalidConfig(format!(
                "encoding name '{}' must be non-empty and use only [A-Za-z0-9_.-]",
                name
            )));
        }
        Ok(self.config)
    }
}

/// Largest id space enumerated for a source that cannot list its ids.
pub const MAX_ENUMERATED_IDS: u32 = 1 << 24;

/// Builds a [`CanonicalExport`] from one source snapshot.
pub struct Extractor<'a, S: VocabularySource + ?Sized> {
    source: &'a S,
}

impl<'a, S: VocabularySource + ?Sized> Extractor<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Query the source and normalize the results.
    ///
    /// Special tokens and vocabulary are ordered by id. Merges are stably
    /// ordered by rank; an unavailable merge table yields an empty one.
    pub fn extract(&self) -> Result<CanonicalExport> {
        let special_tokens = self.special_tokens();
        let vocab = self.vocabulary(&special_tokens)?;

        let merges = match self.merges() {
            Ok(merges) => merges,
            Err(e) if !e.is_fatal() => {
                warn!("{}; continuing with an empty merge table", e);
                MergeRules::new()
            }
            Err(e) => return Err(e),
        };

        Ok(CanonicalExport::new(special_tokens, vocab, merges))
    }

    fn special_tokens(&self) -> TokenTable {
        let tokens = self.source.special_tokens();
        let mut table = TokenTable::with_capacity(tokens.len());
        for token in tokens {
            if let Err(e) = table.add_token_with_id(&token.bytes, token.id) {
                warn!("Dropping special token {:?}: {}", String::from_utf8_lossy(&token.bytes), e);
            }
        }
        table.sort_by_id();
        table
    }

    /// Regular vocabulary, from the explicit mapping when the source has one,
    /// otherwise by enumerating the source's ids. Ids claimed by special
    /// tokens are never regular entries.
    fn vocabulary(&self, special_tokens: &TokenTable) -> Result<TokenTable> {
        let mut table;
        let mut claimed = 0usize;
        let mut rejected = 0usize;

        match self.source.vocabulary() {
            Some(entries) => {
                table = TokenTable::with_capacity(entries.len());
                for entry in entries {
                    if special_tokens.contains_id(entry.id) {
                        claimed += 1;
                    } else if table.add_token_with_id(&entry.bytes, entry.id).is_err() {
                        rejected += 1;
                    }
                }
            }
            None => {
                let n_vocab = self.source.n_vocab();
                let ids: Box<dyn Iterator<Item = TokenId>> = match self.source.token_ids() {
                    Some(ids) => {
                        table = TokenTable::with_capacity(ids.len());
                        Box::new(ids.into_iter())
                    }
                    None if n_vocab > MAX_ENUMERATED_IDS => {
                        return Err(ExportError::ProviderUnavailable {
                            name: self.source.name().to_string(),
                            reason: format!(
                                "id space of {} exceeds the enumeration limit of {} and the source cannot list its ids",
                                n_vocab, MAX_ENUMERATED_IDS
                            ),
                        });
                    }
                    None => {
                        table = TokenTable::with_capacity(n_vocab as usize);
                        Box::new(0..n_vocab)
                    }
                };
                let mut unused = 0usize;
                for id in ids {
                    if special_tokens.contains_id(id) {
                        continue;
                    }
                    match self.source.decode_token(id) {
                        Some(bytes) => {
                            if table.add_token_with_id(&bytes, id).is_err() {
                                rejected += 1;
                            }
                        }
                        None => unused += 1,
                    }
                }
                debug!("Enumerated {} ids, {} without a token", n_vocab, unused);
            }
        }

        if claimed > 0 {
            warn!(
                "{} vocabulary entries share an id with a special token; kept as special only",
                claimed
            );
        }
        if rejected > 0 {
            warn!("{} vocabulary entries repeat an existing id or byte sequence; dropped", rejected);
        }

        table.sort_by_id();
        Ok(table)
    }

    /// Merge table through the source's capabilities, primary accessor first.
    ///
    /// Absence and failure both surface as [`ExportError::MergeAccessDegraded`].
    fn merges(&self) -> Result<MergeRules> {
        let (accessor, outcome) = match self.source.merge_ranks() {
            Some(outcome) => ("merge table", outcome),
            None => match self.source.derived_merge_ranks() {
                Some(outcome) => ("derived merge table", outcome),
                None => {
                    return Err(ExportError::MergeAccessDegraded(format!(
                        "source '{}' exposes no merge ranks",
                        self.source.name()
                    )))
                }
            },
        };

        let rules = outcome.map_err(|e| {
            ExportError::MergeAccessDegraded(format!(
                "reading the {} of '{}' failed: {}",
                accessor,
                self.source.name(),
                e
            ))
        })?;

        debug!("Read {} rules from the {}", rules.len(), accessor);
        let mut merges: MergeRules = rules.into_iter().collect();
        merges.sort_by_rank();
        Ok(merges)
    }
}

/// Result of [`run_extraction`].
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub stats: ExportStats,
    pub report: ValidationReport,
    pub store_path: PathBuf,
    /// `None` when the source cannot encode text
    pub samples_path: Option<PathBuf>,
}

/// Open the configured source, extract, and write the store and samples.
pub fn run_extraction(config: &ExtractConfig) -> Result<ExtractOutcome> {
    let source = config.open_source()?;
    info!("Loaded '{}' encoding", source.name());

    extract_to(source.as_ref(), config)
}

/// Extract from an already opened source and write the artifacts named by
/// `config`.
pub fn extract_to<S: VocabularySource + ?Sized>(
    source: &S,
    config: &ExtractConfig,
) -> Result<ExtractOutcome> {
    let export = Extractor::new(source).extract()?;
    let stats = export.stats();
    info!("Extracted {}", stats);

    let report = export.validate();
    report.log_findings();

    let store_path = config.store_path();
    StoreSaver::new(&export).save(&store_path)?;

    let samples_path = write_sample_file(source, &config.sample_texts, &config.samples_path())?;

    Ok(ExtractOutcome {
        stats,
        report,
        store_path,
        samples_path,
    })
}

fn write_sample_file<S: VocabularySource + ?Sized>(
    source: &S,
    texts: &[String],
    path: &Path,
) -> Result<Option<PathBuf>> {
    match encode_samples(source, texts) {
        Some(Ok(samples)) => {
            write_samples(path, &samples)?;
            info!("Wrote test cases to {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        Some(Err(e)) => {
            warn!("Skipping sample file: {}", e);
            Ok(None)
        }
        None => {
            info!("Source '{}' cannot encode text; no sample file written", source.name());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use tikbake_core::{MergeRule, StoreLoader};

    fn abc_source() -> MemorySource {
        MemorySource::new("abc")
            .with_token(b"a".to_vec(), 0)
            .with_token(b"b".to_vec(), 1)
            .with_token(b"c".to_vec(), 2)
            .with_token(b"ab".to_vec(), 3)
            .with_token(b"abc".to_vec(), 4)
            .with_special_token(b"<|endoftext|>".to_vec(), 5)
    }

    #[test]
    fn test_enumerates_id_space_without_specials() {
        let export = Extractor::new(&abc_source()).extract().unwrap();

        assert_eq!(export.special_tokens().len(), 1);
        assert_eq!(export.vocab().len(), 5);
        assert!(!export.vocab().contains_id(5));
        assert!(export.validate().id_overlap.is_empty());
    }

    #[test]
    fn test_special_id_claims_regular_entry() {
        let source = abc_source()
            .with_token(b"<|endoftext|>".to_vec(), 5)
            .with_explicit_vocabulary();
        let export = Extractor::new(&source).extract().unwrap();

        assert_eq!(export.vocab().len(), 5);
        assert_eq!(export.special_tokens().get_id(b"<|endoftext|>"), Some(5));
        assert!(export.validate().id_overlap.is_empty());
    }

    #[test]
    fn test_skips_gaps_in_id_space() {
        let source = MemorySource::new("gappy")
            .with_token(b"a".to_vec(), 0)
            .with_token(b"b".to_vec(), 3);
        let export = Extractor::new(&source).extract().unwrap();

        let ids: Vec<_> = export.vocab().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn test_sparse_id_space_visits_occupied_ids_only() {
        let source = MemorySource::new("sparse")
            .with_token(b"a".to_vec(), 0)
            .with_token(b"b".to_vec(), 4_000_000_000);
        let export = Extractor::new(&source).extract().unwrap();

        let ids: Vec<_> = export.vocab().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 4_000_000_000]);
    }

    /// Source that only answers per-id lookups.
    struct OpaqueIds(u32);

    impl VocabularySource for OpaqueIds {
        fn name(&self) -> &str {
            "opaque"
        }

        fn special_tokens(&self) -> Vec<tikbake_core::SpecialToken> {
            Vec::new()
        }

        fn n_vocab(&self) -> u32 {
            self.0
        }

        fn decode_token(&self, id: TokenId) -> Option<Vec<u8>> {
            (id < 3).then(|| vec![b'a' + id as u8])
        }
    }

    #[test]
    fn test_enumerates_id_space_without_listing() {
        let export = Extractor::new(&OpaqueIds(10)).extract().unwrap();
        assert_eq!(export.vocab().len(), 3);
    }

    #[test]
    fn test_rejects_oversized_id_space_without_listing() {
        let err = Extractor::new(&OpaqueIds(MAX_ENUMERATED_IDS + 1))
            .extract()
            .unwrap_err();

        assert!(matches!(err, ExportError::ProviderUnavailable { .. }));
        assert!(err.to_string().contains("enumeration limit"));
    }

    #[test]
    fn test_primary_merges_sorted_by_rank() {
        let source = abc_source().with_merges(vec![
            MergeRule::new(b"ab".to_vec(), b"c".to_vec(), 4),
            MergeRule::new(b"a".to_vec(), b"b".to_vec(), 3),
        ]);
        let export = Extractor::new(&source).extract().unwrap();

        let ranks: Vec<_> = export.merges().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![3, 4]);
    }

    #[test]
    fn test_primary_takes_precedence_over_derived() {
        let source = abc_source()
            .with_merges(vec![MergeRule::new(b"a".to_vec(), b"b".to_vec(), 0)])
            .with_derived_merges();
        let export = Extractor::new(&source).extract().unwrap();

        assert_eq!(export.merges().len(), 1);
        assert_eq!(export.merges().as_slice()[0].rank, 0);
    }

    #[test]
    fn test_falls_back_to_derived_merges() {
        let source = abc_source().with_derived_merges();
        let export = Extractor::new(&source).extract().unwrap();

        assert_eq!(
            export.merges().as_slice(),
            &[
                MergeRule::new(b"a".to_vec(), b"b".to_vec(), 3),
                MergeRule::new(b"ab".to_vec(), b"c".to_vec(), 4),
            ]
        );
    }

    #[test]
    fn test_missing_merges_degrade_to_empty() {
        let export = Extractor::new(&abc_source()).extract().unwrap();

        assert!(export.merges().is_empty());
        assert_eq!(export.vocab().len(), 5);
    }

    #[test]
    fn test_failing_merges_degrade_to_empty() {
        let source = abc_source().with_failing_merges("accessor raised");
        let extractor = Extractor::new(&source);

        let err = extractor.merges().unwrap_err();
        assert!(matches!(err, ExportError::MergeAccessDegraded(_)));
        assert!(extractor.extract().unwrap().merges().is_empty());
    }

    #[test]
    fn test_duplicate_ranks_keep_source_order() {
        let source = abc_source().with_merges(vec![
            MergeRule::new(b"ab".to_vec(), b"c".to_vec(), 1),
            MergeRule::new(b"b".to_vec(), b"c".to_vec(), 0),
            MergeRule::new(b"a".to_vec(), b"b".to_vec(), 0),
        ]);
        let export = Extractor::new(&source).extract().unwrap();

        let firsts: Vec<_> = export.merges().iter().map(|r| r.first.clone()).collect();
        assert_eq!(firsts, vec![b"b".to_vec(), b"a".to_vec(), b"ab".to_vec()]);
        assert_eq!(export.validate().duplicate_ranks, vec![0]);
    }

    #[test]
    fn test_empty_source_is_degenerate_not_rejected() {
        let export = Extractor::new(&MemorySource::new("empty")).extract().unwrap();

        assert!(export.vocab().is_empty());
        assert!(export.validate().empty_vocab);
    }

    #[test]
    fn test_extract_to_writes_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ExtractConfig::builder()
            .encoding("abc")
            .output_dir(dir.path())
            .build()
            .unwrap();

        let outcome = extract_to(&abc_source().with_derived_merges(), &config).unwrap();
        assert_eq!(outcome.store_path, dir.path().join("abc_data.json"));
        assert!(outcome.samples_path.is_none());
        assert_eq!(outcome.stats.merges.count, 2);

        let loaded = StoreLoader::load(&outcome.store_path).unwrap();
        assert_eq!(loaded.vocab().len(), 5);
        assert_eq!(loaded.merges().len(), 2);
    }

    #[test]
    fn test_run_extraction_reports_unavailable_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ExtractConfig::builder()
            .tiktoken_dir(dir.path())
            .output_dir(dir.path().join("out"))
            .build()
            .unwrap();

        let err = run_extraction(&config).unwrap_err();
        assert!(matches!(err, ExportError::ProviderUnavailable { .. }));
        assert!(!config.store_path().exists());
    }

    #[test]
    fn test_builder_rejects_bad_encoding_name() {
        assert!(ExtractConfig::builder().encoding("").build().is_err());
        assert!(ExtractConfig::builder().encoding("../etc").build().is_err());
    }
}
