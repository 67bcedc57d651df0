//! tikbake-extract - Vocabulary extraction
//!
//! Reads special tokens, regular vocabulary and merge ranks from a
//! vocabulary source, normalizes them into a [`tikbake_core::CanonicalExport`]
//! and persists the canonical store plus a file of sample encodings.
//!
//! Sources differ in what they expose. A missing or failing merge table
//! never aborts a run: the store is written with an empty merge list and a
//! warning is logged.
//!
//! # Example
//!
//! ```rust
//! use tikbake_extract::{Extractor, MemorySource};
//!
//! let source = MemorySource::new("tiny")
//!     .with_token(b"a".to_vec(), 0)
//!     .with_token(b"b".to_vec(), 1)
//!     .with_token(b"ab".to_vec(), 2)
//!     .with_special_token(b"<|endoftext|>".to_vec(), 3)
//!     .with_derived_merges();
//!
//! let export = Extractor::new(&source).extract()?;
//! assert_eq!(export.vocab().len(), 3);
//! assert_eq!(export.merges().len(), 1);
//! # Ok::<(), tikbake_extract::ExportError>(())
//! ```

pub use tikbake_core::{ExportError, Result};

// Rank-driven merging
pub mod bpe;
pub use bpe::{derive_merges, encode_piece, DerivedMerges, RankMap};

// Sources
pub mod source;
pub use source::{
    Capability, EncodingSpec, HuggingFaceSource, MemorySource, TiktokenFileSource,
    VocabularySource, KNOWN_ENCODINGS, MAX_TOKEN_ID,
};

// Extraction
pub mod extractor;
pub use extractor::{
    extract_to, run_extraction, ExtractConfig, ExtractConfigBuilder, ExtractOutcome, Extractor,
    SourceKind, MAX_ENUMERATED_IDS,
};

pub mod samples;
pub use samples::{SampleEncoding, SAMPLE_TEXTS};
