//! tikbake-core - Canonical vocabulary export model
//!
//! This crate holds everything the extraction and header-generation stages
//! share: the token tables and merge list of a BPE encoding, the padded
//! base64 encoding that makes raw token bytes binary-safe, the error
//! taxonomy, and the canonical store that persists an export between stages.
//!
//! # Example
//!
//! ```rust
//! use tikbake_core::{CanonicalExport, MergeRule, MergeRules, TokenTable};
//!
//! let mut vocab = TokenTable::new();
//! vocab.add_token_with_id(b"a", 0)?;
//! vocab.add_token_with_id(b"b", 1)?;
//! vocab.add_token_with_id(b"ab", 2)?;
//!
//! let merges: MergeRules = vec![MergeRule::new(b"a".to_vec(), b"b".to_vec(), 2)]
//!     .into_iter()
//!     .collect();
//!
//! let export = CanonicalExport::new(TokenTable::new(), vocab, merges);
//! assert!(export.validate().is_clean());
//! # Ok::<(), tikbake_core::ExportError>(())
//! ```

pub mod error;
pub use error::{ExportError, Result};

// Data model
pub mod core;
pub use core::merges::Rank;
pub use core::vocab::TokenId;
pub use core::{
    CanonicalExport, ExportStats, MergeRule, MergeRules, MergeStats, SpecialToken, TokenEntry,
    TokenTable, ValidationReport, VocabEntry,
};

// Binary-safe token encoding
pub mod encoding;
pub use encoding::{decode_token, encode_token};

// Canonical store persistence
pub mod io;
pub use io::{write_atomic, CanonicalStore, StoreLoader, StoreSaver, StoredMerge};
