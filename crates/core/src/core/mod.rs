//! Canonical export data model.
//!
//! This module contains the records shared by every stage: token tables for
//! special tokens and the regular vocabulary, the ordered merge list, and the
//! aggregate export that ties them together.

pub mod export;
pub mod merges;
pub mod vocab;

pub use export::{CanonicalExport, ExportStats, ValidationReport};
pub use merges::{MergeRule, MergeRules, MergeStats};
pub use vocab::{SpecialToken, TokenEntry, TokenTable, VocabEntry};
