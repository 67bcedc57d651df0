//! tikbake-header - Static C header generation
//!
//! Renders a canonical vocabulary export into a self-contained C header: one
//! struct typedef, count macro and static initializer array per table, with
//! every token stored as a padded base64 string so raw bytes survive as C
//! string literals.
//!
//! # Example
//!
//! ```rust
//! use tikbake_core::{CanonicalExport, TokenTable};
//! use tikbake_header::HeaderGenerator;
//!
//! let mut vocab = TokenTable::new();
//! vocab.add_token_with_id(b"a", 0)?;
//! let export = CanonicalExport::new(TokenTable::new(), vocab, Default::default());
//!
//! let header = HeaderGenerator::default().render(&export);
//! assert!(header.contains("#define TIKTOKEN_VOCAB_SIZE 1"));
//! assert!(header.contains("#define TIKTOKEN_NUM_MERGES 0"));
//! # Ok::<(), tikbake_core::ExportError>(())
//! ```

pub use tikbake_core::{ExportError, Result};

pub mod config;
pub use config::{HeaderConfig, HeaderConfigBuilder};

pub mod generator;
pub use generator::HeaderGenerator;
