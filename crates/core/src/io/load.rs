//! Loading the canonical store.

use super::format::CanonicalStore;
use crate::core::CanonicalExport;
use crate::error::{ExportError, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, info};

/// Canonical store loader.
pub struct StoreLoader;

impl StoreLoader {
    /// Load and schema-check a canonical store.
    ///
    /// A missing file is reported as [`ExportError::SchemaMissing`]; anything
    /// that fails to parse, decode, or keeps an id in both tables is
    /// [`ExportError::SchemaInvalid`]. Remaining validation findings are
    /// logged as warnings.
    pub fn load(path: &Path) -> Result<CanonicalExport> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExportError::SchemaMissing {
                path: path.to_path_buf(),
            },
            _ => ExportError::io(path, e),
        })?;

        let reader = BufReader::new(file);
        let store: CanonicalStore =
            serde_json::from_reader(reader).map_err(|e| invalid(path, e.to_string()))?;
        debug!(
            "Parsed {}: {} special tokens, {} vocabulary entries, {} merges",
            path.display(),
            store.special_tokens.len(),
            store.vocab.len(),
            store.merges.len()
        );

        let export = store
            .into_export()
            .map_err(|e| invalid(path, e.to_string()))?;

        let report = export.validate();
        if let Some(id) = report.id_overlap.first() {
            return Err(invalid(
                path,
                format!("id {} appears in both special_tokens and vocab", id),
            ));
        }
        report.log_findings();

        info!("Loaded {} ({})", path.display(), export.stats());
        Ok(export)
    }
}

fn invalid(path: &Path, reason: String) -> ExportError {
    ExportError::SchemaInvalid {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MergeRule, MergeRules, TokenTable};
    use crate::io::save::StoreSaver;
    use tempfile::TempDir;

    #[test]
    fn test_missing_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cl100k_base_data.json");

        let err = StoreLoader::load(&path).unwrap_err();
        assert!(matches!(err, ExportError::SchemaMissing { .. }));
        assert!(err.to_string().contains("tikbake extract"));
    }

    #[test]
    fn test_unparsable_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{\"special_tokens\": {").unwrap();

        assert!(matches!(
            StoreLoader::load(&path),
            Err(ExportError::SchemaInvalid { .. })
        ));
    }

    #[test]
    fn test_undecodable_token_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"special_tokens":{},"vocab":{"%%%":0},"merges":[]}"#,
        )
        .unwrap();

        assert!(matches!(
            StoreLoader::load(&path),
            Err(ExportError::SchemaInvalid { .. })
        ));
    }

    #[test]
    fn test_id_overlap_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"special_tokens":{"PHw+":0},"vocab":{"YQ==":0},"merges":[]}"#,
        )
        .unwrap();

        let err = StoreLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("id 0"));
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        let mut special = TokenTable::new();
        special.add_token_with_id(b"<|endoftext|>", 3).unwrap();
        let mut vocab = TokenTable::new();
        vocab.add_token_with_id(&[0x00], 0).unwrap();
        vocab.add_token_with_id(&[0xff], 1).unwrap();
        vocab.add_token_with_id(&[0x00, 0xff], 2).unwrap();
        let merges: MergeRules = vec![MergeRule::new(vec![0x00], vec![0xff], 2)]
            .into_iter()
            .collect();
        let export = CanonicalExport::new(special, vocab, merges);

        StoreSaver::new(&export).save(&path).unwrap();
        let loaded = StoreLoader::load(&path).unwrap();

        assert_eq!(loaded.vocab().entries(), export.vocab().entries());
        assert_eq!(loaded.special_tokens().entries(), export.special_tokens().entries());
        assert_eq!(loaded.merges(), export.merges());
    }
}
