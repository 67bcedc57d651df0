//! Saving the canonical store.

use super::atomic::write_atomic;
use super::format::CanonicalStore;
use crate::core::CanonicalExport;
use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Canonical store saver.
pub struct StoreSaver<'a> {
    export: &'a CanonicalExport,
}

impl<'a> StoreSaver<'a> {
    pub fn new(export: &'a CanonicalExport) -> Self {
        Self { export }
    }

    /// Serialize the export to `path` as compact JSON.
    ///
    /// The write goes through a temporary file, so a failure leaves any
    /// previous store untouched.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_json()?;
        write_atomic(path, contents.as_bytes())?;

        info!("Wrote canonical store to {}", path.display());
        Ok(())
    }

    /// Serialize without touching the filesystem.
    pub fn to_json(&self) -> Result<String> {
        let store = CanonicalStore::from_export(self.export);
        Ok(serde_json::to_string(&store)?)
    }
}
