//! Header generator configuration.

use tikbake_core::{ExportError, Result};

/// Naming and provenance of a generated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConfig {
    /// Lowercase prefix of every type and array name, e.g. `tiktoken`
    pub symbol_prefix: String,
    /// Include guard macro; `<PREFIX>_DATA_H` when unset
    pub include_guard: Option<String>,
    /// What the data was generated from, shown in the banner
    pub provenance: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            symbol_prefix: "tiktoken".to_string(),
            include_guard: None,
            provenance: "OpenAI's tiktoken library".to_string(),
        }
    }
}

impl HeaderConfig {
    pub fn builder() -> HeaderConfigBuilder {
        HeaderConfigBuilder::new()
    }

    /// Uppercase prefix used by macros.
    pub fn macro_prefix(&self) -> String {
        self.symbol_prefix.to_ascii_uppercase()
    }

    pub fn include_guard(&self) -> String {
        self.include_guard
            .clone()
            .unwrap_or_else(|| format!("{}_DATA_H", self.macro_prefix()))
    }
}

/// Builder for [`HeaderConfig`].
#[derive(Clone, Default)]
pub struct HeaderConfigBuilder {
    config: HeaderConfig,
}

impl HeaderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.symbol_prefix = prefix.into();
        self
    }

    pub fn include_guard(mut self, guard: impl Into<String>) -> Self {
        self.config.include_guard = Some(guard.into());
        self
    }

    pub fn provenance(mut self, provenance: impl Into<String>) -> Self {
        self.config.provenance = provenance.into();
        self
    }

    /// Validate names before anything is rendered.
    pub fn build(self) -> Result<HeaderConfig> {
        if !is_c_identifier(&self.config.symbol_prefix) {
            return Err(ExportError::InvalidConfig(format!(
                "symbol prefix '{}' is not a C identifier",
                self.config.symbol_prefix
            )));
        }
        if let Some(guard) = &self.config.include_guard {
            if !is_c_identifier(guard) {
                return Err(ExportError::InvalidConfig(format!(
                    "include guard '{}' is not a C identifier",
                    guard
                )));
            }
        }
        if self.config.provenance.contains(['\n', '\r']) {
            return Err(ExportError::InvalidConfig(
                "banner provenance must fit on one line".to_string(),
            ));
        }
        Ok(self.config)
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
