//! C header rendering.
//!
//! Every table becomes a struct typedef, a count macro and a static array
//! initialized in stored order. C has no zero-length array literal, so an
//! empty table is emitted as a one-element array of NULL/0 sentinels while
//! its count macro stays `0`. Consumers must iterate up to the count macro,
//! never `sizeof(array) / sizeof(array[0])`.

use crate::config::HeaderConfig;
use std::fmt::{self, Display};
use std::path::Path;
use tikbake_core::{
    encode_token, write_atomic, CanonicalExport, ExportStats, Result, StoreLoader, TokenTable,
};
use tracing::info;

const TOKEN_FIELDS: &[&str] = &[
    "const char* token_b64;  // Base64 encoded token bytes",
    "int id;                 // Token ID",
];

const MERGE_FIELDS: &[&str] = &[
    "const char* first_b64;  // Base64 encoded first piece",
    "const char* second_b64; // Base64 encoded second piece",
    "int rank;               // Merge rank (lower = higher priority)",
];

/// Names and layout of one emitted table.
struct TableShape<'a> {
    type_name: String,
    array_name: String,
    count_macro: String,
    fields: &'a [&'a str],
    sentinel: &'a str,
}

/// Renders canonical exports as C headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderGenerator {
    config: HeaderConfig,
}

impl HeaderGenerator {
    pub fn new(config: HeaderConfig) -> Self {
        Self { config }
    }

    /// Render the complete header text. Output depends only on `export`
    /// and the configuration.
    pub fn render(&self, export: &CanonicalExport) -> String {
        HeaderView {
            config: &self.config,
            export,
        }
        .to_string()
    }

    /// Load the store at `input`, render it and write the header to `output`.
    ///
    /// The output is replaced atomically; a failed run leaves any previous
    /// header untouched.
    pub fn generate(&self, input: &Path, output: &Path) -> Result<ExportStats> {
        let export = StoreLoader::load(input)?;
        let stats = export.stats();

        let header = self.render(&export);
        write_atomic(output, header.as_bytes())?;

        info!("Generated C header file at {}", output.display());
        info!("Wrote {}", stats);
        Ok(stats)
    }
}

/// Display adapter over one export.
struct HeaderView<'a> {
    config: &'a HeaderConfig,
    export: &'a CanonicalExport,
}

impl HeaderView<'_> {
    fn shape(
        &self,
        type_suffix: &str,
        array_suffix: &str,
        count_suffix: &str,
    ) -> TableShape<'static> {
        let prefix = &self.config.symbol_prefix;
        TableShape {
            type_name: format!("{}_{}_t", prefix, type_suffix),
            array_name: format!("{}_{}", prefix, array_suffix),
            count_macro: format!("{}_{}", self.config.macro_prefix(), count_suffix),
            fields: TOKEN_FIELDS,
            sentinel: "{NULL, 0}",
        }
    }

    fn token_rows(table: &TokenTable) -> impl Iterator<Item = String> + '_ {
        table
            .iter()
            .map(|entry| format!("{{\"{}\", {}}}", encode_token(&entry.bytes), entry.id))
    }
}

impl Display for HeaderView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.config.include_guard();

        writeln!(f, "// Auto-generated from {}", self.config.provenance)?;
        writeln!(f, "// DO NOT EDIT MANUALLY")?;
        writeln!(f)?;
        writeln!(f, "#ifndef {}", guard)?;
        writeln!(f, "#define {}", guard)?;
        writeln!(f)?;
        writeln!(f, "#include <stddef.h>")?;
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f)?;

        let special = self.export.special_tokens();
        write_table(
            f,
            &self.shape("special_token", "special_tokens", "NUM_SPECIAL_TOKENS"),
            special.len(),
            Self::token_rows(special),
        )?;

        let vocab = self.export.vocab();
        write_table(
            f,
            &self.shape("vocab_entry", "vocab", "VOCAB_SIZE"),
            vocab.len(),
            Self::token_rows(vocab),
        )?;

        let merges = self.export.merges();
        let merge_shape = TableShape {
            fields: MERGE_FIELDS,
            sentinel: "{NULL, NULL, 0}",
            ..self.shape("bpe_merge", "bpe_merges", "NUM_MERGES")
        };
        write_table(
            f,
            &merge_shape,
            merges.len(),
            merges.iter().map(|rule| {
                format!(
                    "{{\"{}\", \"{}\", {}}}",
                    encode_token(&rule.first),
                    encode_token(&rule.second),
                    rule.rank
                )
            }),
        )?;

        writeln!(f, "#endif /* {} */", guard)
    }
}

fn write_table(
    f: &mut fmt::Formatter<'_>,
    shape: &TableShape<'_>,
    count: usize,
    rows: impl Iterator<Item = String>,
) -> fmt::Result {
    writeln!(f, "typedef struct {{")?;
    for field in shape.fields {
        writeln!(f, "    {}", field)?;
    }
    writeln!(f, "}} {};", shape.type_name)?;
    writeln!(f)?;

    writeln!(f, "#define {} {}", shape.count_macro, count)?;
    writeln!(f)?;

    if count == 0 {
        writeln!(
            f,
            "// Zero-length arrays are not valid C; iterate up to {} only.",
            shape.count_macro
        )?;
        writeln!(f, "static const {} {}[1] = {{", shape.type_name, shape.array_name)?;
        writeln!(f, "    {},", shape.sentinel)?;
    } else {
        writeln!(
            f,
            "static const {} {}[{}] = {{",
            shape.type_name, shape.array_name, shape.count_macro
        )?;
        for row in rows {
            writeln!(f, "    {},", row)?;
        }
    }
    writeln!(f, "}};")?;
    writeln!(f)
}
