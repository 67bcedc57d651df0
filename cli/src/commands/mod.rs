//! CLI commands for tikbake.

pub mod extract;
pub mod header;

pub use extract::ExtractCommand;
pub use header::HeaderCommand;
