//! Persistence for the canonical store and generated artifacts.
//!
//! The canonical store is the JSON snapshot that decouples extraction from
//! header generation. Every artifact, the store included, is written through
//! [`write_atomic`] so a failed run never leaves a half-written file.

pub mod atomic;
pub mod format;
pub mod load;
pub mod save;

pub use atomic::write_atomic;
pub use format::{CanonicalStore, StoredMerge};
pub use load::StoreLoader;
pub use save::StoreSaver;
