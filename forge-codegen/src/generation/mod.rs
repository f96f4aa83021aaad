//! Code generation outputs and file management.
//!
//! - [`FileRegistry`] - Declarative file registration and writing
//! - [`ImportCollector`] - Import tracking and deduplication
//! - [`DependencyCollector`] - Package dependency tracking
//! - [`find_orphans`] - Detection of generated files no longer produced
//! - [`samples`] - Request payloads for generated API tests

mod imports;
mod orphans;
mod registry;
pub mod samples;

pub use imports::{DependencyCollector, DependencyKind, DependencySpec, ImportCollector};
pub use orphans::{Orphan, find_orphans, remove_empty_dirs};
pub use registry::{FileCategory, FileEntry, FileRegistry, WriteStats};
