//! Compilation pipeline for code generation.
//!
//! The [`Pipeline`] turns a project configuration and a parsed schema into a
//! [`CompilationContext`] that generators consume:
//!
//! - Explicit phase boundaries (validate → lower → analyze)
//! - Plugin hooks before/after each phase
//! - Unified diagnostics collection
//!
//! # Example
//!
//! ```ignore
//! use crudforge_codegen::pipeline::Pipeline;
//!
//! let ctx = Pipeline::for_target(config.generate.target).run(config, schema)?;
//! for diag in ctx.warnings() {
//!     eprintln!("{}", diag);
//! }
//! let generator = RustGenerator::from_context(ctx)?;
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};
