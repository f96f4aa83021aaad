//! TypeScript AST builders for classes and their members.
//!
//! Nest code is decorator-heavy; these nodes keep decorators attached to
//! the member they annotate and render via CodeBuilder.

mod class;

pub use class::{Class, Method, Property};
