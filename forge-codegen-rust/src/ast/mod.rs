//! Rust syntax nodes rendered through [`CodeBuilder`](crudforge_codegen::CodeBuilder).

mod fns;
mod structs;

pub use fns::{Fn, Param};
pub use structs::{Field, Struct};
