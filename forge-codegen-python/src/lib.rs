//! Python (FastAPI + SQLAlchemy) target for crudforge.
//!
//! [`Generator`] emits an `app` package with one module per entity in each
//! layer (SQLAlchemy model, pydantic schemas, mapper, repository, service
//! stub and APIRouter), the application factory, pytest suites, and the
//! optional auth, rate limiting and upload modules.

mod generator;
mod project;
mod py_file;
mod type_mapper;

pub mod files;

pub use crudforge_codegen::{GenerateResult, LanguageCodegen, PreviewFile};
pub use generator::Generator;
pub use project::PyProject;
pub use py_file::{PyFile, py_literal, quote, render_imports};
pub use type_mapper::PythonTypeMapper;
