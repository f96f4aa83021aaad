//! Java (Spring Boot + JPA) target for crudforge.
//!
//! [`Generator`] emits a Maven project with one package per entity holding
//! the JPA entity, request and response records, mapper, Spring Data
//! repository, service stub and REST controller. Shared error handling,
//! paging, MockMvc tests and the optional security, rate limiting and upload
//! packages sit beside them.

mod generator;
mod java_file;
mod project;
mod type_mapper;

pub mod files;

pub use crudforge_codegen::{GenerateResult, LanguageCodegen, PreviewFile};
pub use generator::Generator;
pub use java_file::{JavaFile, java_literal, quote, render_imports};
pub use project::JavaProject;
pub use type_mapper::JavaTypeMapper;
