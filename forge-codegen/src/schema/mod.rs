//! Model analysis and display.
//!
//! - [`ComputedData`] - Pre-computed analysis of the domain model
//! - [`CredentialStore`] - Table backing generated authentication
//! - [`EntityTreeDisplay`] - Declarative entity/relation tree formatting

mod computed;
mod credentials;
mod display;

pub use computed::ComputedData;
pub use credentials::CredentialStore;
pub use display::{DisplayStyle, EntityTreeDisplay};
