mod auth_rs;
mod cargo_toml;
mod config_rs;
mod db_rs;
mod env_example;
mod error_rs;
mod gitignore;
mod handler_rs;
mod handlers_mod;
mod lib_rs;
mod main_rs;
mod mod_rs;
mod model_rs;
mod rate_limit_rs;
mod repository_rs;
mod routes_rs;
mod service_stub;
mod state_rs;
mod storage_rs;
mod test_files;

pub use auth_rs::{AuthHandlers, AuthMod};
pub use cargo_toml::CargoToml;
pub use config_rs::ConfigRs;
pub use db_rs::DbRs;
pub use env_example::EnvExample;
pub use error_rs::ErrorRs;
pub use gitignore::GitIgnore;
pub use handler_rs::HandlerRs;
pub use handlers_mod::HandlersMod;
pub use lib_rs::LibRs;
pub use main_rs::MainRs;
pub use mod_rs::ModRs;
pub use model_rs::ModelRs;
pub use rate_limit_rs::RateLimitRs;
pub use repository_rs::RepositoryRs;
pub use routes_rs::RoutesRs;
pub use service_stub::ServiceStub;
pub use state_rs::StateRs;
pub use storage_rs::{StorageRs, UploadsRs};
pub use test_files::{EntityApiTest, TestCommon};
