mod app_ts;
mod auth_ts;
mod common_ts;
mod config_ts;
mod controller_ts;
mod dto_ts;
mod entity_ts;
mod env_example;
mod gitignore;
mod mapper_ts;
mod module_ts;
mod package_json;
mod rate_limit_ts;
mod repository_ts;
mod service_ts;
mod storage_ts;
mod test_files;
mod tsconfig;

pub use app_ts::{AppModuleTs, AppSetupTs, MainTs};
pub use auth_ts::{AuthControllerTs, AuthModuleTs, AuthServiceTs, CredentialsDtoTs, JwtGuardTs, PasswordTs};
pub use common_ts::{MappingTs, PaginationTs, QueryFailedFilterTs, TransformersTs};
pub use config_ts::{ConfigTs, DatabaseTs};
pub use controller_ts::ControllerTs;
pub use dto_ts::{DtoKind, RequestDtoTs, ResponseDtoTs};
pub use entity_ts::EntityTs;
pub use env_example::EnvExample;
pub use gitignore::GitIgnore;
pub use mapper_ts::MapperTs;
pub use module_ts::ModuleTs;
pub use package_json::PackageJson;
pub use rate_limit_ts::{ThrottleGuardTs, TokenBucketTs};
pub use repository_ts::{RepositoryTs, relation_methods};
pub use service_ts::ServiceTs;
pub use storage_ts::{StorageModuleTs, StorageTs, UploadsControllerTs};
pub use test_files::{EntityE2eTest, JestConfig, TestHelpers};
pub use tsconfig::TsConfig;
