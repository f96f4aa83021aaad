mod auth_java;
mod build_files;
mod common_java;
mod controller_java;
mod dto_java;
mod entity_java;
mod mapper_java;
mod rate_limit_java;
mod repository_java;
mod service_java;
mod storage_java;
mod test_files;

pub use auth_java::{
    AuthControllerJava, JwtFilterJava, SecurityConfigJava, TokenServiceJava, UserAccountsJava,
};
pub use build_files::{ApplicationYml, EnvExample, GitIgnore, PomXml};
pub use common_java::{
    ApiExceptionJava, AppPropertiesJava, ApplicationJava, ErrorHandlerJava, HealthControllerJava,
    OffsetPageJava, PagingJava,
};
pub use controller_java::ControllerJava;
pub use dto_java::{DtoJava, DtoKind};
pub use entity_java::EntityJava;
pub use mapper_java::MapperJava;
pub use rate_limit_java::RateLimitFilterJava;
pub use repository_java::RepositoryJava;
pub use service_java::ServiceJava;
pub use storage_java::{StorageJava, UploadControllerJava};
pub use test_files::{ApiTestSupportJava, EntityTestJava};
