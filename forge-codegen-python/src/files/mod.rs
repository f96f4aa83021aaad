mod app_py;
mod auth_py;
mod config_files;
mod mapper_py;
mod model_py;
mod rate_limit_py;
mod repository_py;
mod router_py;
mod schema_py;
mod service_py;
mod storage_py;
mod test_files;

pub use app_py::{ConfigPy, DatabasePy, ErrorsPy, MainPy, PaginationPy};
pub use auth_py::{AuthPy, AuthRouterPy};
pub use config_files::{EnvExample, GitIgnore, PackageInit, PyProjectToml};
pub use mapper_py::MapperPy;
pub use model_py::{JunctionsPy, ModelPy};
pub use rate_limit_py::RateLimitPy;
pub use repository_py::RepositoryPy;
pub use router_py::RouterPy;
pub use schema_py::SchemaPy;
pub use service_py::ServicePy;
pub use storage_py::{StoragePy, UploadsPy};
pub use test_files::{ConftestPy, EntityTestPy, HelpersPy};
