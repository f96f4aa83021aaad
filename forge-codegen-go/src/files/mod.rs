mod app_go;
mod auth_go;
mod config_files;
mod handler_go;
mod http;
mod model_go;
mod rate_limit_go;
mod repository_go;
mod router_go;
mod service_go;
mod storage_go;
mod test_files;

pub use app_go::{ApiErrGo, ConfigGo, DbGo, MainGo, RespondGo};
pub use auth_go::{AuthGo, AuthHandlerGo, AuthStoreGo};
pub use config_files::{EnvExample, GitIgnore, GoMod};
pub use handler_go::HandlerGo;
pub use model_go::{MapperGo, ModelGo};
pub use rate_limit_go::RateLimitGo;
pub use repository_go::{RepositoryBaseGo, RepositoryGo};
pub use router_go::RouterGo;
pub use service_go::ServiceGo;
pub use storage_go::{StorageGo, UploadsGo};
pub use test_files::{EntityTestGo, TestHelpersGo};
