use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{DatabaseKind, Features};

use crate::{project::PyProject, py_file::PyFile};

fn app_path(base: &Path, file: &str) -> PathBuf {
    base.join("app").join(file)
}

/// `app/main.py`: the application factory and the uvicorn entry point.
pub struct MainPy<'a> {
    project: PyProject<'a>,
}

impl<'a> MainPy<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }

    /// Router modules in registration order: feature routes, then entities.
    fn routers(&self) -> (Vec<&'static str>, Vec<String>) {
        let features = self.project.features();
        let mut extra = Vec::new();
        if features.auth {
            extra.push("auth");
        }
        if features.file_storage {
            extra.push("uploads");
        }
        let entities = self
            .project
            .entities()
            .map(|(entity, _)| self.project.module(entity))
            .collect();
        (extra, entities)
    }
}

impl GeneratedFile for MainPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        app_path(base, "main.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let features = self.project.features();
        let (extra, entities) = self.routers();

        let mut file = PyFile::new()
            .doc("Application factory and entry point.")
            .import_module("logging")
            .import_module("uvicorn")
            .import("fastapi", "FastAPI")
            .import("sqlalchemy.orm", "sessionmaker")
            .import_all("app.config", ["Settings", "get_settings"])
            .import("app.database", "make_engine")
            .import("app.errors", "register_error_handlers")
            .import_all("app.routers", extra.iter().copied())
            .import_all("app.routers", entities.iter().map(String::as_str));

        let mut setup = String::new();
        if features.file_storage {
            file = file.import("app.storage", "LocalStorage");
            setup.push_str("    app.state.storage = LocalStorage(settings.upload_dir)\n");
        }
        setup.push_str("    register_error_handlers(app)\n");
        if features.rate_limit {
            file = file.import_all("app.rate_limit", ["RateLimitMiddleware", "RateLimiter"]);
            setup.push_str(
                "    app.add_middleware(\n        RateLimitMiddleware,\n        limiter=RateLimiter(settings.rate_limit_capacity, settings.rate_limit_refill_per_sec),\n    )\n",
            );
        }

        let mut include = String::new();
        for module in &extra {
            include.push_str(&format!("    app.include_router({module}.router)\n"));
        }
        if !entities.is_empty() {
            let mut modules = entities.join(", ");
            if entities.len() == 1 {
                modules.push(',');
            }
            include.push_str(&format!(
                "    for module in ({modules}):\n        app.include_router(module.router)\n"
            ));
        }

        file.raw(format!(
            r#"def create_app(settings: Settings | None = None) -> FastAPI:
    settings = settings or get_settings()
    engine = make_engine(settings.database_url)

    app = FastAPI(title="{title}")
    app.state.settings = settings
    app.state.engine = engine
    app.state.sessions = sessionmaker(engine, expire_on_commit=False)
{setup}
    @app.get("/health")
    def health() -> dict[str, str]:
        return {{"status": "ok"}}

{include}    return app"#,
            title = self.project.model.meta.pascal_name(),
        ))
        .raw(
            r#"def main() -> None:
    logging.basicConfig(
        level=logging.INFO,
        format="%(asctime)s %(levelname)s %(name)s %(message)s",
    )
    settings = get_settings()
    host, _, port = settings.addr.rpartition(":")
    uvicorn.run(create_app(settings), host=host or "0.0.0.0", port=int(port))"#,
        )
        .raw("if __name__ == \"__main__\":\n    main()")
        .render()
    }
}

/// `app/config.py`: pydantic-settings model of the environment.
pub struct ConfigPy {
    pub features: Features,
}

impl GeneratedFile for ConfigPy {
    fn path(&self, base: &Path) -> PathBuf {
        app_path(base, "config.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let mut fields = vec![
            "addr: str = \"0.0.0.0:8000\"",
            "database_url: str",
        ];
        if self.features.auth {
            fields.push("jwt_secret: str");
            fields.push("jwt_ttl_secs: int = 3600");
        }
        if self.features.rate_limit {
            fields.push("rate_limit_capacity: int = 100");
            fields.push("rate_limit_refill_per_sec: float = 10.0");
        }
        if self.features.file_storage {
            fields.push("upload_dir: str = \"uploads\"");
        }
        let fields: String = fields.iter().map(|f| format!("    {f}\n")).collect();

        PyFile::new()
            .doc("Settings read from the environment and `.env`.")
            .import("functools", "lru_cache")
            .import_all("pydantic_settings", ["BaseSettings", "SettingsConfigDict"])
            .raw(format!(
                "class Settings(BaseSettings):\n    model_config = SettingsConfigDict(env_file=\".env\", extra=\"ignore\")\n\n{fields}"
            ))
            .raw("@lru_cache\ndef get_settings() -> Settings:\n    return Settings()")
            .render()
    }
}

/// `app/database.py`: declarative base, engine construction and the
/// per-request session dependency.
pub struct DatabasePy {
    pub database: DatabaseKind,
}

impl DatabasePy {
    fn engine_url(&self) -> &'static str {
        match self.database {
            DatabaseKind::Postgres => {
                r#"def engine_url(url: str) -> str:
    """Point a plain connection URL at the psycopg driver."""
    for scheme in ("postgres://", "postgresql://"):
        if url.startswith(scheme):
            return "postgresql+psycopg://" + url.removeprefix(scheme)
    return url"#
            }
            DatabaseKind::Mysql => {
                r#"def engine_url(url: str) -> str:
    """Point a plain connection URL at the PyMySQL driver."""
    if url.startswith("mysql://"):
        return "mysql+pymysql://" + url.removeprefix("mysql://")
    return url"#
            }
            DatabaseKind::Sqlite => {
                r#"def engine_url(url: str) -> str:
    """Accept `sqlite://file.db` as a path relative to the working directory."""
    if url.startswith("sqlite://") and not url.startswith("sqlite:///"):
        return "sqlite:///" + url.removeprefix("sqlite://")
    return url"#
            }
        }
    }

    fn make_engine(&self) -> &'static str {
        match self.database {
            DatabaseKind::Sqlite => {
                r#"def make_engine(url: str) -> Engine:
    engine = create_engine(engine_url(url), connect_args={"check_same_thread": False})

    @event.listens_for(engine, "connect")
    def enable_foreign_keys(connection, _record) -> None:
        cursor = connection.cursor()
        cursor.execute("PRAGMA foreign_keys = ON")
        cursor.close()

    return engine"#
            }
            _ => {
                r#"def make_engine(url: str) -> Engine:
    return create_engine(engine_url(url), pool_pre_ping=True)"#
            }
        }
    }
}

impl GeneratedFile for DatabasePy {
    fn path(&self, base: &Path) -> PathBuf {
        app_path(base, "database.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let mut file = PyFile::new()
            .doc("Engine and session setup.")
            .import("collections.abc", "Iterator")
            .import("fastapi", "Request")
            .import_all("sqlalchemy", ["Engine", "create_engine"])
            .import_all("sqlalchemy.orm", ["DeclarativeBase", "Session"]);
        if self.database == DatabaseKind::Sqlite {
            file = file.import("sqlalchemy", "event");
        }
        file.raw("class Base(DeclarativeBase):\n    pass")
            .raw(self.engine_url())
            .raw(self.make_engine())
            .raw(
                r#"def get_session(request: Request) -> Iterator[Session]:
    with request.app.state.sessions() as session:
        yield session"#,
            )
            .render()
    }
}

/// `app/errors.py`: the API error type and the exception handlers that
/// render every failure as `{"error": message}`.
pub struct ErrorsPy {
    pub database: DatabaseKind,
}

impl ErrorsPy {
    fn classify(&self) -> &'static str {
        match self.database {
            DatabaseKind::Postgres => {
                r#"def classify(error: IntegrityError) -> ApiError:
    code = getattr(error.orig, "sqlstate", None)
    if code == "23505":
        return ApiError.conflict("a row with this value already exists")
    if code in ("23503", "23502", "23514"):
        return ApiError.unprocessable(str(error.orig).splitlines()[0])
    raise error"#
            }
            DatabaseKind::Mysql => {
                r#"def classify(error: IntegrityError) -> ApiError:
    code = error.orig.args[0] if error.orig is not None and error.orig.args else None
    if code == 1062:
        return ApiError.conflict("a row with this value already exists")
    if code in (1048, 1451, 1452):
        return ApiError.unprocessable(str(error.orig.args[-1]))
    raise error"#
            }
            DatabaseKind::Sqlite => {
                r#"def classify(error: IntegrityError) -> ApiError:
    message = str(error.orig)
    if message.startswith("UNIQUE constraint failed"):
        return ApiError.conflict("a row with this value already exists")
    return ApiError.unprocessable(message)"#
            }
        }
    }
}

impl GeneratedFile for ErrorsPy {
    fn path(&self, base: &Path) -> PathBuf {
        app_path(base, "errors.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        PyFile::new()
            .doc("API errors and the handlers that render them.")
            .import_module("logging")
            .import_all("fastapi", ["FastAPI", "Request"])
            .import("fastapi.exceptions", "RequestValidationError")
            .import("fastapi.responses", "JSONResponse")
            .import("sqlalchemy.exc", "IntegrityError")
            .raw("logger = logging.getLogger(__name__)")
            .raw(
                r#"class ApiError(Exception):
    """A failure with the HTTP status it maps to."""

    def __init__(self, status: int, message: str) -> None:
        super().__init__(message)
        self.status = status
        self.message = message

    @classmethod
    def bad_request(cls, message: str) -> "ApiError":
        return cls(400, message)

    @classmethod
    def unauthorized(cls, message: str = "unauthorized") -> "ApiError":
        return cls(401, message)

    @classmethod
    def not_found(cls, message: str) -> "ApiError":
        return cls(404, message)

    @classmethod
    def conflict(cls, message: str) -> "ApiError":
        return cls(409, message)

    @classmethod
    def unprocessable(cls, message: str) -> "ApiError":
        return cls(422, message)"#,
            )
            .raw(self.classify())
            .raw(
                r#"def _error(status: int, message: str) -> JSONResponse:
    return JSONResponse(status_code=status, content={"error": message})"#,
            )
            .raw(
                r#"def register_error_handlers(app: FastAPI) -> None:
    @app.exception_handler(ApiError)
    async def api_error(_request: Request, error: ApiError) -> JSONResponse:
        return _error(error.status, error.message)

    @app.exception_handler(IntegrityError)
    async def integrity_error(_request: Request, error: IntegrityError) -> JSONResponse:
        failure = classify(error)
        logger.info("constraint violation: %s", failure.message)
        return _error(failure.status, failure.message)

    @app.exception_handler(RequestValidationError)
    async def validation_error(_request: Request, error: RequestValidationError) -> JSONResponse:
        first = error.errors()[0] if error.errors() else {}
        location = ".".join(str(part) for part in first.get("loc", ()) if part != "body")
        message = first.get("msg", "invalid request")
        return _error(400, f"{location}: {message}" if location else message)"#,
            )
            .render()
    }
}

/// `app/pagination.py`: the `limit`/`offset` dependency of list routes.
pub struct PaginationPy;

impl GeneratedFile for PaginationPy {
    fn path(&self, base: &Path) -> PathBuf {
        app_path(base, "pagination.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        PyFile::new()
            .doc("Limit/offset query parameters shared by list routes.")
            .import("dataclasses", "dataclass")
            .import("typing", "Annotated")
            .import_all("fastapi", ["Depends", "Query"])
            .raw("DEFAULT_LIMIT = 20\nMAX_LIMIT = 100")
            .raw("@dataclass(frozen=True)\nclass Page:\n    limit: int\n    offset: int")
            .raw(
                r#"def pagination(
    limit: Annotated[int, Query(ge=1)] = DEFAULT_LIMIT,
    offset: Annotated[int, Query(ge=0)] = 0,
) -> Page:
    return Page(limit=min(limit, MAX_LIMIT), offset=offset)"#,
            )
            .raw("Paging = Annotated[Page, Depends(pagination)]")
            .render()
    }
}
