use std::path::{Path, PathBuf};

use crudforge_codegen::{CredentialStore, SqlDialect};
use crudforge_core::{FileRules, GeneratedFile};

use crate::{
    project::PyProject,
    py_file::{PyFile, quote},
};

/// `app/auth.py`: password hashing, JWT issue/verify and the `require_user`
/// dependency guarding mutating routes.
pub struct AuthPy;

impl GeneratedFile for AuthPy {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app").join("auth.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        PyFile::new()
            .doc("Password hashing, bearer tokens and the guard on mutating routes.")
            .import_module("datetime")
            .import("typing", "Annotated")
            .import_module("bcrypt")
            .import_all("fastapi", ["Depends", "Request"])
            .import_all("fastapi.security", ["HTTPAuthorizationCredentials", "HTTPBearer"])
            .import_all("jose", ["JWTError", "jwt"])
            .import("app.errors", "ApiError")
            .raw("ALGORITHM = \"HS256\"\n\nbearer = HTTPBearer(auto_error=False)")
            .raw(
                r#"def hash_password(password: str) -> str:
    return bcrypt.hashpw(password.encode(), bcrypt.gensalt()).decode()"#,
            )
            .raw(
                r#"def check_password(password: str, hashed: str) -> bool:
    try:
        return bcrypt.checkpw(password.encode(), hashed.encode())
    except ValueError:
        return False"#,
            )
            .raw(
                r#"def issue_token(secret: str, ttl_secs: int, subject: str) -> str:
    now = datetime.datetime.now(datetime.timezone.utc)
    claims = {
        "sub": subject,
        "iat": now,
        "exp": now + datetime.timedelta(seconds=ttl_secs),
    }
    return jwt.encode(claims, secret, algorithm=ALGORITHM)"#,
            )
            .raw(
                r#"def verify_token(secret: str, token: str) -> str:
    """Return the subject of a valid token."""
    try:
        claims = jwt.decode(token, secret, algorithms=[ALGORITHM])
    except JWTError as error:
        raise ApiError.unauthorized("invalid token") from error
    subject = claims.get("sub")
    if not subject:
        raise ApiError.unauthorized("invalid token")
    return str(subject)"#,
            )
            .raw(
                r#"def require_user(
    request: Request,
    credentials: Annotated[HTTPAuthorizationCredentials | None, Depends(bearer)],
) -> str:
    if credentials is None:
        raise ApiError.unauthorized("missing bearer token")
    return verify_token(request.app.state.settings.jwt_secret, credentials.credentials)"#,
            )
            .render()
    }
}

/// `app/routers/auth.py`: register and login.
pub struct AuthRouterPy<'a> {
    project: PyProject<'a>,
}

impl<'a> AuthRouterPy<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }

    /// Register and lookup through the ORM model of the credential entity.
    fn orm_store(&self, file: &mut PyFile, store: &CredentialStore<'_>) -> Option<String> {
        let entity = store.entity?;
        let imports = file.imports_mut();
        imports.add(&format!("app.models.{}", self.project.module(entity)), &entity.name);
        imports.add("sqlalchemy", "select");

        let name = &entity.name;
        let id = self.project.attr_of(&store.id_column);
        let email = self.project.attr_of(&store.email_column);
        let password = self.project.attr_of(&store.password_column);
        Some(format!(
            r#"def register_user(session: Session, email: str, hashed: str) -> str:
    """Store a new user and return its id. A taken email fails with the
    database's unique violation."""
    row = {name}({email}=email, {password}=hashed)
    session.add(row)
    session.commit()
    session.refresh(row)
    return str(row.{id})


def find_user(session: Session, email: str) -> tuple[str, str] | None:
    """The id and password hash registered for an email."""
    row = session.scalars(select({name}).where({name}.{email} == email)).first()
    if row is None:
        return None
    return str(row.{id}), row.{password} or """#
        ))
    }

    /// Register and lookup with plain SQL against the assumed table.
    fn sql_store(&self, file: &mut PyFile, store: &CredentialStore<'_>) -> String {
        file.imports_mut().add("sqlalchemy", "text");
        let dialect = SqlDialect::new(self.project.model.meta.database);
        let table = dialect.ident(&store.table);
        let id = dialect.ident(&store.id_column);
        let email = dialect.ident(&store.email_column);
        let password = dialect.ident(&store.password_column);
        let insert = format!("INSERT INTO {table} ({email}, {password}) VALUES (:email, :hashed)");
        let select = format!("SELECT {id}, {password} FROM {table} WHERE {email} = :email");

        format!(
            r#"# The schema declares no credential table, so {table} ({id} PRIMARY KEY,
# {email} UNIQUE, {password}) must exist.
INSERT_USER = text({insert})
FIND_USER = text({select})


def find_user(session: Session, email: str) -> tuple[str, str] | None:
    """The id and password hash registered for an email."""
    row = session.execute(FIND_USER, {{"email": email}}).first()
    if row is None:
        return None
    return str(row[0]), row[1] or ""


def register_user(session: Session, email: str, hashed: str) -> str:
    """Store a new user and return its id. A taken email fails with the
    database's unique violation."""
    session.execute(INSERT_USER, {{"email": email, "hashed": hashed}})
    session.commit()
    found = find_user(session, email)
    if found is None:
        raise RuntimeError("registered user not found")
    return found[0]"#,
            insert = quote(&insert),
            select = quote(&select),
        )
    }
}

impl GeneratedFile for AuthRouterPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("app").join("routers").join("auth.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let store = CredentialStore::resolve(self.project.model);
        let mut file = PyFile::new()
            .doc("Register and login.")
            .import("typing", "Annotated")
            .import_all("fastapi", ["APIRouter", "Depends", "Request", "status"])
            .import("pydantic", "BaseModel")
            .import("sqlalchemy.orm", "Session")
            .import_all("app.auth", ["check_password", "hash_password", "issue_token"])
            .import("app.database", "get_session")
            .import("app.errors", "ApiError");
        let store_code = match self.orm_store(&mut file, &store) {
            Some(code) => code,
            None => self.sql_store(&mut file, &store),
        };

        file.raw("router = APIRouter(prefix=\"/auth\", tags=[\"auth\"])\n\nDb = Annotated[Session, Depends(get_session)]")
            .raw("class Credentials(BaseModel):\n    email: str\n    password: str")
            .raw("class TokenResponse(BaseModel):\n    access_token: str\n    token_type: str = \"Bearer\"")
            .raw(store_code)
            .raw(
                r#"def reply(request: Request, subject: str) -> TokenResponse:
    settings = request.app.state.settings
    return TokenResponse(access_token=issue_token(settings.jwt_secret, settings.jwt_ttl_secs, subject))"#,
            )
            .raw(
                r#"@router.post("/register", status_code=status.HTTP_201_CREATED)
def register(body: Credentials, request: Request, session: Db) -> TokenResponse:
    if "@" not in body.email or len(body.password) < 8:
        raise ApiError.bad_request(
            "a valid email and a password of at least 8 characters are required"
        )
    subject = register_user(session, body.email, hash_password(body.password))
    return reply(request, subject)"#,
            )
            .raw(
                r#"@router.post("/login")
def login(body: Credentials, request: Request, session: Db) -> TokenResponse:
    found = find_user(session, body.email)
    if found is None or not check_password(body.password, found[1]):
        raise ApiError.unauthorized("invalid email or password")
    return reply(request, found[0])"#,
            )
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_token_helpers() {
        let out = AuthPy.render();
        assert!(out.contains("from jose import JWTError, jwt\n"));
        assert!(out.contains("bearer = HTTPBearer(auto_error=False)\n"));
        assert!(out.contains("        raise ApiError.unauthorized(\"missing bearer token\")\n"));
    }

    #[test]
    fn test_declared_user_entity_is_the_store() {
        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = AuthRouterPy::new(PyProject::new(&model, &computed)).render();

        assert!(out.contains("from app.models.user import User\n"));
        assert!(out.contains("    row = User(email=email, password_hash=hashed)\n"));
        assert!(out.contains("@router.post(\"/register\", status_code=status.HTTP_201_CREATED)\n"));
        assert!(!out.contains("INSERT_USER"));
    }

    #[test]
    fn test_assumed_table_uses_sql() {
        let ctx = compile_sql_with(PRODUCT_SQL, Target::PythonFastapi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = AuthRouterPy::new(PyProject::new(&model, &computed)).render();

        assert!(out.contains(
            "INSERT_USER = text(\"INSERT INTO users (email, password_hash) VALUES (:email, :hashed)\")\n"
        ));
        assert!(out.contains("FIND_USER = text(\"SELECT id, password_hash FROM users WHERE email = :email\")\n"));
    }
}
