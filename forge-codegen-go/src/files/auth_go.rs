use std::path::{Path, PathBuf};

use crudforge_codegen::CredentialStore;
use crudforge_core::{FileRules, GeneratedFile};

use crate::{
    go_file::{GoFile, GoFunc, quote},
    project::{Flavor, GoProject},
};

const TOKENS: &str = r#"// Tokens issues and verifies HS256 access tokens.
type Tokens struct {
	secret []byte
	ttl    time.Duration
}

func NewTokens(secret string, ttl time.Duration) *Tokens {
	return &Tokens{secret: []byte(secret), ttl: ttl}
}

// Issue signs a token whose subject is the user id.
func (t *Tokens) Issue(subject string) (string, error) {
	now := time.Now()
	claims := jwt.RegisteredClaims{
		Subject:   subject,
		IssuedAt:  jwt.NewNumericDate(now),
		ExpiresAt: jwt.NewNumericDate(now.Add(t.ttl)),
	}
	return jwt.NewWithClaims(jwt.SigningMethodHS256, claims).SignedString(t.secret)
}

// Verify returns the subject of a valid, unexpired token.
func (t *Tokens) Verify(token string) (string, error) {
	claims := &jwt.RegisteredClaims{}
	_, err := jwt.ParseWithClaims(token, claims, func(*jwt.Token) (any, error) {
		return t.secret, nil
	}, jwt.WithValidMethods([]string{jwt.SigningMethodHS256.Alg()}))
	if err != nil {
		return "", err
	}
	return claims.Subject, nil
}

func bearer(header string) (string, bool) {
	token, ok := strings.CutPrefix(header, "Bearer ")
	return token, ok && token != ""
}

func HashPassword(password string) (string, error) {
	hash, err := bcrypt.GenerateFromPassword([]byte(password), bcrypt.DefaultCost)
	return string(hash), err
}

func CheckPassword(hash, password string) bool {
	return bcrypt.CompareHashAndPassword([]byte(hash), []byte(password)) == nil
}"#;

const GIN_MIDDLEWARE: &str = r#"// SubjectKey is the gin context key holding the authenticated user id.
const SubjectKey = "auth.subject"

// Middleware rejects requests without a valid bearer token.
func (t *Tokens) Middleware() gin.HandlerFunc {
	return func(c *gin.Context) {
		token, ok := bearer(c.GetHeader("Authorization"))
		if !ok {
			c.AbortWithStatusJSON(http.StatusUnauthorized, gin.H{"error": "missing bearer token"})
			return
		}
		subject, err := t.Verify(token)
		if err != nil {
			c.AbortWithStatusJSON(http.StatusUnauthorized, gin.H{"error": "invalid token"})
			return
		}
		c.Set(SubjectKey, subject)
		c.Next()
	}
}"#;

const CHI_MIDDLEWARE: &str = r#"type subjectKey struct{}

// Middleware rejects requests without a valid bearer token.
func (t *Tokens) Middleware(next http.Handler) http.Handler {
	return http.HandlerFunc(func(w http.ResponseWriter, r *http.Request) {
		token, ok := bearer(r.Header.Get("Authorization"))
		if !ok {
			unauthorized(w, "missing bearer token")
			return
		}
		subject, err := t.Verify(token)
		if err != nil {
			unauthorized(w, "invalid token")
			return
		}
		next.ServeHTTP(w, r.WithContext(context.WithValue(r.Context(), subjectKey{}, subject)))
	})
}

// Subject is the user id stored by Middleware.
func Subject(ctx context.Context) (string, bool) {
	subject, ok := ctx.Value(subjectKey{}).(string)
	return subject, ok
}

func unauthorized(w http.ResponseWriter, message string) {
	w.Header().Set("Content-Type", "application/json")
	w.WriteHeader(http.StatusUnauthorized)
	_ = json.NewEncoder(w).Encode(map[string]string{"error": message})
}"#;

/// `internal/auth/auth.go`: tokens, password hashing and the guard.
pub struct AuthGo {
    pub flavor: Flavor,
}

impl GeneratedFile for AuthGo {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("auth").join("auth.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let file = GoFile::new("auth")
            .doc("Package auth issues bearer tokens and guards routes with them.")
            .import("net/http")
            .import("strings")
            .import("time")
            .import("github.com/golang-jwt/jwt/v5")
            .import("golang.org/x/crypto/bcrypt")
            .raw(TOKENS);
        match self.flavor {
            Flavor::Gin => file.import(Flavor::Gin.import()).raw(GIN_MIDDLEWARE),
            Flavor::Chi => file
                .import("context")
                .import("encoding/json")
                .raw(CHI_MIDDLEWARE),
        }
        .render()
    }
}

/// `internal/auth/store.go`: credential lookups against the user table.
pub struct AuthStoreGo<'a> {
    project: GoProject<'a>,
}

impl<'a> AuthStoreGo<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
        Self { project }
    }

    /// Whether the key must be generated before the insert.
    fn client_key(&self, store: &CredentialStore<'a>) -> bool {
        store
            .entity
            .and_then(|e| e.id_field().map(|key| self.project.sql(e, key).client_key()))
            .unwrap_or(false)
    }
}

impl GeneratedFile for AuthStoreGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("auth").join("store.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let store = CredentialStore::resolve(self.project.model);
        let dialect = self.project.dialect;
        let table = dialect.ident(&store.table);
        let id = dialect.ident(&store.id_column);
        let email = dialect.ident(&store.email_column);
        let password = dialect.ident(&store.password_column);
        let client_key = self.client_key(&store);

        let (insert, insert_args) = if client_key {
            (
                format!(
                    "INSERT INTO {table} ({id}, {email}, {password}) VALUES ({})",
                    dialect.placeholders(1, 3)
                ),
                "uuid.NewString(), email, hash",
            )
        } else {
            (
                format!(
                    "INSERT INTO {table} ({email}, {password}) VALUES ({})",
                    dialect.placeholders(1, 2)
                ),
                "email, hash",
            )
        };
        let select_id = format!(
            "SELECT {id} FROM {table} WHERE {email} = {}",
            dialect.placeholder(1)
        );
        let select_login = format!(
            "SELECT {id}, COALESCE({password}, '') FROM {table} WHERE {email} = {}",
            dialect.placeholder(1)
        );

        let doc = if store.is_declared() {
            format!("Store reads and writes credentials in the {} table.", store.table)
        } else {
            format!(
                "Store reads and writes credentials. The schema declares no credential\ntable, so {} ({} PRIMARY KEY, {} UNIQUE, {}) must exist.",
                store.table, store.id_column, store.email_column, store.password_column
            )
        };

        let mut file = GoFile::new("auth")
            .import("context")
            .import("database/sql")
            .import("errors")
            .import("fmt");
        if client_key {
            file = file.import("github.com/google/uuid");
        }
        file.raw(format!("// {}\ntype Store struct {{\n\tdb *sql.DB\n}}", doc.replace('\n', "\n// ")))
            .add(&GoFunc::new("NewStore(db *sql.DB) *Store").body("return &Store{db: db}"))
            .add(
                &GoFunc::new("(s *Store) Register(ctx context.Context, email, hash string) (string, error)")
                    .doc("Register stores a new user and returns its id. A taken email fails\nwith the database's unique violation.")
                    .body(format!(
                        "if _, err := s.db.ExecContext(ctx, {}, {insert_args}); err != nil {{\n\treturn \"\", err\n}}\nvar id string\nif err := s.db.QueryRowContext(ctx, {}, email).Scan(&id); err != nil {{\n\treturn \"\", fmt.Errorf(\"read registered id: %w\", err)\n}}\nreturn id, nil",
                        quote(&insert),
                        quote(&select_id)
                    )),
            )
            .add(
                &GoFunc::new("(s *Store) Find(ctx context.Context, email string) (id, hash string, ok bool, err error)")
                    .doc("Find returns the id and password hash registered for email.")
                    .body(format!(
                        "err = s.db.QueryRowContext(ctx, {}, email).Scan(&id, &hash)\nif errors.Is(err, sql.ErrNoRows) {{\n\treturn \"\", \"\", false, nil\n}}\nif err != nil {{\n\treturn \"\", \"\", false, err\n}}\nreturn id, hash, true, nil",
                        quote(&select_login)
                    )),
            )
            .render()
    }
}

/// `internal/handlers/auth.go`: register and login.
pub struct AuthHandlerGo<'a> {
    project: GoProject<'a>,
}

impl<'a> AuthHandlerGo<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
        Self { project }
    }

    fn method(&self, name: &str) -> GoFunc {
        GoFunc::new(self.project.flavor.handler("h *AuthHandler", name))
    }
}

impl GeneratedFile for AuthHandlerGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("handlers").join("auth.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let f = self.project.flavor;
        let ctx = f.ctx();
        let check = f.check();
        let bind = format!(
            "var in credentials\nif err := {}; err != nil {{\n\t{}\n\treturn\n}}",
            f.bind("&in"),
            f.fail("err")
        );
        let reply = |status: &str| {
            format!(
                "token, err := h.tokens.Issue(id)\n{check}\n{}",
                f.json(
                    status,
                    "tokenResponse{AccessToken: token, TokenType: \"Bearer\"}"
                )
            )
        };

        let routes = match f {
            Flavor::Gin => GoFunc::new("(h *AuthHandler) Register(r gin.IRouter)")
                .body("g := r.Group(\"/auth\")\ng.POST(\"/register\", h.register)\ng.POST(\"/login\", h.login)"),
            Flavor::Chi => GoFunc::new("(h *AuthHandler) Routes() chi.Router")
                .body("r := chi.NewRouter()\nr.Post(\"/register\", h.register)\nr.Post(\"/login\", h.login)\nreturn r"),
        };

        GoFile::new("handlers")
            .import("errors")
            .import("net/http")
            .import("strings")
            .import("unicode/utf8")
            .import(f.import())
            .import(&self.project.internal("apierr"))
            .import(&self.project.internal("auth"))
            .raw(
                r#"type credentials struct {
	Email    string `json:"email"`
	Password string `json:"password"`
}

func (in credentials) Validate() error {
	if in.Email == "" || in.Password == "" {
		return errors.New("email and password are required")
	}
	return nil
}

type tokenResponse struct {
	AccessToken string `json:"access_token"`
	TokenType   string `json:"token_type"`
}

// AuthHandler serves /auth/register and /auth/login.
type AuthHandler struct {
	store  *auth.Store
	tokens *auth.Tokens
}

func NewAuthHandler(store *auth.Store, tokens *auth.Tokens) *AuthHandler {
	return &AuthHandler{store: store, tokens: tokens}
}"#,
            )
            .add(&routes)
            .add(&self.method("register").body(format!(
                "{bind}\nif !strings.Contains(in.Email, \"@\") || utf8.RuneCountInString(in.Password) < 8 {{\n\t{}\n\treturn\n}}\nhash, err := auth.HashPassword(in.Password)\n{check}\nid, err := h.store.Register({ctx}, in.Email, hash)\n{check}\n{}",
                f.fail("apierr.BadRequest(\"a valid email and a password of at least 8 characters are required\")"),
                reply("http.StatusCreated")
            )))
            .add(&self.method("login").body(format!(
                "{bind}\nid, hash, found, err := h.store.Find({ctx}, in.Email)\n{check}\nif !found || !auth.CheckPassword(hash, in.Password) {{\n\t{}\n\treturn\n}}\n{}",
                f.fail("apierr.Unauthorized(\"invalid email or password\")"),
                reply("http.StatusOK")
            )))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_chi_guard_stores_subject_in_context() {
        let out = AuthGo { flavor: Flavor::Chi }.render();
        assert!(out.contains("func (t *Tokens) Middleware(next http.Handler) http.Handler {"));
        assert!(out.contains("func Subject(ctx context.Context) (string, bool) {"));
        assert!(!out.contains("gin"));
    }

    #[test]
    fn test_gin_guard_is_a_handler_func() {
        let out = AuthGo { flavor: Flavor::Gin }.render();
        assert!(out.contains("func (t *Tokens) Middleware() gin.HandlerFunc {"));
        assert!(out.contains("\t\"github.com/gin-gonic/gin\"\n"));
    }

    #[test]
    fn test_store_uses_declared_user_table() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoGin, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = AuthStoreGo::new(GoProject::new(&model, &computed, Flavor::Gin)).render();

        assert!(out.contains("// Store reads and writes credentials in the users table."));
        assert!(out.contains("\"INSERT INTO users (email, password_hash) VALUES ($1, $2)\", email, hash"));
        assert!(out.contains("\"SELECT id, COALESCE(password_hash, '') FROM users WHERE email = $1\""));
    }

    #[test]
    fn test_store_without_user_entity_documents_table() {
        let ctx = compile_sql_with(PRODUCT_SQL, Target::GoChi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = AuthStoreGo::new(GoProject::new(&model, &computed, Flavor::Chi)).render();
        assert!(out.contains("// table, so users (id PRIMARY KEY, email UNIQUE, password_hash) must exist."));
    }

    #[test]
    fn test_auth_handler_statuses() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoChi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = AuthHandlerGo::new(GoProject::new(&model, &computed, Flavor::Chi)).render();

        assert!(out.contains("writeJSON(w, http.StatusCreated, tokenResponse{AccessToken: token, TokenType: \"Bearer\"})"));
        assert!(out.contains("fail(w, r, apierr.Unauthorized(\"invalid email or password\"))"));
        assert!(out.contains("r.Post(\"/login\", h.login)"));
    }
}
