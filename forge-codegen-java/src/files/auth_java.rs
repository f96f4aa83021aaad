//! Bearer-token authentication on Spring Security: the filter chain, JWT
//! issue/verify, credential storage and the `/auth` routes.

use std::path::{Path, PathBuf};

use crudforge_codegen::CredentialStore;
use crudforge_core::{FileRules, GeneratedFile};

use crate::{
    files::RepositoryJava,
    java_file::{JavaFile, add_class, quote},
    project::JavaProject,
};

/// `config/SecurityConfig.java`: reads are public, writes need a token.
pub struct SecurityConfigJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> SecurityConfigJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for SecurityConfigJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("config"), "SecurityConfig")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let auth = self.project.package("auth");
        JavaFile::new(self.project.package("config"))
            .import_all([
                "jakarta.servlet.http.HttpServletRequest",
                "jakarta.servlet.http.HttpServletResponse",
                "java.io.IOException",
                "org.springframework.context.annotation.Bean",
                "org.springframework.context.annotation.Configuration",
                "org.springframework.http.HttpMethod",
                "org.springframework.http.MediaType",
                "org.springframework.security.config.annotation.web.builders.HttpSecurity",
                "org.springframework.security.config.annotation.web.configuration.EnableWebSecurity",
                "org.springframework.security.config.http.SessionCreationPolicy",
                "org.springframework.security.core.AuthenticationException",
                "org.springframework.security.crypto.bcrypt.BCryptPasswordEncoder",
                "org.springframework.security.crypto.password.PasswordEncoder",
                "org.springframework.security.web.SecurityFilterChain",
                "org.springframework.security.web.authentication.UsernamePasswordAuthenticationFilter",
            ])
            .import(&format!("{auth}.JwtFilter"))
            .import(&format!("{auth}.TokenService"))
            .raw(
                r#"@Configuration
@EnableWebSecurity
public class SecurityConfig {

    @Bean
    public SecurityFilterChain filterChain(HttpSecurity http, TokenService tokens) throws Exception {
        http.csrf(csrf -> csrf.disable())
                .httpBasic(basic -> basic.disable())
                .formLogin(form -> form.disable())
                .sessionManagement(session -> session.sessionCreationPolicy(SessionCreationPolicy.STATELESS))
                .authorizeHttpRequests(requests -> requests
                        .requestMatchers(HttpMethod.GET, "/**").permitAll()
                        .requestMatchers("/auth/**", "/health", "/error").permitAll()
                        .anyRequest().authenticated())
                .exceptionHandling(errors -> errors.authenticationEntryPoint(SecurityConfig::unauthorized))
                .addFilterBefore(new JwtFilter(tokens), UsernamePasswordAuthenticationFilter.class);
        return http.build();
    }

    @Bean
    public PasswordEncoder passwordEncoder() {
        return new BCryptPasswordEncoder();
    }

    private static void unauthorized(
            HttpServletRequest request,
            HttpServletResponse response,
            AuthenticationException e) throws IOException {
        String message = request.getAttribute(JwtFilter.ERROR) instanceof String error
                ? error
                : "missing bearer token";
        response.setStatus(HttpServletResponse.SC_UNAUTHORIZED);
        response.setContentType(MediaType.APPLICATION_JSON_VALUE);
        response.getWriter().write("{\"error\":\"" + message + "\"}");
    }
}"#,
            )
            .render()
    }
}

/// `auth/TokenService.java`: HS256 tokens signed with `app.jwt-secret`.
pub struct TokenServiceJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> TokenServiceJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for TokenServiceJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("auth"), "TokenService")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("auth"))
            .import_all([
                "io.jsonwebtoken.JwtException",
                "io.jsonwebtoken.Jwts",
                "io.jsonwebtoken.security.Keys",
                "java.nio.charset.StandardCharsets",
                "java.time.Instant",
                "java.util.Date",
                "javax.crypto.SecretKey",
                "org.springframework.stereotype.Service",
            ])
            .import(&format!("{}.AppProperties", self.project.package("config")))
            .raw(
                r#"@Service
public class TokenService {

    private final SecretKey key;
    private final long ttlSeconds;

    public TokenService(AppProperties properties) {
        this.key = Keys.hmacShaKeyFor(properties.jwtSecret().getBytes(StandardCharsets.UTF_8));
        this.ttlSeconds = properties.jwtTtlSeconds();
    }

    public String issue(String subject) {
        Instant now = Instant.now();
        return Jwts.builder()
                .subject(subject)
                .issuedAt(Date.from(now))
                .expiration(Date.from(now.plusSeconds(ttlSeconds)))
                .signWith(key)
                .compact();
    }

    /** The subject of a valid token. */
    public String verify(String token) {
        String subject = Jwts.parser()
                .verifyWith(key)
                .build()
                .parseSignedClaims(token)
                .getPayload()
                .getSubject();
        if (subject == null || subject.isEmpty()) {
            throw new JwtException("token has no subject");
        }
        return subject;
    }
}"#,
            )
            .render()
    }
}

/// `auth/JwtFilter.java`: authenticates requests that carry a bearer token.
pub struct JwtFilterJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> JwtFilterJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for JwtFilterJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("auth"), "JwtFilter")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("auth"))
            .import_all([
                "io.jsonwebtoken.JwtException",
                "jakarta.servlet.FilterChain",
                "jakarta.servlet.ServletException",
                "jakarta.servlet.http.HttpServletRequest",
                "jakarta.servlet.http.HttpServletResponse",
                "java.io.IOException",
                "java.util.List",
                "org.springframework.http.HttpHeaders",
                "org.springframework.security.authentication.UsernamePasswordAuthenticationToken",
                "org.springframework.security.core.context.SecurityContextHolder",
                "org.springframework.web.filter.OncePerRequestFilter",
            ])
            .raw(
                r#"/**
 * A bad token leaves the request anonymous and records why, so routes that
 * need a user answer 401 with that reason while public reads still work.
 */
public class JwtFilter extends OncePerRequestFilter {

    public static final String ERROR = JwtFilter.class.getName() + ".error";
    private static final String PREFIX = "Bearer ";

    private final TokenService tokens;

    public JwtFilter(TokenService tokens) {
        this.tokens = tokens;
    }

    @Override
    protected void doFilterInternal(
            HttpServletRequest request,
            HttpServletResponse response,
            FilterChain chain) throws ServletException, IOException {
        String header = request.getHeader(HttpHeaders.AUTHORIZATION);
        if (header != null && header.startsWith(PREFIX)) {
            try {
                String subject = tokens.verify(header.substring(PREFIX.length()));
                SecurityContextHolder.getContext()
                        .setAuthentication(new UsernamePasswordAuthenticationToken(subject, null, List.of()));
            } catch (JwtException | IllegalArgumentException e) {
                request.setAttribute(ERROR, "invalid token");
            }
        }
        chain.doFilter(request, response);
    }
}"#,
            )
            .render()
    }
}

/// `auth/UserAccounts.java`: where registered credentials live.
///
/// A declared credential entity is stored through its repository; otherwise
/// the assumed table is reached with `JdbcTemplate`.
pub struct UserAccountsJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> UserAccountsJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }

    fn repository_store(&self, file: &mut JavaFile, store: &CredentialStore<'_>) -> Option<String> {
        let p = self.project;
        let entity = store.entity?;
        let id = entity.field(&store.id_column)?;
        let email = p.accessor(entity.field(&store.email_column)?);
        let password = p.accessor(entity.field(&store.password_column)?);
        let repo = RepositoryJava::class_name(entity);
        let name = &entity.name;
        add_class(file.imports_mut(), &p.entity_class(entity, ""));
        add_class(file.imports_mut(), &p.entity_class(entity, "Repository"));
        let id = p.accessor(id);

        Some(format!(
            r#"@Component
public class UserAccounts {{

    private final {repo} repository;

    public UserAccounts({repo} repository) {{
        this.repository = repository;
    }}

    public Optional<Account> find(String email) {{
        return repository.findByEmail(email)
                .map(user -> new Account(String.valueOf(user.get{id}()), user.get{password}()));
    }}

    /** Stores a new account and returns its id. A taken email fails with the unique violation. */
    public String register(String email, String passwordHash) {{
        {name} user = new {name}();
        user.set{email}(email);
        user.set{password}(passwordHash);
        return String.valueOf(repository.saveAndFlush(user).get{id}());
    }}

    public record Account(String id, String passwordHash) {{
    }}
}}"#
        ))
    }

    fn jdbc_store(&self, file: &mut JavaFile, store: &CredentialStore<'_>) -> String {
        add_class(file.imports_mut(), "org.springframework.jdbc.core.JdbcTemplate");
        let d = self.project.dialect;
        let table = d.ident(&store.table);
        let id = d.ident(&store.id_column);
        let email = d.ident(&store.email_column);
        let password = d.ident(&store.password_column);
        let insert = format!("INSERT INTO {table} ({email}, {password}) VALUES (?, ?)");
        let select = format!("SELECT {id}, {password} FROM {table} WHERE {email} = ?");

        format!(
            r#"/**
 * The schema declares no credential table, so {table} ({id} PRIMARY KEY,
 * {email} UNIQUE, {password}) must exist.
 */
@Component
public class UserAccounts {{

    private static final String INSERT = {insert};
    private static final String FIND = {select};

    private final JdbcTemplate jdbc;

    public UserAccounts(JdbcTemplate jdbc) {{
        this.jdbc = jdbc;
    }}

    public Optional<Account> find(String email) {{
        return jdbc.query(FIND, (row, n) -> new Account(row.getString(1), row.getString(2)), email)
                .stream()
                .findFirst();
    }}

    /** Stores a new account and returns its id. A taken email fails with the unique violation. */
    public String register(String email, String passwordHash) {{
        jdbc.update(INSERT, email, passwordHash);
        return find(email)
                .map(Account::id)
                .orElseThrow(() -> new IllegalStateException("registered user not found"));
    }}

    public record Account(String id, String passwordHash) {{
    }}
}}"#,
            insert = quote(&insert),
            select = quote(&select),
        )
    }
}

impl GeneratedFile for UserAccountsJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("auth"), "UserAccounts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let store = CredentialStore::resolve(self.project.model);
        let mut file = JavaFile::new(self.project.package("auth")).import_all([
            "java.util.Optional",
            "org.springframework.stereotype.Component",
        ]);
        let body = match self.repository_store(&mut file, &store) {
            Some(body) => body,
            None => self.jdbc_store(&mut file, &store),
        };
        file.raw(body).render()
    }
}

/// `auth/AuthController.java`: `POST /auth/register` and `POST /auth/login`.
pub struct AuthControllerJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> AuthControllerJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for AuthControllerJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("auth"), "AuthController")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("auth"))
            .import_all([
                "com.fasterxml.jackson.annotation.JsonProperty",
                "org.springframework.http.HttpStatus",
                "org.springframework.security.crypto.password.PasswordEncoder",
                "org.springframework.web.bind.annotation.PostMapping",
                "org.springframework.web.bind.annotation.RequestBody",
                "org.springframework.web.bind.annotation.RequestMapping",
                "org.springframework.web.bind.annotation.ResponseStatus",
                "org.springframework.web.bind.annotation.RestController",
            ])
            .import(&format!("{}.ApiException", self.project.package("common")))
            .raw(
                r#"@RestController
@RequestMapping("/auth")
public class AuthController {

    public record Credentials(String email, String password) {
    }

    public record TokenResponse(
            @JsonProperty("access_token") String accessToken,
            @JsonProperty("token_type") String tokenType) {

        public TokenResponse(String accessToken) {
            this(accessToken, "Bearer");
        }
    }

    private final UserAccounts accounts;
    private final TokenService tokens;
    private final PasswordEncoder passwordEncoder;

    public AuthController(UserAccounts accounts, TokenService tokens, PasswordEncoder passwordEncoder) {
        this.accounts = accounts;
        this.tokens = tokens;
        this.passwordEncoder = passwordEncoder;
    }

    @PostMapping("/register")
    @ResponseStatus(HttpStatus.CREATED)
    public TokenResponse register(@RequestBody Credentials body) {
        if (body.email() == null || !body.email().contains("@")
                || body.password() == null || body.password().length() < 8) {
            throw ApiException.badRequest("a valid email and a password of at least 8 characters are required");
        }
        String id = accounts.register(body.email(), passwordEncoder.encode(body.password()));
        return new TokenResponse(tokens.issue(id));
    }

    @PostMapping("/login")
    public TokenResponse login(@RequestBody Credentials body) {
        return accounts.find(body.email())
                .filter(account -> body.password() != null && account.passwordHash() != null)
                .filter(account -> passwordEncoder.matches(body.password(), account.passwordHash()))
                .map(account -> new TokenResponse(tokens.issue(account.id())))
                .orElseThrow(() -> ApiException.unauthorized("invalid email or password"));
    }
}"#,
            )
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::{
        ComputedData,
        testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql_with},
    };
    use crudforge_ir::DomainModel;
    use crudforge_schema::Target;

    use super::*;

    fn compile(sql: &str) -> (DomainModel, ComputedData) {
        let ctx = compile_sql_with(sql, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_security_rules() {
        let (model, computed) = compile(BLOG_SQL);
        let out = SecurityConfigJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains("                        .requestMatchers(HttpMethod.GET, \"/**\").permitAll()\n"));
        assert!(out.contains("                        .anyRequest().authenticated())\n"));
        assert!(out.contains("import com.example.blog.auth.JwtFilter;\n"));
        assert!(out.contains("                : \"missing bearer token\";\n"));
    }

    #[test]
    fn test_tokens_use_app_properties() {
        let (model, computed) = compile(BLOG_SQL);
        let project = JavaProject::new(&model, &computed);
        let out = TokenServiceJava::new(project).render();
        assert!(out.contains("import com.example.blog.config.AppProperties;\n"));
        assert!(out.contains("Keys.hmacShaKeyFor(properties.jwtSecret().getBytes(StandardCharsets.UTF_8))"));

        let filter = JwtFilterJava::new(project).render();
        assert!(filter.contains("                request.setAttribute(ERROR, \"invalid token\");\n"));
    }

    #[test]
    fn test_declared_user_entity_is_the_store() {
        let (model, computed) = compile(BLOG_SQL);
        let out = UserAccountsJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains("import com.example.blog.user.UserRepository;\n"));
        assert!(out.contains("        user.setPasswordHash(passwordHash);\n"));
        assert!(out.contains("String.valueOf(repository.saveAndFlush(user).getId())"));
        assert!(!out.contains("JdbcTemplate"));
    }

    #[test]
    fn test_assumed_table_uses_jdbc() {
        let (model, computed) = compile(PRODUCT_SQL);
        let out = UserAccountsJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains(
            "    private static final String INSERT = \"INSERT INTO users (email, password_hash) VALUES (?, ?)\";\n"
        ));
        assert!(out.contains(
            "    private static final String FIND = \"SELECT id, password_hash FROM users WHERE email = ?\";\n"
        ));
    }

    #[test]
    fn test_auth_routes() {
        let (model, computed) = compile(BLOG_SQL);
        let out = AuthControllerJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains("    @PostMapping(\"/register\")\n    @ResponseStatus(HttpStatus.CREATED)\n"));
        assert!(out.contains("ApiException.unauthorized(\"invalid email or password\")"));
        assert!(out.contains("            @JsonProperty(\"access_token\") String accessToken,\n"));
    }
}
