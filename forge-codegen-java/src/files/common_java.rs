//! Application class and the `common` package: errors, paging and health.

use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::DatabaseKind;

use crate::{java_file::JavaFile, project::JavaProject};

/// `<App>Application.java`, the Spring Boot entry point.
pub struct ApplicationJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> ApplicationJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for ApplicationJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            self.project.base_package(),
            &self.project.application_class(),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let class = self.project.application_class();
        JavaFile::new(self.project.base_package())
            .import_all([
                "org.springframework.boot.SpringApplication",
                "org.springframework.boot.autoconfigure.SpringBootApplication",
                "org.springframework.boot.context.properties.ConfigurationPropertiesScan",
            ])
            .raw(format!(
                "@SpringBootApplication\n@ConfigurationPropertiesScan\npublic class {class} {{\n\n    public static void main(String[] args) {{\n        SpringApplication.run({class}.class, args);\n    }}\n}}"
            ))
            .render()
    }
}

/// `common/ApiException.java`: a failure with the status it maps to.
pub struct ApiExceptionJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> ApiExceptionJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for ApiExceptionJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("common"), "ApiException")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("common"))
            .import("org.springframework.http.HttpStatus")
            .raw(
                r#"public class ApiException extends RuntimeException {

    private final HttpStatus status;

    public ApiException(HttpStatus status, String message) {
        super(message);
        this.status = status;
    }

    public HttpStatus getStatus() {
        return status;
    }

    public static ApiException badRequest(String message) {
        return new ApiException(HttpStatus.BAD_REQUEST, message);
    }

    public static ApiException unauthorized(String message) {
        return new ApiException(HttpStatus.UNAUTHORIZED, message);
    }

    public static ApiException notFound(String message) {
        return new ApiException(HttpStatus.NOT_FOUND, message);
    }

    public static ApiException conflict(String message) {
        return new ApiException(HttpStatus.CONFLICT, message);
    }
}"#,
            )
            .render()
    }
}

/// `common/ErrorHandler.java`: renders every failure as `{"error": message}`.
pub struct ErrorHandlerJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> ErrorHandlerJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }

    /// Body of `isUniqueViolation(Throwable cause)` for the database driver.
    fn unique_check(&self) -> &'static str {
        match self.project.model.meta.database {
            DatabaseKind::Postgres => {
                "        return cause instanceof SQLException sql && \"23505\".equals(sql.getSQLState());"
            }
            DatabaseKind::Mysql => {
                "        return cause instanceof SQLException sql && sql.getErrorCode() == 1062;"
            }
            DatabaseKind::Sqlite => {
                "        return cause.getMessage() != null && cause.getMessage().contains(\"UNIQUE constraint failed\");"
            }
        }
    }
}

impl GeneratedFile for ErrorHandlerJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("common"), "ErrorHandler")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut file = JavaFile::new(self.project.package("common")).import_all([
            "java.util.Map",
            "java.util.stream.Collectors",
            "org.slf4j.Logger",
            "org.slf4j.LoggerFactory",
            "org.springframework.dao.DataIntegrityViolationException",
            "org.springframework.http.HttpStatus",
            "org.springframework.http.ResponseEntity",
            "org.springframework.http.converter.HttpMessageNotReadableException",
            "org.springframework.web.bind.MethodArgumentNotValidException",
            "org.springframework.web.bind.MissingServletRequestParameterException",
            "org.springframework.web.bind.annotation.ExceptionHandler",
            "org.springframework.web.bind.annotation.RestControllerAdvice",
            "org.springframework.web.method.annotation.MethodArgumentTypeMismatchException",
        ]);
        if self.project.model.meta.database != DatabaseKind::Sqlite {
            file = file.import("java.sql.SQLException");
        }
        if self.project.features().file_storage {
            file = file.import("org.springframework.web.multipart.support.MissingServletRequestPartException");
        }
        let missing_part = if self.project.features().file_storage {
            "\n\n    @ExceptionHandler(MissingServletRequestPartException.class)\n    public ResponseEntity<Map<String, String>> missingPart(MissingServletRequestPartException e) {\n        return error(HttpStatus.BAD_REQUEST, \"missing part '\" + e.getRequestPartName() + \"'\");\n    }"
        } else {
            ""
        };

        file.raw(format!(
            r#"@RestControllerAdvice
public class ErrorHandler {{

    private static final Logger log = LoggerFactory.getLogger(ErrorHandler.class);

    @ExceptionHandler(ApiException.class)
    public ResponseEntity<Map<String, String>> api(ApiException e) {{
        return error(e.getStatus(), e.getMessage());
    }}

    @ExceptionHandler(DataIntegrityViolationException.class)
    public ResponseEntity<Map<String, String>> integrity(DataIntegrityViolationException e) {{
        Throwable cause = e.getMostSpecificCause();
        if (isUniqueViolation(cause)) {{
            return error(HttpStatus.CONFLICT, "a row with this value already exists");
        }}
        String message = String.valueOf(cause.getMessage()).lines().findFirst().orElse("constraint violation");
        log.info("constraint violation: {{}}", message);
        return error(HttpStatus.UNPROCESSABLE_ENTITY, message);
    }}

    @ExceptionHandler(MethodArgumentNotValidException.class)
    public ResponseEntity<Map<String, String>> invalid(MethodArgumentNotValidException e) {{
        String message = e.getBindingResult().getFieldErrors().stream()
                .map(f -> f.getField() + ": " + f.getDefaultMessage())
                .sorted()
                .collect(Collectors.joining(", "));
        return error(HttpStatus.BAD_REQUEST, message.isEmpty() ? "invalid request" : message);
    }}

    @ExceptionHandler(HttpMessageNotReadableException.class)
    public ResponseEntity<Map<String, String>> unreadable(HttpMessageNotReadableException e) {{
        return error(HttpStatus.BAD_REQUEST, "malformed request body");
    }}

    @ExceptionHandler(MethodArgumentTypeMismatchException.class)
    public ResponseEntity<Map<String, String>> mismatch(MethodArgumentTypeMismatchException e) {{
        return error(HttpStatus.BAD_REQUEST, "invalid value for '" + e.getName() + "'");
    }}

    @ExceptionHandler(MissingServletRequestParameterException.class)
    public ResponseEntity<Map<String, String>> missingParameter(MissingServletRequestParameterException e) {{
        return error(HttpStatus.BAD_REQUEST, "missing parameter '" + e.getParameterName() + "'");
    }}{missing_part}

    private static boolean isUniqueViolation(Throwable cause) {{
{unique}
    }}

    private static ResponseEntity<Map<String, String>> error(HttpStatus status, String message) {{
        return ResponseEntity.status(status).body(Map.of("error", message));
    }}
}}"#,
            unique = self.unique_check(),
        ))
        .render()
    }
}

/// `common/Paging.java` and `common/OffsetPage.java`: `limit`/`offset`
/// query parameters and the `Pageable` that carries them to Spring Data.
pub struct PagingJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> PagingJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for PagingJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("common"), "Paging")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("common"))
            .import_all([
                "org.springframework.data.domain.Pageable",
                "org.springframework.data.domain.Sort",
            ])
            .raw(
                r#"public record Paging(int limit, int offset) {

    public static final int DEFAULT_LIMIT = 20;
    public static final int MAX_LIMIT = 100;

    public static Paging of(Integer limit, Integer offset) {
        int l = limit == null ? DEFAULT_LIMIT : limit;
        int o = offset == null ? 0 : offset;
        if (l < 1) {
            throw ApiException.badRequest("limit must be at least 1");
        }
        if (o < 0) {
            throw ApiException.badRequest("offset must not be negative");
        }
        return new Paging(Math.min(l, MAX_LIMIT), o);
    }

    public Pageable pageable(Sort sort) {
        return new OffsetPage(offset, limit, sort);
    }
}"#,
            )
            .render()
    }
}

pub struct OffsetPageJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> OffsetPageJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for OffsetPageJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("common"), "OffsetPage")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("common"))
            .import_all([
                "org.springframework.data.domain.Pageable",
                "org.springframework.data.domain.Sort",
            ])
            .raw(
                r#"/** A page starting at an arbitrary row rather than a page boundary. */
public record OffsetPage(long offset, int limit, Sort sort) implements Pageable {

    @Override
    public int getPageNumber() {
        return (int) (offset / limit);
    }

    @Override
    public int getPageSize() {
        return limit;
    }

    @Override
    public long getOffset() {
        return offset;
    }

    @Override
    public Sort getSort() {
        return sort;
    }

    @Override
    public Pageable next() {
        return new OffsetPage(offset + limit, limit, sort);
    }

    @Override
    public Pageable previousOrFirst() {
        return new OffsetPage(Math.max(0, offset - limit), limit, sort);
    }

    @Override
    public Pageable first() {
        return new OffsetPage(0, limit, sort);
    }

    @Override
    public Pageable withPage(int pageNumber) {
        return new OffsetPage((long) pageNumber * limit, limit, sort);
    }

    @Override
    public boolean hasPrevious() {
        return offset > 0;
    }
}"#,
            )
            .render()
    }
}

/// `common/HealthController.java`: `GET /health`.
pub struct HealthControllerJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> HealthControllerJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for HealthControllerJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("common"), "HealthController")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        JavaFile::new(self.project.package("common"))
            .import_all([
                "java.util.Map",
                "org.springframework.web.bind.annotation.GetMapping",
                "org.springframework.web.bind.annotation.RestController",
            ])
            .raw(
                r#"@RestController
public class HealthController {

    @GetMapping("/health")
    public Map<String, String> health() {
        return Map.of("status", "ok");
    }
}"#,
            )
            .render()
    }
}

/// `config/AppProperties.java`: the `app.*` settings the enabled features
/// read.
pub struct AppPropertiesJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> AppPropertiesJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }

    /// Whether any feature has settings.
    pub fn needed(project: JavaProject<'_>) -> bool {
        let features = project.features();
        features.auth || features.rate_limit || features.file_storage
    }

    fn components(&self) -> Vec<&'static str> {
        let features = self.project.features();
        let mut out = Vec::new();
        if features.auth {
            out.extend(["String jwtSecret", "long jwtTtlSeconds"]);
        }
        if features.rate_limit {
            out.extend(["long rateLimitCapacity", "long rateLimitRefillPerSecond"]);
        }
        if features.file_storage {
            out.push("String uploadDir");
        }
        out
    }
}

impl GeneratedFile for AppPropertiesJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .source_path(base, &self.project.package("config"), "AppProperties")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let components = self
            .components()
            .iter()
            .map(|c| format!("        {c}"))
            .collect::<Vec<_>>()
            .join(",\n");
        JavaFile::new(self.project.package("config"))
            .import("org.springframework.boot.context.properties.ConfigurationProperties")
            .raw(format!(
                "@ConfigurationProperties(\"app\")\npublic record AppProperties(\n{components}) {{\n}}"
            ))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::{
        ComputedData, Pipeline,
        testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with},
    };
    use crudforge_ir::DomainModel;
    use crudforge_schema::{ProjectConfig, Target, parse_sql};

    use super::*;

    fn blog() -> (DomainModel, ComputedData) {
        let ctx = compile_sql(BLOG_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_application_class() {
        let (model, computed) = blog();
        let file = ApplicationJava::new(JavaProject::new(&model, &computed));
        assert_eq!(
            file.path(Path::new("")),
            Path::new("src/main/java/com/example/blog/BlogApplication.java")
        );
        let out = file.render();
        assert!(out.starts_with("package com.example.blog;\n\nimport org.springframework.boot.SpringApplication;\n"));
        assert!(out.contains("        SpringApplication.run(BlogApplication.class, args);\n"));
    }

    #[test]
    fn test_error_handler_per_engine() {
        let (model, computed) = blog();
        let out = ErrorHandlerJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains("\"23505\".equals(sql.getSQLState())"));
        assert!(out.contains("import java.sql.SQLException;\n"));
        assert!(!out.contains("MissingServletRequestPartException"));

        let mut config = ProjectConfig::new("blog", "schema.sql", Target::JavaSpring);
        config.generate.database = DatabaseKind::Sqlite;
        let schema = parse_sql(BLOG_SQL, "schema.sql").unwrap();
        let ctx = Pipeline::for_target(Target::JavaSpring)
            .run(config, schema)
            .unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = ErrorHandlerJava::new(JavaProject::new(&model, &computed)).render();
        assert!(out.contains("contains(\"UNIQUE constraint failed\")"));
        assert!(!out.contains("java.sql.SQLException"));
    }

    #[test]
    fn test_app_properties_follow_features() {
        let (model, computed) = blog();
        assert!(!AppPropertiesJava::needed(JavaProject::new(&model, &computed)));

        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = JavaProject::new(&model, &computed);
        assert!(AppPropertiesJava::needed(project));
        let out = AppPropertiesJava::new(project).render();
        assert!(out.contains(
            "public record AppProperties(\n        String jwtSecret,\n        long jwtTtlSeconds,\n"
        ));
        assert!(out.contains("        String uploadDir) {\n}\n"));
    }
}
