//! API tests run with MockMvc against the database in `TEST_DATABASE_URL`.

use std::path::{Path, PathBuf};

use crudforge_codegen::{
    JAVA_NAMING,
    generation::samples::{SampleSource, missing_key_literal, sample_plan, update_sample},
};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::{
    java_file::{JavaFile, java_literal, quote},
    project::JavaProject,
};

/// Locals a factory already declares.
const TAKEN: &[&str] = &["token", "body"];

const ENABLED_IF: &str = "@EnabledIfEnvironmentVariable(named = \"TEST_DATABASE_URL\", matches = \".+\")";

fn factory_name(entity: &Entity) -> String {
    format!("create{}", entity.name)
}

/// `ApiTestSupport.java`: the shared Spring context, request helpers and
/// one factory per entity.
pub struct ApiTestSupportJava<'a> {
    project: JavaProject<'a>,
}

impl<'a> ApiTestSupportJava<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }

    fn properties(&self) -> String {
        let features = self.project.features();
        let mut lines = vec![
            "registry.add(\"spring.datasource.url\", () -> System.getenv(\"TEST_DATABASE_URL\"));".to_string(),
            "registry.add(\"spring.jpa.hibernate.ddl-auto\", () -> \"update\");".to_string(),
        ];
        if features.auth {
            lines.push(
                "registry.add(\"app.jwt-secret\", () -> \"test-secret-for-the-api-tests-0123456789\");".into(),
            );
        }
        if features.rate_limit {
            lines.push("registry.add(\"app.rate-limit-capacity\", () -> \"1000000\");".into());
            lines.push("registry.add(\"app.rate-limit-refill-per-second\", () -> \"1000000\");".into());
        }
        if features.file_storage {
            lines.push("String uploads = Files.createTempDirectory(\"uploads\").toString();".into());
            lines.push("registry.add(\"app.upload-dir\", () -> uploads);".into());
        }
        lines.iter().map(|l| format!("        {l}\n")).collect()
    }

    fn unique_expr(field: &Field) -> String {
        let max = field.ty.max_length().map(|n| n as usize);
        match &field.ty {
            ColumnType::Uuid => "uniqueUuid()".to_string(),
            ty if ty.is_integer() => "uniqueNumber()".to_string(),
            _ if field.name.to_ascii_lowercase().contains("email") => format!(
                "unique(\"user\", {}) + \"@example.com\"",
                max.map(|n| n.saturating_sub(12).clamp(1, 32)).unwrap_or(32)
            ),
            _ => {
                let prefix: String = field.name.chars().take(4).collect();
                format!("unique({}, {})", quote(&prefix), max.unwrap_or(32).min(32))
            }
        }
    }

    fn binding(name: &str) -> String {
        let var = JAVA_NAMING.field_name(name);
        if TAKEN.contains(&var.as_str()) {
            format!("{var}Row")
        } else {
            var
        }
    }

    fn factory(&self, entity: &Entity) -> String {
        let plan = sample_plan(self.project.model, self.project.computed, entity);
        let mut body = vec!["Map<String, Object> body = new LinkedHashMap<>();".to_string()];
        let mut setup = Vec::new();
        for (field, source) in &plan {
            let value = match source {
                SampleSource::Parent {
                    binding,
                    entity: parent,
                    column,
                } => {
                    let var = Self::binding(binding);
                    setup.push(format!("JsonNode {var} = {}(token);", factory_name(parent)));
                    format!("{var}.get({})", quote(column))
                }
                SampleSource::Unique => Self::unique_expr(field),
                // byte[] travels as base64
                SampleSource::Literal(_) if field.ty == ColumnType::Binary => quote("AQID"),
                SampleSource::Literal(value) => java_literal(value),
            };
            body.push(format!("body.put({}, {value});", quote(&field.name)));
        }
        let statements = setup
            .iter()
            .chain(&body)
            .map(|s| format!("        {s}\n"))
            .collect::<String>();
        format!(
            "    protected JsonNode {name}(String token) throws Exception {{\n{statements}        return create(\"/{route}\", body, token);\n    }}",
            name = factory_name(entity),
            route = entity.route(),
        )
    }

    fn token_fn(&self) -> &'static str {
        if self.project.features().auth {
            r#"    /** Registers a fresh user and returns its bearer token. */
    protected String token() throws Exception {
        String email = unique("user", 32) + "@example.com";
        JsonNode reply = read(mvc.perform(post("/auth/register")
                        .contentType(MediaType.APPLICATION_JSON)
                        .content(json.writeValueAsString(Map.of("email", email, "password", "password123"))))
                .andExpect(status().isCreated()));
        return reply.get("access_token").asText();
    }"#
        } else {
            r#"    /** Writes are open, so there is no token. */
    protected String token() {
        return "";
    }"#
        }
    }
}

impl GeneratedFile for ApiTestSupportJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project
            .test_path(base, self.project.base_package(), "ApiTestSupport")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut file = JavaFile::new(self.project.base_package())
            .import_all([
                "com.fasterxml.jackson.databind.JsonNode",
                "com.fasterxml.jackson.databind.ObjectMapper",
                "java.util.LinkedHashMap",
                "java.util.Map",
                "java.util.concurrent.atomic.AtomicLong",
                "org.springframework.beans.factory.annotation.Autowired",
                "org.springframework.boot.test.autoconfigure.web.servlet.AutoConfigureMockMvc",
                "org.springframework.boot.test.context.SpringBootTest",
                "org.springframework.http.HttpHeaders",
                "org.springframework.http.MediaType",
                "org.springframework.test.context.DynamicPropertyRegistry",
                "org.springframework.test.context.DynamicPropertySource",
                "org.springframework.test.web.servlet.MockMvc",
                "org.springframework.test.web.servlet.ResultActions",
                "org.springframework.test.web.servlet.request.MockHttpServletRequestBuilder",
            ])
            .import_static(
                "org.springframework.test.web.servlet.request.MockMvcRequestBuilders",
                "post",
            )
            .import_static(
                "org.springframework.test.web.servlet.result.MockMvcResultMatchers",
                "status",
            );
        let throws = if self.project.features().file_storage {
            file = file.import_all(["java.io.IOException", "java.nio.file.Files"]);
            " throws IOException"
        } else {
            ""
        };

        let factories = self
            .project
            .entities()
            .map(|(entity, _)| format!("\n\n{}", self.factory(entity)))
            .collect::<String>();

        file.raw(format!(
            r#"@SpringBootTest
@AutoConfigureMockMvc
public abstract class ApiTestSupport {{

    private static final AtomicLong COUNTER = new AtomicLong();

    @Autowired
    protected MockMvc mvc;

    @Autowired
    protected ObjectMapper json;

    @DynamicPropertySource
    static void properties(DynamicPropertyRegistry registry){throws} {{
{properties}    }}

    private static long seed() {{
        return System.nanoTime() + COUNTER.incrementAndGet();
    }}

    /** A value no earlier run produced, at most maxLength characters. */
    protected static String unique(String prefix, int maxLength) {{
        String tail = Long.toHexString(seed());
        if (tail.length() > maxLength) {{
            tail = tail.substring(tail.length() - maxLength);
        }}
        return prefix.substring(0, Math.min(prefix.length(), maxLength - tail.length())) + tail;
    }}

    protected static long uniqueNumber() {{
        return seed() % 1_000_000_000L + 1;
    }}

    protected static String uniqueUuid() {{
        return String.format("00000000-0000-4000-8000-%012x", seed() & 0xFFFFFFFFFFFFL);
    }}

    protected static MockHttpServletRequestBuilder authorized(MockHttpServletRequestBuilder request, String token) {{
        return token.isEmpty() ? request : request.header(HttpHeaders.AUTHORIZATION, "Bearer " + token);
    }}

    protected JsonNode read(ResultActions actions) throws Exception {{
        return json.readTree(actions.andReturn().getResponse().getContentAsString());
    }}

    protected JsonNode create(String route, Map<String, Object> body, String token) throws Exception {{
        return read(mvc.perform(authorized(post(route), token)
                        .contentType(MediaType.APPLICATION_JSON)
                        .content(json.writeValueAsString(body)))
                .andExpect(status().isCreated()));
    }}

{token}{factories}
}}"#,
            properties = self.properties(),
            token = self.token_fn(),
        ))
        .render()
    }
}

/// `<entity>/<Entity>ApiTest.java`: CRUD round trip against a live database.
pub struct EntityTestJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> EntityTestJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    fn class_name(&self) -> String {
        format!("{}ApiTest", self.entity.name)
    }
}

impl GeneratedFile for EntityTestJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.test_path(
            base,
            &self.project.entity_package(self.entity),
            &self.class_name(),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let route = self.entity.route();
        let key = quote(&self.key.name);
        let method = self.entity.camel_name();
        let factory = factory_name(self.entity);

        let update = match update_sample(self.entity) {
            Some((field, value)) => format!(
                r#"
        JsonNode updated = read(mvc.perform(authorized(put("/{route}/{{key}}", key), token)
                        .contentType(MediaType.APPLICATION_JSON)
                        .content(json.writeValueAsString(Map.of({column}, {literal}))))
                .andExpect(status().isOk()));
        JsonNode expected = json.valueToTree({literal});
        assertEquals(expected, updated.get({column}));
"#,
                column = quote(&field.name),
                literal = java_literal(&value),
            ),
            None => String::new(),
        };

        let mut statics = vec!["delete", "get"];
        if !update.is_empty() {
            statics.push("put");
        }
        let auth = self.project.features().auth;
        if auth {
            statics.push("post");
        }
        let mut file = JavaFile::new(self.project.entity_package(self.entity))
            .import_all([
                "com.fasterxml.jackson.databind.JsonNode",
                "org.junit.jupiter.api.Test",
                "org.junit.jupiter.api.condition.EnabledIfEnvironmentVariable",
            ])
            .import(&format!("{}.ApiTestSupport", self.project.base_package()))
            .import_static("org.junit.jupiter.api.Assertions", "assertEquals")
            .import_static("org.junit.jupiter.api.Assertions", "assertTrue")
            .import_static(
                "org.springframework.test.web.servlet.result.MockMvcResultMatchers",
                "status",
            );
        for builder in statics {
            file = file.import_static(
                "org.springframework.test.web.servlet.request.MockMvcRequestBuilders",
                builder,
            );
        }
        if !update.is_empty() || auth {
            file = file.import("org.springframework.http.MediaType");
        }
        if !update.is_empty() {
            file = file.import("java.util.Map");
        }

        let writes = if auth {
            format!(
                r#"

    @Test
    void {method}WritesRequireToken() throws Exception {{
        mvc.perform(post("/{route}").contentType(MediaType.APPLICATION_JSON).content("{{}}"))
                .andExpect(status().isUnauthorized());
    }}"#
            )
        } else {
            String::new()
        };

        file.raw(format!(
            r#"{ENABLED_IF}
class {class} extends ApiTestSupport {{

    @Test
    void {method}Crud() throws Exception {{
        String token = token();
        JsonNode created = {factory}(token);
        String key = created.get({key}).asText();

        JsonNode fetched = read(mvc.perform(get("/{route}/{{key}}", key)).andExpect(status().isOk()));
        assertEquals(created.get({key}), fetched.get({key}));

        JsonNode page = read(mvc.perform(get("/{route}").param("limit", "5")).andExpect(status().isOk()));
        assertTrue(page.size() <= 5);
{update}
        mvc.perform(authorized(delete("/{route}/{{key}}", key), token)).andExpect(status().isNoContent());
        mvc.perform(get("/{route}/{{key}}", key)).andExpect(status().isNotFound());
    }}

    @Test
    void missing{name}IsNotFound() throws Exception {{
        mvc.perform(get("/{route}/{missing}")).andExpect(status().isNotFound());
    }}{writes}
}}"#,
            class = self.class_name(),
            name = self.entity.name,
            missing = missing_key_literal(self.key),
        ))
        .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_factories_create_parents_first() {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = ApiTestSupportJava::new(JavaProject::new(&model, &computed)).render();

        assert!(out.contains(
            "    protected JsonNode createPost(String token) throws Exception {\n        JsonNode author = createUser(token);\n"
        ));
        assert!(out.contains("        body.put(\"author_id\", author.get(\"id\"));\n"));
        assert!(out.contains("        body.put(\"email\", unique(\"user\", 32) + \"@example.com\");\n"));
        assert!(out.contains("        return create(\"/posts\", body, token);\n"));
        assert!(out.contains("        JsonNode reply = read(mvc.perform(post(\"/auth/register\")\n"));
        assert!(out.contains("    static void properties(DynamicPropertyRegistry registry) throws IOException {\n"));
        assert!(out.contains("        registry.add(\"app.upload-dir\", () -> uploads);\n"));
    }

    #[test]
    fn test_support_without_features() {
        let ctx = compile_sql(BLOG_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let file = ApiTestSupportJava::new(JavaProject::new(&model, &computed));
        assert_eq!(
            file.path(Path::new("")),
            Path::new("src/test/java/com/example/blog/ApiTestSupport.java")
        );
        let out = file.render();
        assert!(out.contains("    static void properties(DynamicPropertyRegistry registry) {\n"));
        assert!(out.contains("    protected String token() {\n        return \"\";\n    }\n"));
        assert!(!out.contains("jwt-secret"));
    }

    #[test]
    fn test_entity_test_round_trip() {
        let ctx = compile_sql(BLOG_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let post = model.entity("Post").unwrap();
        let out = EntityTestJava::new(JavaProject::new(&model, &computed), post, post.id_field().unwrap())
            .render();

        assert!(out.contains(
            "@EnabledIfEnvironmentVariable(named = \"TEST_DATABASE_URL\", matches = \".+\")\nclass PostApiTest extends ApiTestSupport {\n"
        ));
        assert!(out.contains("        JsonNode created = createPost(token);\n"));
        assert!(out.contains(".content(json.writeValueAsString(Map.of(\"title\", \"updated\"))))"));
        assert!(out.contains("        mvc.perform(get(\"/posts/2147483000\")).andExpect(status().isNotFound());\n"));
        assert!(out.contains("import static org.springframework.test.web.servlet.request.MockMvcRequestBuilders.put;\n"));
        assert!(!out.contains("WritesRequireToken"));
    }

    #[test]
    fn test_uuid_keys_and_char_columns() {
        let ctx = compile_sql_with(PRODUCT_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = JavaProject::new(&model, &computed);
        let product = model.entity("Product").unwrap();
        let out = EntityTestJava::new(project, product, product.id_field().unwrap()).render();
        assert!(out.contains("get(\"/products/00000000-0000-4000-8000-00000000ffff\")"));
        assert!(out.contains("    void productWritesRequireToken() throws Exception {\n"));

        let support = ApiTestSupportJava::new(project).render();
        assert!(support.contains("        body.put(\"sku\", unique(\"sku\", 12));\n"));
    }
}
