use std::path::{Path, PathBuf};

use crudforge_codegen::{DependencyCollector, DependencyKind, DependencySpec};
use crudforge_core::{FileRules, GENERATED_MARKER, GeneratedFile, Overwrite};
use crudforge_ir::DatabaseKind;

use crate::project::JavaProject;

const SPRING_BOOT_VERSION: &str = "3.3.4";
const JJWT_VERSION: &str = "0.12.6";

/// `pom.xml`: Spring Boot parent, starters and the driver of the database.
///
/// Dependencies are keyed `groupId:artifactId`; an empty version leaves it
/// to the Spring Boot parent.
pub struct PomXml<'a> {
    project: JavaProject<'a>,
}

impl<'a> PomXml<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }

    pub fn dependencies(&self) -> DependencyCollector {
        let features = self.project.features();
        let mut deps = DependencyCollector::new();

        for starter in ["web", "data-jpa", "validation"] {
            deps.add_simple(format!("org.springframework.boot:spring-boot-starter-{starter}"), "");
        }
        match self.project.model.meta.database {
            DatabaseKind::Postgres => deps.add_simple("org.postgresql:postgresql", ""),
            DatabaseKind::Mysql => deps.add_simple("com.mysql:mysql-connector-j", ""),
            DatabaseKind::Sqlite => {
                deps.add_simple("org.xerial:sqlite-jdbc", "");
                deps.add_simple("org.hibernate.orm:hibernate-community-dialects", "");
            }
        }
        if features.auth {
            deps.add_simple("org.springframework.boot:spring-boot-starter-security", "");
            for artifact in ["api", "impl", "jackson"] {
                deps.add_simple(format!("io.jsonwebtoken:jjwt-{artifact}"), JJWT_VERSION);
            }
        }
        if features.rate_limit {
            deps.add_simple("com.bucket4j:bucket4j_jdk17-core", "8.14.0");
        }

        deps.add_dev("org.springframework.boot:spring-boot-starter-test", "");
        if features.auth {
            deps.add_dev("org.springframework.security:spring-security-test", "");
        }
        deps
    }
}

fn dependency(name: &str, spec: &DependencySpec) -> String {
    let (group, artifact) = name.split_once(':').unwrap_or((name, name));
    let mut out = format!(
        "        <dependency>\n            <groupId>{group}</groupId>\n            <artifactId>{artifact}</artifactId>\n"
    );
    if !spec.version.is_empty() {
        out.push_str(&format!("            <version>{}</version>\n", spec.version));
    }
    if spec.kind == DependencyKind::Dev {
        out.push_str("            <scope>test</scope>\n");
    }
    out.push_str("        </dependency>\n");
    out
}

impl GeneratedFile for PomXml<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("pom.xml")
    }

    /// The marker is written as an XML comment by `render`.
    fn rules(&self) -> FileRules {
        FileRules {
            overwrite: Overwrite::Always,
            header: None,
        }
    }

    fn render(&self) -> String {
        let meta = &self.project.model.meta;
        let deps = self.dependencies();
        let group = self
            .project
            .base_package()
            .rsplit_once('.')
            .map(|(group, _)| group)
            .unwrap_or("com.example");
        let description = meta
            .description
            .clone()
            .unwrap_or_else(|| format!("{} API", meta.pascal_name()));
        let dependencies: String = deps
            .sorted(DependencyKind::Runtime)
            .into_iter()
            .chain(deps.sorted(DependencyKind::Dev))
            .map(|(name, spec)| dependency(name, spec))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- {GENERATED_MARKER} -->
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>{SPRING_BOOT_VERSION}</version>
        <relativePath/>
    </parent>

    <groupId>{group}</groupId>
    <artifactId>{artifact}</artifactId>
    <version>{version}</version>
    <name>{name}</name>
    <description>{description}</description>

    <properties>
        <java.version>21</java.version>
    </properties>

    <dependencies>
{dependencies}    </dependencies>

    <build>
        <plugins>
            <plugin>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-maven-plugin</artifactId>
            </plugin>
        </plugins>
    </build>
</project>
"#,
            artifact = meta.kebab_name(),
            version = meta.version,
            name = meta.pascal_name(),
        )
    }
}

/// `src/main/resources/application.yml`
pub struct ApplicationYml<'a> {
    project: JavaProject<'a>,
}

impl<'a> ApplicationYml<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }

    fn app_section(&self) -> String {
        let features = self.project.features();
        let mut lines = Vec::new();
        if features.auth {
            lines.push("  jwt-secret: ${JWT_SECRET}");
            lines.push("  jwt-ttl-seconds: ${JWT_TTL_SECS:3600}");
        }
        if features.rate_limit {
            lines.push("  rate-limit-capacity: ${RATE_LIMIT_CAPACITY:100}");
            lines.push("  rate-limit-refill-per-second: ${RATE_LIMIT_REFILL_PER_SEC:10}");
        }
        if features.file_storage {
            lines.push("  upload-dir: ${UPLOAD_DIR:uploads}");
        }
        if lines.is_empty() {
            return String::new();
        }
        format!("\napp:\n{}\n", lines.join("\n"))
    }
}

impl GeneratedFile for ApplicationYml<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src")
            .join("main")
            .join("resources")
            .join("application.yml")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let meta = &self.project.model.meta;
        let mut jpa = String::from(
            "  jpa:\n    open-in-view: false\n    hibernate:\n      ddl-auto: none\n      naming:\n        physical-strategy: org.hibernate.boot.model.naming.PhysicalNamingStrategyStandardImpl\n",
        );
        if meta.database == DatabaseKind::Sqlite {
            jpa.push_str("    database-platform: org.hibernate.community.dialect.SQLiteDialect\n");
        }
        let multipart = if self.project.features().file_storage {
            "  servlet:\n    multipart:\n      max-file-size: 10MB\n      max-request-size: 10MB\n"
        } else {
            ""
        };

        format!(
            "spring:\n  application:\n    name: {name}\n  datasource:\n    url: ${{DATABASE_URL:{url}}}\n{jpa}{multipart}\nserver:\n  port: ${{PORT:8080}}\n{app}",
            name = meta.kebab_name(),
            url = self.project.jdbc_url(&meta.snake_name()),
            app = self.app_section(),
        )
    }
}

/// `.env.example` listing the variables `application.yml` reads.
pub struct EnvExample<'a> {
    project: JavaProject<'a>,
}

impl<'a> EnvExample<'a> {
    pub fn new(project: JavaProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for EnvExample<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(".env.example")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let name = self.project.model.meta.snake_name();
        let features = self.project.features();
        let mut out = format!(
            "PORT=8080\nDATABASE_URL={}\n",
            self.project.jdbc_url(&name)
        );
        if features.tests {
            out.push_str(&format!(
                "# API tests are skipped unless this is set\nTEST_DATABASE_URL={}\n",
                self.project.jdbc_url(&format!("{name}_test"))
            ));
        }
        if features.auth {
            out.push_str("# At least 32 bytes\nJWT_SECRET=change-me-to-a-long-random-secret-value\nJWT_TTL_SECS=3600\n");
        }
        if features.rate_limit {
            out.push_str("RATE_LIMIT_CAPACITY=100\nRATE_LIMIT_REFILL_PER_SEC=10\n");
        }
        if features.file_storage {
            out.push_str("UPLOAD_DIR=uploads\n");
        }
        out
    }
}

pub struct GitIgnore {
    pub file_storage: bool,
    pub database: DatabaseKind,
}

impl GeneratedFile for GitIgnore {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(".gitignore")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        let mut out = String::from("target/\n.idea/\n*.iml\n.env\n");
        if self.database == DatabaseKind::Sqlite {
            out.push_str("*.db\n");
        }
        if self.file_storage {
            out.push_str("/uploads\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_pom_dependencies_follow_features() {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let pom = PomXml::new(JavaProject::new(&model, &computed));
        let deps = pom.dependencies();

        assert!(deps.has("org.postgresql:postgresql"));
        assert!(deps.has("io.jsonwebtoken:jjwt-jackson"));
        assert!(deps.has("com.bucket4j:bucket4j_jdk17-core"));

        let out = pom.render();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- Code generated by crudforge. DO NOT EDIT. -->\n"));
        assert!(out.contains("    <groupId>com.example</groupId>\n    <artifactId>blog</artifactId>\n"));
        assert!(out.contains("            <artifactId>jjwt-api</artifactId>\n            <version>0.12.6</version>\n"));
        assert!(out.contains("            <artifactId>spring-security-test</artifactId>\n            <scope>test</scope>\n"));
    }

    #[test]
    fn test_pom_without_features() {
        let ctx = compile_sql(BLOG_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let deps = PomXml::new(JavaProject::new(&model, &computed)).dependencies();

        assert!(deps.has("org.springframework.boot:spring-boot-starter-data-jpa"));
        assert!(!deps.has("org.springframework.boot:spring-boot-starter-security"));
        assert!(!deps.has("com.bucket4j:bucket4j_jdk17-core"));
    }

    #[test]
    fn test_application_yml() {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = ApplicationYml::new(JavaProject::new(&model, &computed)).render();

        assert!(out.contains(
            "    url: ${DATABASE_URL:jdbc:postgresql://localhost:5432/blog?user=postgres&password=postgres}\n"
        ));
        assert!(out.contains("      ddl-auto: none\n"));
        assert!(out.contains("\napp:\n  jwt-secret: ${JWT_SECRET}\n"));
        assert!(out.contains("  upload-dir: ${UPLOAD_DIR:uploads}\n"));
    }
}
