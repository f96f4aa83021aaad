use std::path::{Path, PathBuf};

use crudforge_codegen::{DependencyCollector, DependencyKind, DependencySpec};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::DatabaseKind;

use crate::{project::PyProject, py_file::quote};

/// `pyproject.toml` with the runtime and test requirements the enabled
/// features pull in.
pub struct PyProjectToml<'a> {
    project: PyProject<'a>,
}

impl<'a> PyProjectToml<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }

    pub fn dependencies(&self) -> DependencyCollector {
        let features = self.project.features();
        let mut deps = DependencyCollector::new();

        deps.add_simple("fastapi", ">=0.115");
        deps.add("uvicorn", DependencySpec::new(">=0.30").with_features(["standard"]));
        deps.add_simple("sqlalchemy", ">=2.0.30");
        deps.add_simple("pydantic", ">=2.9");
        deps.add_simple("pydantic-settings", ">=2.4");
        match self.project.model.meta.database {
            DatabaseKind::Postgres => {
                deps.add("psycopg", DependencySpec::new(">=3.2").with_features(["binary"]))
            }
            DatabaseKind::Mysql => deps.add_simple("pymysql", ">=1.1"),
            DatabaseKind::Sqlite => {}
        }
        if features.auth {
            deps.add(
                "python-jose",
                DependencySpec::new(">=3.3").with_features(["cryptography"]),
            );
            deps.add_simple("bcrypt", ">=4.2");
        }
        if features.file_storage {
            deps.add_simple("python-multipart", ">=0.0.9");
        }
        deps.add_dev("pytest", ">=8.3");
        deps.add_dev("httpx", ">=0.27");
        deps
    }
}

fn requirement(name: &str, spec: &DependencySpec) -> String {
    let extras = if spec.features.is_empty() {
        String::new()
    } else {
        format!("[{}]", spec.features.join(","))
    };
    format!("    {},", quote(&format!("{name}{extras}{}", spec.version)))
}

impl GeneratedFile for PyProjectToml<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("pyproject.toml")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let meta = &self.project.model.meta;
        let deps = self.dependencies();
        let list = |kind| {
            deps.sorted(kind)
                .into_iter()
                .map(|(name, spec)| requirement(name, spec))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let description = meta
            .description
            .clone()
            .unwrap_or_else(|| format!("{} API", meta.pascal_name()));

        format!(
            r#"[project]
name = {name}
version = {version}
description = {description}
requires-python = ">=3.11"
dependencies = [
{runtime}
]

[project.optional-dependencies]
dev = [
{dev}
]

[build-system]
requires = ["setuptools>=69"]
build-backend = "setuptools.build_meta"

[tool.setuptools.packages.find]
include = ["app*"]

[tool.pytest.ini_options]
pythonpath = ["."]
testpaths = ["tests"]
"#,
            name = quote(&self.project.distribution()),
            version = quote(&meta.version),
            description = quote(&description),
            runtime = list(DependencyKind::Runtime),
            dev = list(DependencyKind::Dev),
        )
    }
}

/// `.env.example` listing every variable `Settings` reads.
pub struct EnvExample<'a> {
    project: PyProject<'a>,
}

impl<'a> EnvExample<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
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
        let meta = &self.project.model.meta;
        let features = self.project.features();
        let mut out = format!(
            "ADDR=0.0.0.0:8000\nDATABASE_URL={}\n",
            meta.database.example_url(&meta.snake_name())
        );
        if features.tests {
            out.push_str(&format!(
                "# API tests are skipped unless this is set\nTEST_DATABASE_URL={}\n",
                meta.database
                    .example_url(&format!("{}_test", meta.snake_name()))
            ));
        }
        if features.auth {
            out.push_str("JWT_SECRET=change-me\nJWT_TTL_SECS=3600\n");
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
        let mut out = String::from("__pycache__/\n*.py[cod]\n.venv/\n.env\n.pytest_cache/\n*.egg-info/\n");
        if self.database == DatabaseKind::Sqlite {
            out.push_str("*.db\n");
        }
        if self.file_storage {
            out.push_str("/uploads\n");
        }
        out
    }
}

/// `__init__.py` marking a package.
pub struct PackageInit {
    pub package: &'static str,
    pub doc: String,
}

impl PackageInit {
    pub fn new(package: &'static str, doc: impl Into<String>) -> Self {
        Self {
            package,
            doc: doc.into(),
        }
    }
}

impl GeneratedFile for PackageInit {
    fn path(&self, base: &Path) -> PathBuf {
        self.package
            .split('/')
            .fold(base.to_path_buf(), |path, part| path.join(part))
            .join("__init__.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        format!("\"\"\"{}\"\"\"\n", self.doc)
    }
}
