//! Generation targets.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Framework targets that are recognized but not generated.
const UNSUPPORTED: &[(&[&str], &str)] = &[
    (&["kotlin-spring", "kotlin"], "Kotlin/Spring"),
    (&["csharp-aspnet", "csharp", "aspnet", "dotnet"], "C#/ASP.NET"),
    (&["php-laravel", "php", "laravel"], "PHP/Laravel"),
];

/// A language + framework combination the generator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Target {
    /// Rust with Axum and sqlx
    RustAxum,
    /// TypeScript with NestJS and TypeORM
    TypescriptNestjs,
    /// Go with Gin
    GoGin,
    /// Go with Chi
    GoChi,
    /// Python with FastAPI and SQLAlchemy
    PythonFastapi,
    /// Java with Spring Boot and JPA
    JavaSpring,
}

impl Target {
    pub const ALL: [Target; 6] = [
        Target::RustAxum,
        Target::TypescriptNestjs,
        Target::GoGin,
        Target::GoChi,
        Target::PythonFastapi,
        Target::JavaSpring,
    ];

    /// Returns the target identifier as used in forge.toml.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::RustAxum => "rust-axum",
            Target::TypescriptNestjs => "typescript-nestjs",
            Target::GoGin => "go-gin",
            Target::GoChi => "go-chi",
            Target::PythonFastapi => "python-fastapi",
            Target::JavaSpring => "java-spring",
        }
    }

    pub fn language(&self) -> &'static str {
        match self {
            Target::RustAxum => "Rust",
            Target::TypescriptNestjs => "TypeScript",
            Target::GoGin | Target::GoChi => "Go",
            Target::PythonFastapi => "Python",
            Target::JavaSpring => "Java",
        }
    }

    pub fn framework(&self) -> &'static str {
        match self {
            Target::RustAxum => "Axum + sqlx",
            Target::TypescriptNestjs => "NestJS + TypeORM",
            Target::GoGin => "Gin + database/sql",
            Target::GoChi => "Chi + database/sql",
            Target::PythonFastapi => "FastAPI + SQLAlchemy",
            Target::JavaSpring => "Spring Boot + JPA",
        }
    }

    /// Display label for prompts (`Rust (Axum + sqlx)`).
    pub fn label(&self) -> String {
        format!("{} ({})", self.language(), self.framework())
    }

    /// Labels of recognized frameworks that have no generator yet.
    pub fn unsupported() -> impl Iterator<Item = &'static str> {
        UNSUPPORTED.iter().map(|(_, label)| *label)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let target = match lower.as_str() {
            "rust-axum" | "rust" | "axum" => Target::RustAxum,
            "typescript-nestjs" | "typescript" | "ts" | "nestjs" | "nest" => {
                Target::TypescriptNestjs
            }
            "go-gin" | "gin" | "go" => Target::GoGin,
            "go-chi" | "chi" => Target::GoChi,
            "python-fastapi" | "python" | "fastapi" => Target::PythonFastapi,
            "java-spring" | "java" | "spring" => Target::JavaSpring,
            _ => {
                let supported = Target::ALL.map(|t| t.as_str()).join(", ");
                if let Some((_, label)) = UNSUPPORTED
                    .iter()
                    .find(|(names, _)| names.contains(&lower.as_str()))
                {
                    return Err(format!(
                        "{} is not supported yet; supported targets: {}",
                        label, supported
                    ));
                }
                return Err(format!(
                    "unknown target '{}', expected one of: {}",
                    s, supported
                ));
            }
        };
        Ok(target)
    }
}

impl TryFrom<String> for Target {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_and_aliases() {
        assert_eq!(Target::from_str("rust-axum").unwrap(), Target::RustAxum);
        assert_eq!(Target::from_str("NestJS").unwrap(), Target::TypescriptNestjs);
        assert_eq!(Target::from_str("chi").unwrap(), Target::GoChi);
        assert_eq!(Target::from_str("go").unwrap(), Target::GoGin);
        assert_eq!(Target::from_str("spring").unwrap(), Target::JavaSpring);
    }

    #[test]
    fn test_unsupported_target_message() {
        let err = Target::from_str("kotlin-spring").unwrap_err();
        assert!(err.starts_with("Kotlin/Spring is not supported yet"));
        let err = Target::from_str("cobol").unwrap_err();
        assert!(err.starts_with("unknown target 'cobol'"));
        assert_eq!(
            Target::unsupported().collect::<Vec<_>>(),
            ["Kotlin/Spring", "C#/ASP.NET", "PHP/Laravel"]
        );
    }

    #[test]
    fn test_display_round_trip() {
        for target in Target::ALL {
            assert_eq!(target.to_string().parse::<Target>().unwrap(), target);
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(Target::PythonFastapi.label(), "Python (FastAPI + SQLAlchemy)");
    }
}
