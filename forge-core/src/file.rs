use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};

/// Marker carried by every file that is rewritten on each generation.
pub const GENERATED_MARKER: &str = "Code generated by crudforge. DO NOT EDIT.";

/// Marker carried by user-editable stubs until the user takes ownership.
///
/// Removing the line tells `forge clean` the stub has been modified.
pub const STUB_MARKER: &str = "crudforge:stub - remove this line once you edit this file";

/// Something that knows where it lives and how to render itself.
pub trait GeneratedFile {
    /// Destination under the output directory.
    fn path(&self, base: &Path) -> PathBuf;

    fn rules(&self) -> FileRules;

    fn render(&self) -> String;

    /// Body with the marker header prepended when the rules carry a comment prefix.
    fn contents(&self) -> String {
        self.rules().apply_header(self.render())
    }

    fn write(&self, base: &Path) -> Result<WriteResult> {
        let path = self.path(base);
        let rules = self.rules();

        match rules.overwrite {
            Overwrite::Always => {
                write_file(&path, &self.contents())?;
                Ok(WriteResult::Written)
            }
            Overwrite::IfMissing => {
                if path.exists() {
                    tracing::debug!(path = %path.display(), "keeping existing file");
                    Ok(WriteResult::Skipped)
                } else {
                    write_file(&path, &self.contents())?;
                    Ok(WriteResult::Written)
                }
            }
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    Written,
    /// An existing file was left untouched.
    Skipped,
}

/// Content bound for a concrete path.
pub struct File {
    path: PathBuf,
    content: String,
    rules: FileRules,
}

impl File {
    /// Overwrites on write and adds no header, unless [`with_rules`](Self::with_rules) says otherwise.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            rules: FileRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: FileRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Creates missing parent directories.
    pub fn write(&self) -> Result<WriteResult> {
        if self.rules.overwrite == Overwrite::IfMissing && self.exists() {
            return Ok(WriteResult::Skipped);
        }
        write_file(&self.path, &self.rules.apply_header(self.content.clone()))?;
        Ok(WriteResult::Written)
    }
}

/// Overwrite policy plus the comment syntax for the marker header.
#[derive(Debug, Clone)]
pub struct FileRules {
    pub overwrite: Overwrite,
    /// Line comment prefix used for the marker header (e.g. `//`, `#`).
    /// `None` for formats without comments, such as JSON.
    pub header: Option<&'static str>,
}

impl FileRules {
    /// Regenerated on every run, with a marker header
    pub fn generated(comment: &'static str) -> Self {
        Self {
            overwrite: Overwrite::Always,
            header: Some(comment),
        }
    }

    /// Written once, carrying the stub marker until edited
    pub fn stub(comment: &'static str) -> Self {
        Self {
            overwrite: Overwrite::IfMissing,
            header: Some(comment),
        }
    }

    /// Written once, no header
    pub fn if_missing() -> Self {
        Self {
            overwrite: Overwrite::IfMissing,
            header: None,
        }
    }

    /// Marker text matching the overwrite mode
    pub fn marker(&self) -> &'static str {
        match self.overwrite {
            Overwrite::Always => GENERATED_MARKER,
            Overwrite::IfMissing => STUB_MARKER,
        }
    }

    fn apply_header(&self, body: String) -> String {
        match self.header {
            Some(comment) => format!("{} {}\n\n{}", comment, self.marker(), body),
            None => body,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Regenerated output.
    Always,
    /// Stubs and one-time scaffolding.
    IfMissing,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            overwrite: Overwrite::Always,
            header: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    struct Service;

    impl GeneratedFile for Service {
        fn path(&self, base: &Path) -> PathBuf {
            base.join("src").join("services").join("post.rs")
        }

        fn rules(&self) -> FileRules {
            FileRules::stub("//")
        }

        fn render(&self) -> String {
            "pub struct PostService;\n".to_string()
        }
    }

    #[test]
    fn test_nested_output_dirs_are_created() {
        let out = TempDir::new().unwrap();
        let model = out.path().join("app").join("models").join("post.py");

        File::new(&model, "class Post: ...\n").write().unwrap();

        assert_eq!(fs::read_to_string(&model).unwrap(), "class Post: ...\n");
    }

    #[test]
    fn test_regenerated_file_replaces_previous_output() {
        let out = TempDir::new().unwrap();
        let routes = out.path().join("routes.go");
        fs::write(&routes, "package old\n").unwrap();

        let written = File::new(&routes, "package routes\n").write().unwrap();

        assert_eq!(written, WriteResult::Written);
        assert_eq!(fs::read_to_string(&routes).unwrap(), "package routes\n");
    }

    #[test]
    fn test_if_missing_keeps_user_schema() {
        let out = TempDir::new().unwrap();
        let schema = out.path().join("schema.sql");
        fs::write(&schema, "CREATE TABLE mine (id INT PRIMARY KEY);").unwrap();

        let outcome = File::new(&schema, "-- starter")
            .with_rules(FileRules::if_missing())
            .write()
            .unwrap();

        assert_eq!(outcome, WriteResult::Skipped);
        assert!(fs::read_to_string(&schema).unwrap().starts_with("CREATE TABLE mine"));
    }

    #[test]
    fn test_generated_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models.py");

        File::new(&path, "class Post: ...\n")
            .with_rules(FileRules::generated("#"))
            .write()
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(&format!("# {}\n\n", GENERATED_MARKER)));
        assert!(written.ends_with("class Post: ...\n"));
    }

    #[test]
    fn test_stub_written_once() {
        let temp = TempDir::new().unwrap();

        assert_eq!(Service.write(temp.path()).unwrap(), WriteResult::Written);
        let path = Service.path(temp.path());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains(STUB_MARKER));

        fs::write(&path, "pub struct PostService { edited: bool }\n").unwrap();
        assert_eq!(Service.write(temp.path()).unwrap(), WriteResult::Skipped);
        assert!(fs::read_to_string(&path).unwrap().contains("edited"));
    }

    #[test]
    fn test_json_has_no_header() {
        let file = File::new("package.json", "{}");
        assert_eq!(file.rules.apply_header("{}".into()), "{}");
    }
}
