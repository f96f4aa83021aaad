use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

/// The .gitignore file
pub struct GitIgnore {
    pub file_storage: bool,
}

impl GeneratedFile for GitIgnore {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(".gitignore")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        let mut out = String::from("/target\n.env\n");
        if self.file_storage {
            out.push_str("/uploads\n");
        }
        out
    }
}
