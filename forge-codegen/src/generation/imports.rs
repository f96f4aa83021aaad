//! Per-file imports and per-project package dependencies.

use std::collections::BTreeSet;

use indexmap::IndexMap;

/// Import statements gathered while a file is rendered.
///
/// Modules keep insertion order; symbols within a module are sorted.
///
/// ```
/// use crudforge_codegen::generation::ImportCollector;
///
/// let mut imports = ImportCollector::new();
/// imports.add("typeorm", "Entity");
/// imports.add("typeorm", "Column");
/// imports.add("class-validator", "IsString");
///
/// let rendered: Vec<String> = imports
///     .iter()
///     .map(|(module, symbols)| {
///         let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
///         format!("import {{ {} }} from '{}';", symbols.join(", "), module)
///     })
///     .collect();
/// assert_eq!(rendered[0], "import { Column, Entity } from 'typeorm';");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImportCollector {
    imports: IndexMap<String, BTreeSet<String>>,
}

impl ImportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: &str, symbol: &str) {
        self.imports
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    /// Add a module import without specific symbols (Go, Python `import x`).
    pub fn add_module(&mut self, module: &str) {
        self.imports.entry(module.to_string()).or_default();
    }

    pub fn merge(&mut self, other: &ImportCollector) {
        for (module, symbols) in &other.imports {
            let entry = self.imports.entry(module.clone()).or_default();
            entry.extend(symbols.iter().cloned());
        }
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.imports.contains_key(module)
    }

    pub fn has_symbol(&self, module: &str, symbol: &str) -> bool {
        self.imports
            .get(module)
            .is_some_and(|symbols| symbols.contains(symbol))
    }

    /// Modules in the order they were first added.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.imports.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Modules sorted by name (Go, Java import blocks).
    pub fn sorted_modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.imports.keys().map(String::as_str).collect();
        modules.sort_unstable();
        modules
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }
}

/// Whether a dependency is needed at runtime or only for development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyKind {
    #[default]
    Runtime,
    Dev,
}

/// One manifest entry: version plus optional features and kind.
#[derive(Debug, Clone)]
pub struct DependencySpec {
    /// Version requirement in the ecosystem's syntax (`"1"`, `"^10.0.0"`, `">=2.0"`).
    /// Empty when a parent manages the version (Spring Boot starters).
    pub version: String,
    pub features: Vec<String>,
    pub kind: DependencyKind,
}

impl DependencySpec {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            features: Vec::new(),
            kind: DependencyKind::Runtime,
        }
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn dev(mut self) -> Self {
        self.kind = DependencyKind::Dev;
        self
    }
}

/// Build-manifest dependencies, keyed by package name. The first add of a name wins.
///
/// ```
/// use crudforge_codegen::generation::{DependencyCollector, DependencySpec};
///
/// let mut deps = DependencyCollector::new();
/// deps.add("serde", DependencySpec::new("1").with_features(["derive"]));
/// deps.add("tokio", DependencySpec::new("1").with_features(["full"]));
/// deps.add("serde", DependencySpec::new("2"));
///
/// assert_eq!(deps.get("serde").unwrap().version, "1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyCollector {
    deps: IndexMap<String, DependencySpec>,
}

impl DependencyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency. The first registration wins.
    pub fn add(&mut self, name: impl Into<String>, spec: DependencySpec) {
        self.deps.entry(name.into()).or_insert(spec);
    }

    pub fn add_simple(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.add(name, DependencySpec::new(version));
    }

    pub fn add_dev(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.add(name, DependencySpec::new(version).dev());
    }

    pub fn has(&self, name: &str) -> bool {
        self.deps.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DependencySpec> {
        self.deps.get(name)
    }

    /// Dependencies of one kind, sorted by name.
    pub fn sorted(&self, kind: DependencyKind) -> Vec<(&str, &DependencySpec)> {
        let mut deps: Vec<_> = self
            .deps
            .iter()
            .filter(|(_, spec)| spec.kind == kind)
            .map(|(name, spec)| (name.as_str(), spec))
            .collect();
        deps.sort_by_key(|(name, _)| *name);
        deps
    }

    /// Dependencies of one kind in registration order.
    pub fn in_order(&self, kind: DependencyKind) -> Vec<(&str, &DependencySpec)> {
        self.deps
            .iter()
            .filter(|(_, spec)| spec.kind == kind)
            .map(|(name, spec)| (name.as_str(), spec))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_collector_dedup() {
        let mut imports = ImportCollector::new();
        imports.add("typeorm", "Entity");
        imports.add("typeorm", "Column");
        imports.add("typeorm", "Entity");
        imports.add_module("net/http");

        assert_eq!(imports.len(), 2);
        assert!(imports.has_symbol("typeorm", "Column"));
        assert!(imports.has_module("net/http"));
        let (_, symbols) = imports.iter().next().unwrap();
        assert_eq!(symbols.iter().collect::<Vec<_>>(), ["Column", "Entity"]);
    }

    #[test]
    fn test_import_collector_merge_and_sort() {
        let mut a = ImportCollector::new();
        a.add_module("time");
        let mut b = ImportCollector::new();
        b.add_module("database/sql");
        b.add("time", "Duration");
        a.merge(&b);

        assert_eq!(a.sorted_modules(), ["database/sql", "time"]);
        assert!(a.has_symbol("time", "Duration"));
    }

    #[test]
    fn test_dependency_kinds() {
        let mut deps = DependencyCollector::new();
        deps.add_simple("tokio", "1");
        deps.add_simple("axum", "0.7");
        deps.add_dev("tower", "0.4");

        let runtime: Vec<_> = deps.sorted(DependencyKind::Runtime).iter().map(|(n, _)| *n).collect();
        assert_eq!(runtime, ["axum", "tokio"]);
        let ordered: Vec<_> = deps.in_order(DependencyKind::Runtime).iter().map(|(n, _)| *n).collect();
        assert_eq!(ordered, ["tokio", "axum"]);
        assert_eq!(deps.sorted(DependencyKind::Dev).len(), 1);
        assert!(deps.has("tower"));
    }
}
