//! Dependency Tracker Domain Service
//!
//! Decides which file changes outside the watched script matter: a file
//! counts as a dependency when its base name matches a module the current
//! snapshot imports.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::domain::entities::Snapshot;

/// Top-level names of every module imported by `snapshot`
///
/// `import a.b` and `from a.b import c` both contribute `a`; imports nested
/// inside function bodies and blocks are included.
pub fn extract(snapshot: &Snapshot) -> BTreeSet<String> {
    snapshot
        .statements()
        .iter()
        .flat_map(|statement| statement.imported_modules())
        .map(str::to_string)
        .collect()
}

/// Module name to "currently loaded" status, rebuilt per snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    modules: BTreeMap<String, bool>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track every module of `snapshot`, asking `is_loaded` for its status
    pub fn from_snapshot(snapshot: &Snapshot, is_loaded: impl Fn(&str) -> bool) -> Self {
        let modules = snapshot
            .modules()
            .iter()
            .map(|module| (module.clone(), is_loaded(module)))
            .collect();
        Self { modules }
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        self.modules.get(module).copied().unwrap_or(false)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The module to reload for a change to `path`, if it is a tracked dependency
pub fn should_reload(path: &Path, dependencies: &DependencySet) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    dependencies.contains(stem).then(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_program;

    fn snapshot(source: &str) -> Snapshot {
        Snapshot::new(parse_program(source).unwrap())
    }

    #[test]
    fn test_extract_flattens_to_top_level_names() {
        let snap = snapshot("import a.b, c as d\nfrom e.f import g\nif true { import h }");
        let names: Vec<_> = extract(&snap).into_iter().collect();
        assert_eq!(names, vec!["a", "c", "e", "h"]);
    }

    #[test]
    fn test_extract_without_imports_is_empty() {
        assert!(extract(&snapshot("x = 1\nprint(x)")).is_empty());
    }

    #[test]
    fn test_dependency_set_records_loaded_status() {
        let deps = DependencySet::from_snapshot(&snapshot("import util\nimport later"), |m| m == "util");
        assert!(deps.is_loaded("util"));
        assert!(deps.contains("later"));
        assert!(!deps.is_loaded("later"));
        assert!(!deps.is_loaded("missing"));
        assert_eq!(deps.modules().collect::<Vec<_>>(), vec!["later", "util"]);
    }

    #[test]
    fn test_should_reload_matches_base_name() {
        let deps = DependencySet::from_snapshot(&snapshot("import util"), |_| true);
        assert_eq!(
            should_reload(Path::new("/project/util.it"), &deps),
            Some("util".to_string())
        );
        assert_eq!(should_reload(Path::new("/project/other.it"), &deps), None);
        assert_eq!(should_reload(Path::new("/project/util"), &deps), Some("util".to_string()));
    }

    #[test]
    fn test_should_reload_with_empty_set() {
        assert_eq!(should_reload(Path::new("util.it"), &DependencySet::new()), None);
    }
}
