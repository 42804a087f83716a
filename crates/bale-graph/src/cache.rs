//! Loaded-module cache shared across watch-mode rebuilds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Module;

/// Path-keyed cache of successfully loaded modules.
///
/// Only successful loads are inserted, so a module that failed to parse is
/// retried on the next build. Entries leave the cache only through
/// [`ModuleCache::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct ModuleCache {
    modules: Arc<RwLock<FxHashMap<PathBuf, Arc<Module>>>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Module>> {
        self.modules.read().get(path).cloned()
    }

    pub fn insert(&self, path: PathBuf, module: Arc<Module>) {
        self.modules.write().insert(path, module);
    }

    /// Drop the given paths. Returns how many cached modules were removed.
    pub fn invalidate<'a, I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut modules = self.modules.write();
        paths
            .into_iter()
            .filter(|path| modules.remove(*path).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{AssetKind, DataKind};
    use crate::ModuleId;

    #[test]
    fn test_invalidate_only_named_paths() {
        let cache = ModuleCache::new();
        for name in ["a.json", "b.json"] {
            let path = PathBuf::from(format!("/p/{name}"));
            cache.insert(
                path.clone(),
                Arc::new(Module {
                    id: ModuleId::new(&path, "/p"),
                    kind: AssetKind::Data(DataKind::Json),
                    source: Vec::new(),
                    imports: Vec::new(),
                    code: String::new(),
                    side_outputs: Vec::new(),
                }),
            );
        }

        let removed = cache.invalidate([Path::new("/p/a.json"), Path::new("/p/missing.json")]);
        assert_eq!(removed, 1);
        assert!(cache.get(Path::new("/p/a.json")).is_none());
        assert!(cache.get(Path::new("/p/b.json")).is_some());
    }
}
