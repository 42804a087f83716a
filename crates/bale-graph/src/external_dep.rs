use serde::{Deserialize, Serialize};

use super::ModuleId;

/// A bare package specifier (e.g. `react`) left for the host page to provide,
/// with the modules that import it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalDependency {
    pub specifier: String,
    pub importers: Vec<ModuleId>,
}

impl ExternalDependency {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            importers: Vec::new(),
        }
    }

    /// Record an importer once.
    pub fn push_importer(&mut self, module_id: ModuleId) {
        if !self.importers.contains(&module_id) {
            self.importers.push(module_id);
        }
    }
}
