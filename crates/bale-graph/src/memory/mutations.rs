//! Mutation methods for ModuleGraph.

use std::sync::Arc;

use super::graph::{Edge, ModuleGraph};
use crate::{ExternalDependency, Module, ModuleId};

impl ModuleGraph {
    /// Add a module into the graph. A module already present is kept.
    pub fn add_module(&self, module: Arc<Module>) {
        let mut inner = self.inner.write();
        inner.modules.entry(module.id.clone()).or_insert(module);
    }

    /// Append a module to the registration order once its imports are walked.
    pub fn complete_module(&self, id: &ModuleId) {
        let mut inner = self.inner.write();
        if !inner.order.contains(id) {
            inner.order.push(id.clone());
        }
    }

    /// Record an edge. Returns `false` if the same edge was already present.
    pub fn add_edge(&self, from: ModuleId, to: ModuleId, specifier: impl Into<String>) -> bool {
        let edge = Edge {
            from,
            to,
            specifier: specifier.into(),
        };
        self.inner.write().edges.insert(edge)
    }

    /// Mark a module as the entry point named `name`.
    pub fn add_entry_point(&self, name: impl Into<String>, id: ModuleId) {
        self.inner.write().entry_points.insert(name.into(), id);
    }

    /// Record that `importer` imports the bare package `specifier`.
    pub fn add_external(&self, specifier: &str, importer: ModuleId) {
        let mut inner = self.inner.write();
        inner
            .external_deps
            .entry(specifier.to_string())
            .or_insert_with(|| ExternalDependency::new(specifier))
            .push_importer(importer);
    }

    /// Remove a module with every edge touching it.
    pub fn remove_module(&self, id: &ModuleId) -> Option<Arc<Module>> {
        let mut inner = self.inner.write();
        let removed = inner.modules.remove(id);
        inner.order.retain(|m| m != id);
        inner.edges.retain(|e| &e.from != id && &e.to != id);
        inner.entry_points.retain(|_, entry| &*entry != id);
        for dep in inner.external_deps.values_mut() {
            dep.importers.retain(|m| m != id);
        }
        inner.external_deps.retain(|_, dep| !dep.importers.is_empty());
        removed
    }
}
