//! Read-only queries over a ModuleGraph.

use std::sync::Arc;

use super::graph::{Edge, ModuleGraph};
use crate::{ExternalDependency, Module, ModuleId};

impl ModuleGraph {
    /// Number of modules.
    pub fn len(&self) -> usize {
        self.inner.read().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().modules.is_empty()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.inner.read().modules.contains_key(id)
    }

    pub fn module(&self, id: &ModuleId) -> Option<Arc<Module>> {
        self.inner.read().modules.get(id).cloned()
    }

    /// Modules in registration order: dependencies before dependents, with
    /// cycles broken at the point they were discovered.
    pub fn modules(&self) -> Vec<Arc<Module>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.modules.get(id).cloned())
            .collect()
    }

    /// Position of each module in registration order.
    pub fn order(&self) -> Vec<ModuleId> {
        self.inner.read().order.clone()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.inner.read().edges.iter().cloned().collect()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.len()
    }

    /// Distinct direct dependencies of `id`, in import order.
    pub fn dependencies(&self, id: &ModuleId) -> Vec<ModuleId> {
        let inner = self.inner.read();
        let mut deps: Vec<ModuleId> = Vec::new();
        for edge in inner.edges.iter().filter(|e| &e.from == id) {
            if !deps.contains(&edge.to) {
                deps.push(edge.to.clone());
            }
        }
        deps
    }

    /// Distinct modules importing `id`.
    pub fn dependents(&self, id: &ModuleId) -> Vec<ModuleId> {
        let inner = self.inner.read();
        let mut deps: Vec<ModuleId> = Vec::new();
        for edge in inner.edges.iter().filter(|e| &e.to == id) {
            if !deps.contains(&edge.from) {
                deps.push(edge.from.clone());
            }
        }
        deps
    }

    /// Specifier-to-target map of one module's local imports.
    pub fn import_targets(&self, id: &ModuleId) -> Vec<(String, ModuleId)> {
        self.inner
            .read()
            .edges
            .iter()
            .filter(|e| &e.from == id)
            .map(|e| (e.specifier.clone(), e.to.clone()))
            .collect()
    }

    /// Entry points in configuration order.
    pub fn entry_points(&self) -> Vec<(String, ModuleId)> {
        self.inner
            .read()
            .entry_points
            .iter()
            .map(|(name, id)| (name.clone(), id.clone()))
            .collect()
    }

    pub fn external_dependencies(&self) -> Vec<ExternalDependency> {
        self.inner.read().external_deps.values().cloned().collect()
    }
}
