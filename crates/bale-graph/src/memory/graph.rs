use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{ExternalDependency, Module, ModuleId};

/// A recorded import: `from` imports `to` through `specifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: ModuleId,
    pub to: ModuleId,
    pub specifier: String,
}

#[derive(Debug, Default)]
pub(super) struct GraphInner {
    pub(super) modules: FxHashMap<ModuleId, Arc<Module>>,
    /// Completion order: a module is appended once all its imports are walked.
    pub(super) order: Vec<ModuleId>,
    /// Edge set in insertion order.
    pub(super) edges: IndexSet<Edge>,
    /// Entry name to entry module, in configuration order.
    pub(super) entry_points: IndexMap<String, ModuleId>,
    pub(super) external_deps: IndexMap<String, ExternalDependency>,
}

/// Dependency graph of one build.
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    pub(super) inner: Arc<RwLock<GraphInner>>,
}

impl ModuleGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }
}
