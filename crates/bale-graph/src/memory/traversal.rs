//! Reachability over the edge set.

use rustc_hash::FxHashSet;

use super::graph::ModuleGraph;
use crate::ModuleId;

impl ModuleGraph {
    /// Every module reachable from `start`, including `start` itself.
    ///
    /// Iterative so deep import chains cannot overflow the stack; the visited
    /// set makes cycles terminate.
    pub fn reachable_from(&self, start: &ModuleId) -> FxHashSet<ModuleId> {
        let inner = self.inner.read();
        let mut visited = FxHashSet::default();
        let mut stack = vec![start.clone()];

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            for edge in inner.edges.iter().filter(|e| e.from == id) {
                if !visited.contains(&edge.to) {
                    stack.push(edge.to.clone());
                }
            }
        }

        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ModuleId {
        ModuleId::new(format!("/p/{name}"), "/p")
    }

    #[test]
    fn test_reachability_through_cycle() {
        let graph = ModuleGraph::new();
        graph.add_edge(id("a.js"), id("b.js"), "./b");
        graph.add_edge(id("b.js"), id("c.js"), "./c");
        graph.add_edge(id("c.js"), id("a.js"), "./a");
        graph.add_edge(id("d.js"), id("a.js"), "./a");

        let reached = graph.reachable_from(&id("b.js"));
        assert_eq!(reached.len(), 3);
        assert!(reached.contains(&id("a.js")));
        assert!(!reached.contains(&id("d.js")));
    }
}
