//! In-memory ModuleGraph implementation.
//!
//! The graph is an `Arc<RwLock<..>>` around plain maps, split into impl
//! blocks by concern: mutations while building, queries for the splitter and
//! emitter, and reachability traversal.

mod graph;
mod mutations;
mod queries;
mod traversal;

pub use graph::{Edge, ModuleGraph};
