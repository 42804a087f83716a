//! Chunk splitting.
//!
//! Every module reachable from an entry lands in exactly one chunk:
//!
//! - reached by one entry: that entry's chunk
//! - reached by several: a shared group. Among the groups it qualifies for
//!   (regex `test` on the module name, `min_chunks`), the one with the
//!   smallest current size wins and equal sizes go to the earlier group.
//!   Modules qualifying for no group go to the `shared` catch-all.
//!
//! Modules are visited in graph registration order, so the result only
//! depends on the graph.

use std::sync::Arc;

use bale_graph::{Module, ModuleGraph, ModuleId};
use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::SplitPolicy;
use crate::{Error, Result};

/// Name of the group taking shared modules no configured group accepts.
pub const DEFAULT_SHARED_CHUNK: &str = "shared";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkKind {
    /// The chunk of one entry point; it ends by loading `entry`.
    Entry { entry: ModuleId },
    Shared,
}

/// A group of modules emitted as one file.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub name: String,
    pub kind: ChunkKind,
    /// Modules in registration order.
    pub modules: Vec<Arc<Module>>,
    /// Shared chunks an entry chunk needs loaded first, in emission order.
    pub requires: Vec<String>,
}

impl Chunk {
    fn new(name: impl Into<String>, kind: ChunkKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modules: Vec::new(),
            requires: Vec::new(),
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self.kind, ChunkKind::Entry { .. })
    }

    /// Total size of module code.
    pub fn size(&self) -> usize {
        self.modules.iter().map(|m| m.size()).sum()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.iter().any(|m| &m.id == id)
    }
}

struct Group {
    test: Option<Regex>,
    min_chunks: usize,
    chunk: Chunk,
    size: usize,
}

impl Group {
    fn accepts(&self, module: &Module, reached_by: usize) -> bool {
        reached_by >= self.min_chunks
            && self
                .test
                .as_ref()
                .is_none_or(|test| test.is_match(module.id.name()))
    }
}

/// Partition the graph into entry chunks followed by non-empty shared chunks.
///
/// Modules not reachable from any entry point (left over from a failed
/// entry) are not part of any chunk.
pub fn split(graph: &ModuleGraph, policy: &SplitPolicy) -> Result<Vec<Chunk>> {
    let entries = graph.entry_points();
    let reach: Vec<FxHashSet<ModuleId>> = entries
        .iter()
        .map(|(_, id)| graph.reachable_from(id))
        .collect();

    let mut entry_chunks: Vec<Chunk> = entries
        .iter()
        .map(|(name, id)| Chunk::new(name, ChunkKind::Entry { entry: id.clone() }))
        .collect();

    let mut groups = build_groups(policy)?;
    let catch_all = match groups.iter().position(|g| g.chunk.name == DEFAULT_SHARED_CHUNK) {
        Some(index) => index,
        None => {
            groups.push(Group {
                test: None,
                min_chunks: 2,
                chunk: Chunk::new(DEFAULT_SHARED_CHUNK, ChunkKind::Shared),
                size: 0,
            });
            groups.len() - 1
        }
    };

    for module in graph.modules() {
        let reached: Vec<usize> = reach
            .iter()
            .enumerate()
            .filter(|(_, set)| set.contains(&module.id))
            .map(|(index, _)| index)
            .collect();

        match reached.as_slice() {
            [] => debug!(module = %module.id, "unreachable module left out of chunks"),
            [only] => entry_chunks[*only].modules.push(module),
            _ => {
                let target = groups
                    .iter()
                    .enumerate()
                    .filter(|(_, group)| group.accepts(&module, reached.len()))
                    .min_by_key(|(index, group)| (group.size, *index))
                    .map(|(index, _)| index)
                    .unwrap_or(catch_all);
                let group = &mut groups[target];
                group.size += module.size();
                group.chunk.modules.push(module);
            }
        }
    }

    let shared: Vec<Chunk> = groups
        .into_iter()
        .map(|group| group.chunk)
        .filter(|chunk| !chunk.modules.is_empty())
        .collect();

    for (chunk, reachable) in entry_chunks.iter_mut().zip(&reach) {
        chunk.requires = shared
            .iter()
            .filter(|s| s.modules.iter().any(|m| reachable.contains(&m.id)))
            .map(|s| s.name.clone())
            .collect();
    }

    debug!(
        entries = entry_chunks.len(),
        shared = shared.len(),
        "graph split into chunks"
    );

    entry_chunks.extend(shared);
    Ok(entry_chunks)
}

fn build_groups(policy: &SplitPolicy) -> Result<Vec<Group>> {
    policy
        .groups
        .iter()
        .map(|group| {
            let test = group
                .test
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| {
                    Error::InvalidConfig(format!(
                        "split group '{}' has an invalid test pattern: {}",
                        group.name, e
                    ))
                })?;
            Ok(Group {
                test,
                min_chunks: group.min_chunks,
                chunk: Chunk::new(&group.name, ChunkKind::Shared),
                size: 0,
            })
        })
        .collect()
}
