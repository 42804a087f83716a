//! Module graph construction.
//!
//! The walk is an iterative depth-first traversal per entry point. Each path
//! is in one of three states:
//!
//! - unseen: resolve, load (or take from the cache), mark in progress
//! - in progress: it is on the current walk stack, so this import closes a
//!   cycle; record the edge and do not re-enter
//! - done: already fully walked; record the edge and reuse the module
//!
//! A module is appended to the graph's registration order when it leaves the
//! stack, which yields dependencies-before-dependents order wherever the
//! graph is acyclic.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::{
    AssetKind, CancellationToken, Error, LoaderError, Module, ModuleCache, ModuleGraph, ModuleId,
    ModuleLoader, Resolved, Resolver, Result, Runtime,
};

/// A named entry point, given as a specifier resolved from the context
/// directory (so aliases and extension inference apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub specifier: String,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
        }
    }
}

/// An entry whose walk was aborted.
#[derive(Debug)]
pub struct EntryFailure {
    pub entry: String,
    pub error: Error,
}

/// Graph plus the entries that failed to build.
///
/// A one-shot build treats any failure as fatal; watch mode reports them and
/// keeps the previous output.
#[derive(Debug)]
pub struct GraphOutcome {
    pub graph: ModuleGraph,
    pub failures: Vec<EntryFailure>,
}

impl GraphOutcome {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the first failure into an error, for one-shot builds.
    pub fn into_result(mut self) -> Result<ModuleGraph> {
        if self.failures.is_empty() {
            Ok(self.graph)
        } else {
            Err(self.failures.remove(0).error)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

struct Frame {
    module: Arc<Module>,
    next_import: usize,
}

/// Builds a [`ModuleGraph`] from entry points.
pub struct GraphBuilder {
    runtime: Arc<dyn Runtime>,
    resolver: Resolver,
    loader: Arc<dyn ModuleLoader>,
    cache: ModuleCache,
    root: PathBuf,
    context: PathBuf,
}

impl GraphBuilder {
    /// `root` names modules; `context` is where entry specifiers resolve from.
    pub fn new(
        runtime: Arc<dyn Runtime>,
        resolver: Resolver,
        loader: Arc<dyn ModuleLoader>,
        root: impl Into<PathBuf>,
        context: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime,
            resolver,
            loader,
            cache: ModuleCache::new(),
            root: root.into(),
            context: context.into(),
        }
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// Drop cached modules for changed paths so the next build reloads them.
    pub fn invalidate<'a, I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a Path>,
    {
        self.cache.invalidate(paths)
    }

    /// Walk every entry point.
    ///
    /// Resolution and loader failures abort the walk of the entry they occur
    /// in and are collected in the outcome. Cancellation aborts the whole
    /// build with [`Error::Cancelled`].
    pub async fn build(
        &self,
        entries: &[EntryPoint],
        cancel: &CancellationToken,
    ) -> Result<GraphOutcome> {
        let graph = ModuleGraph::new();
        let mut visits: FxHashMap<PathBuf, Visit> = FxHashMap::default();
        let mut failures = Vec::new();

        for entry in entries {
            match self.walk_entry(&graph, &mut visits, entry, cancel).await {
                Ok(()) => {}
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(error) => {
                    debug!(entry = %entry.name, %error, "entry failed");
                    failures.push(EntryFailure {
                        entry: entry.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            modules = graph.len(),
            edges = graph.edge_count(),
            failed = failures.len(),
            "module graph built"
        );
        Ok(GraphOutcome { graph, failures })
    }

    async fn walk_entry(
        &self,
        graph: &ModuleGraph,
        visits: &mut FxHashMap<PathBuf, Visit>,
        entry: &EntryPoint,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let entry_path = match self.resolver.resolve(&entry.specifier, &self.context)? {
            Resolved::Local(path) => path,
            Resolved::External(specifier) => {
                return Err(Error::InvalidConfig(format!(
                    "Entry '{}' points at package '{}'; entries must be files",
                    entry.name, specifier
                )));
            }
        };
        let entry_id = ModuleId::new(&entry_path, &self.root);

        if visits.contains_key(&entry_path) {
            graph.add_entry_point(entry.name.clone(), entry_id);
            return Ok(());
        }

        let mut stack: Vec<Frame> = Vec::new();
        let result = self
            .walk(graph, visits, &mut stack, entry_path, cancel)
            .await;

        if result.is_err() {
            // Modules still on the stack never finished; forget them so a
            // later entry (or rebuild) retries them from scratch.
            for frame in stack {
                graph.remove_module(&frame.module.id);
                visits.remove(frame.module.id.as_path());
            }
            return result;
        }

        graph.add_entry_point(entry.name.clone(), entry_id);
        Ok(())
    }

    async fn walk(
        &self,
        graph: &ModuleGraph,
        visits: &mut FxHashMap<PathBuf, Visit>,
        stack: &mut Vec<Frame>,
        entry_path: PathBuf,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let module = self.enter(graph, visits, &entry_path, cancel).await?;
        stack.push(Frame {
            module,
            next_import: 0,
        });

        loop {
            let next = match stack.last_mut() {
                None => break,
                Some(frame) => {
                    if frame.next_import < frame.module.imports.len() {
                        let specifier = frame.module.imports[frame.next_import].clone();
                        frame.next_import += 1;
                        Some((frame.module.id.clone(), specifier))
                    } else {
                        None
                    }
                }
            };

            let Some((importer, specifier)) = next else {
                if let Some(frame) = stack.pop() {
                    visits.insert(frame.module.id.as_path().to_path_buf(), Visit::Done);
                    graph.complete_module(&frame.module.id);
                }
                continue;
            };

            let target = match self.resolver.resolve(&specifier, importer.dir())? {
                Resolved::External(package) => {
                    graph.add_external(&package, importer);
                    continue;
                }
                Resolved::Local(path) => path,
            };
            let target_id = ModuleId::new(&target, &self.root);

            match visits.get(&target).copied() {
                Some(Visit::InProgress) | Some(Visit::Done) => {
                    graph.add_edge(importer, target_id, specifier);
                }
                None => {
                    let module = self.enter(graph, visits, &target, cancel).await?;
                    graph.add_edge(importer, target_id, specifier);
                    stack.push(Frame {
                        module,
                        next_import: 0,
                    });
                }
            }
        }

        Ok(())
    }

    /// Load a module, insert it into the graph and mark it in progress.
    async fn enter(
        &self,
        graph: &ModuleGraph,
        visits: &mut FxHashMap<PathBuf, Visit>,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Arc<Module>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let module = self.load(path).await?;
        graph.add_module(module.clone());
        visits.insert(path.to_path_buf(), Visit::InProgress);
        Ok(module)
    }

    async fn load(&self, path: &Path) -> Result<Arc<Module>> {
        if let Some(module) = self.cache.get(path) {
            debug!(module = %module.id, "cache hit");
            return Ok(module);
        }

        let kind = AssetKind::from_path(path).ok_or_else(|| {
            LoaderError::new(
                "detect",
                path,
                "no loader handles this file extension",
            )
        })?;

        let source = self
            .runtime
            .read_file(path)
            .await
            .map_err(|e| LoaderError::new("read", path, e.to_string()))?;

        let output = self.loader.load(path, kind, &source)?;
        let id = ModuleId::new(path, &self.root);
        debug!(module = %id, kind = kind.label(), imports = output.imports.len(), "loaded");

        let module = Arc::new(Module {
            id,
            kind,
            source,
            imports: output.imports,
            code: output.code,
            side_outputs: output.side_outputs,
        });
        self.cache.insert(path.to_path_buf(), module.clone());
        Ok(module)
    }
}
