//! Pipeline driver.
//!
//! A [`Pipeline`] owns everything a build needs: resolver, loader chain,
//! module cache and emitter, all built from one explicit [`BuildConfig`].
//! The cache outlives single builds, so [`Pipeline::rebuild`] only reloads
//! what changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bale_graph::{
    AssetKind, CancellationToken, EntryPoint, GraphBuilder, ModuleGraph, Resolver, Runtime,
    StyleKind,
};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::emit::{EmittedFile, Emitter, Manifest};
use crate::loaders::LoaderChain;
use crate::split::split;
use crate::{Error, Result};

/// Per-chunk summary of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub name: String,
    pub modules: usize,
    pub entry: bool,
}

/// Everything a finished build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub manifest: Manifest,
    /// Written files in write order.
    pub files: Vec<EmittedFile>,
    pub chunks: Vec<ChunkSummary>,
    pub module_count: usize,
    /// Bare specifiers left to the host page.
    pub externals: Vec<String>,
    pub duration: Duration,
}

/// Result of a watch-mode rebuild.
#[derive(Debug)]
pub enum RebuildOutcome {
    /// Output was written.
    Built(BuildReport),
    /// Nothing was written; the previous output is untouched.
    Failed(Vec<Error>),
    /// A newer change superseded this build before emission.
    Cancelled,
}

pub struct Pipeline {
    config: BuildConfig,
    entries: Vec<EntryPoint>,
    builder: GraphBuilder,
    emitter: Emitter,
    /// Modules of the last graph walk, successful or not.
    known: Mutex<FxHashMap<PathBuf, AssetKind>>,
}

impl Pipeline {
    /// Validate `config` and set up the build.
    pub fn new(config: BuildConfig, runtime: Arc<dyn Runtime>) -> Result<Self> {
        config.validate()?;

        let resolver = Resolver::new(config.resolve_config(), runtime.clone());
        let loader = Arc::new(LoaderChain::from_config(&config));
        let builder = GraphBuilder::new(
            runtime.clone(),
            resolver,
            loader,
            config.absolute(Path::new("")),
            config.context_path(),
        );
        let emitter = Emitter::new(&config, runtime);
        let entries = config
            .entries
            .iter()
            .map(|(name, specifier)| EntryPoint::new(name, specifier))
            .collect();

        Ok(Self {
            config,
            entries,
            builder,
            emitter,
            known: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn out_dir(&self) -> &Path {
        self.emitter.out_dir()
    }

    /// One-shot build. The first failing entry aborts the build before any
    /// file is written.
    pub async fn build(&self) -> Result<BuildReport> {
        let start = Instant::now();
        info!(entries = self.entries.len(), mode = %self.config.mode, "build started");

        let outcome = self
            .builder
            .build(&self.entries, &CancellationToken::new())
            .await?;
        self.remember(&outcome.graph);
        let graph = outcome.into_result()?;
        self.finish(graph, start).await
    }

    /// Rebuild after `changed` paths were modified.
    ///
    /// Changed modules are dropped from the cache; everything else is reused.
    /// A path the last walk did not load (a Sass partial pulled in by the
    /// compiler, a new file) also drops every Sass module, since their
    /// compiled output may depend on it.
    ///
    /// Cancellation is honoured up to emission; once writing starts the
    /// build runs to completion.
    pub async fn rebuild(&self, changed: &[PathBuf], cancel: &CancellationToken) -> RebuildOutcome {
        let start = Instant::now();
        let invalidated = self.invalidate(changed);
        debug!(changed = changed.len(), invalidated, "rebuild started");

        let outcome = match self.builder.build(&self.entries, cancel).await {
            Ok(outcome) => outcome,
            Err(bale_graph::Error::Cancelled) => return RebuildOutcome::Cancelled,
            Err(error) => return RebuildOutcome::Failed(vec![error.into()]),
        };
        self.remember(&outcome.graph);

        if !outcome.is_ok() {
            let errors: Vec<Error> = outcome
                .failures
                .into_iter()
                .map(|failure| {
                    warn!(entry = %failure.entry, error = %failure.error, "entry failed, keeping previous output");
                    failure.error.into()
                })
                .collect();
            return RebuildOutcome::Failed(errors);
        }
        if cancel.is_cancelled() {
            return RebuildOutcome::Cancelled;
        }

        match self.finish(outcome.graph, start).await {
            Ok(report) => RebuildOutcome::Built(report),
            Err(error) => RebuildOutcome::Failed(vec![error]),
        }
    }

    fn invalidate(&self, changed: &[PathBuf]) -> usize {
        let known = self.known.lock();
        let mut paths: Vec<&Path> = changed.iter().map(PathBuf::as_path).collect();

        if changed.iter().any(|path| !known.contains_key(path)) {
            paths.extend(known.iter().filter_map(|(path, kind)| match kind {
                AssetKind::Style(StyleKind::Scss | StyleKind::Sass) => Some(path.as_path()),
                _ => None,
            }));
        }
        self.builder.invalidate(paths)
    }

    fn remember(&self, graph: &ModuleGraph) {
        *self.known.lock() = graph
            .modules()
            .iter()
            .map(|module| (module.id.as_path().to_path_buf(), module.kind))
            .collect();
    }

    async fn finish(&self, graph: ModuleGraph, start: Instant) -> Result<BuildReport> {
        let chunks = split(&graph, &self.config.split)?;
        let emitted = self.emitter.emit(&chunks, &graph).await?;
        let mut externals: Vec<String> = graph
            .external_dependencies()
            .into_iter()
            .map(|dep| dep.specifier)
            .collect();
        externals.sort();

        let report = BuildReport {
            manifest: emitted.manifest,
            files: emitted.files,
            chunks: chunks
                .iter()
                .map(|chunk| ChunkSummary {
                    name: chunk.name.clone(),
                    modules: chunk.modules.len(),
                    entry: chunk.is_entry(),
                })
                .collect(),
            module_count: graph.len(),
            externals,
            duration: start.elapsed(),
        };
        info!(
            modules = report.module_count,
            chunks = report.chunks.len(),
            files = report.files.len(),
            elapsed_ms = report.duration.as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }
}
