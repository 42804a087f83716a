//! # bale-graph
//!
//! Module identity, specifier resolution and dependency graph construction
//! for the bale asset bundler.
//!
//! ## Overview
//!
//! This crate owns everything that happens before chunking:
//!
//! - **Runtime**: the filesystem abstraction every read and write goes through
//! - **Resolver**: maps an import specifier plus a directory to a source file,
//!   applying aliases and extension inference
//! - **ModuleGraph**: modules, deduplicated edges and entry points
//! - **GraphBuilder**: walks the imports of every entry, loading each module
//!   once through a [`ModuleLoader`]
//!
//! Transforms themselves live in `bale-bundler`; the graph only sees the
//! [`LoadOutput`] they produce.
//!
//! ## Architecture
//!
//! ```text
//!   entries ──▶ GraphBuilder ──▶ Resolver ──▶ Runtime (is_file)
//!                   │
//!                   ├──▶ ModuleCache ──miss──▶ ModuleLoader
//!                   │
//!                   ▼
//!              ModuleGraph (modules + edges + entries)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bale_graph::runtime::native::NativeRuntime;
//! use bale_graph::{CancellationToken, EntryPoint, GraphBuilder, Resolver, ResolveConfig};
//! # use bale_graph::{AssetKind, LoadOutput, LoaderError, ModuleLoader};
//! # use std::path::Path;
//! use std::sync::Arc;
//!
//! # struct Passthrough;
//! # impl ModuleLoader for Passthrough {
//! #     fn load(&self, _: &Path, _: AssetKind, src: &[u8]) -> Result<LoadOutput, LoaderError> {
//! #         Ok(LoadOutput::code(String::from_utf8_lossy(src)))
//! #     }
//! # }
//! # async fn run() -> bale_graph::Result<()> {
//! let runtime = Arc::new(NativeRuntime::new());
//! let resolver = Resolver::new(ResolveConfig::default(), runtime.clone());
//! let builder = GraphBuilder::new(runtime, resolver, Arc::new(Passthrough), "/project", "/project/src");
//!
//! let outcome = builder
//!     .build(&[EntryPoint::new("main", "./index.js")], &CancellationToken::new())
//!     .await?;
//! println!("{} modules", outcome.graph.len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod cancel;
mod external_dep;
pub mod loader;
pub mod memory;
pub mod module;
mod module_id;
pub mod resolver;
pub mod runtime;

pub use builder::{EntryFailure, EntryPoint, GraphBuilder, GraphOutcome};
pub use cache::ModuleCache;
pub use cancel::CancellationToken;
pub use external_dep::ExternalDependency;
pub use loader::{LoadOutput, LoaderError, ModuleLoader};
pub use memory::{Edge, ModuleGraph};
pub use module::{AssetKind, BinaryKind, DataKind, Module, ScriptKind, SideOutput, StyleKind};
pub use module_id::ModuleId;
pub use resolver::{ResolutionError, ResolveConfig, Resolved, Resolver};
pub use runtime::{Runtime, RuntimeError, RuntimeResult};

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils;

/// Error types for graph construction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A specifier could not be mapped to a file.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A loader stage failed for a module.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// The walk was cancelled between module loads.
    #[error("Build cancelled")]
    Cancelled,

    /// Invalid input to the builder (e.g. an entry that is a package name).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;
