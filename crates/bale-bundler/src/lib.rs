#![cfg_attr(docsrs, feature(doc_cfg))]

//! # bale-bundler
//!
//! Loader chains, chunk splitting and content-hashed emission on top of the
//! `bale-graph` foundation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bale_bundler::{BuildConfig, Mode, Pipeline};
//! use bale_graph::runtime::native::NativeRuntime;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::new("/project")
//!     .context("src")
//!     .entry("main", "./index.jsx")
//!     .entry("stat", "./statistics.ts")
//!     .alias("@", "src")
//!     .mode(Mode::Production);
//!
//! let pipeline = Pipeline::new(config, Arc::new(NativeRuntime::new()))?;
//! let report = pipeline.build().await?;
//! for (name, files) in &report.manifest.entrypoints {
//!     println!("{name}: {:?}", files.js);
//! }
//! # Ok(()) }
//! ```

pub use bale_graph::{
    AssetKind, CancellationToken, EntryPoint, LoaderError, Module, ModuleGraph, ModuleId,
    ResolutionError, Runtime, RuntimeError,
};

pub mod config;
pub mod emit;
pub mod loaders;
pub mod pipeline;
pub mod split;

pub use config::{
    BuildConfig, CacheGroup, CopyPattern, Devtool, HtmlConfig, Mode, OutputConfig, PluginConfig,
    ScriptPlugin, SplitPolicy, StylePlugin,
};
pub use emit::{Emitted, EmittedFile, Emitter, EntryFiles, FileKind, Manifest};
pub use loaders::{LoaderChain, Stage};
pub use pipeline::{BuildReport, ChunkSummary, Pipeline, RebuildOutcome};
pub use split::{Chunk, ChunkKind};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

use std::path::PathBuf;

/// Error types for bale-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An import specifier matched no file.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A loader stage failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Writing an output file failed. Files written before it stay on disk.
    #[error("Failed to write {}: {source}", .path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Reading an input outside the module graph (html template, static copy).
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// The build was superseded by a newer one.
    #[error("Build cancelled")]
    Cancelled,
}

/// Result type alias for bale-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<bale_graph::Error> for Error {
    fn from(err: bale_graph::Error) -> Self {
        match err {
            bale_graph::Error::Resolution(e) => Error::Resolution(e),
            bale_graph::Error::Loader(e) => Error::Loader(e),
            bale_graph::Error::Cancelled => Error::Cancelled,
            bale_graph::Error::InvalidConfig(msg) => Error::InvalidConfig(msg),
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Resolution(_) => "RESOLUTION_ERROR",
            Error::Loader(_) => "LOADER_ERROR",
            Error::Emit { .. } => "EMIT_ERROR",
            Error::Read { .. } => "READ_ERROR",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::Cancelled => "BUILD_CANCELLED",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Resolution(err) => Some(Box::new(format!(
                "No file matched '{}' from {}.\nCheck the path, the alias table and the extension list.",
                err.specifier,
                err.from_dir.display()
            ))),
            Error::Loader(err) => Some(Box::new(format!(
                "The '{}' stage rejected {}.\nFix the source or enable the plugin for this file type.",
                err.stage,
                err.path.display()
            ))),
            Error::Emit { path, .. } => Some(Box::new(format!(
                "Could not write '{}'. Check disk space and permissions of the output directory.\nFiles written before this one were left in place.",
                path.display()
            ))),
            Error::Read { path, .. } => Some(Box::new(format!(
                "Check that '{}' exists and is readable.",
                path.display()
            ))),
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check your configuration file for errors.\nError: {}",
                msg
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays inside the output directory.",
                path
            ))),
            Error::Cancelled => None,
        }
    }
}
