//! The seam between graph construction and kind-specific transforms.

use std::path::{Path, PathBuf};

use crate::{AssetKind, SideOutput};

/// A stage-specific load failure.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Loader stage '{stage}' failed for {}: {message}", .path.display())]
pub struct LoaderError {
    /// Name of the failing stage (`parse`, `sass`, `json`, ...).
    pub stage: String,
    pub path: PathBuf,
    pub message: String,
}

impl LoaderError {
    pub fn new(stage: impl Into<String>, path: &Path, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result of running a module through its loader chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutput {
    /// Code evaluated by the bundle runtime.
    pub code: String,
    /// Import specifiers, unresolved, in source order.
    pub imports: Vec<String>,
    pub side_outputs: Vec<SideOutput>,
}

impl LoadOutput {
    /// Output with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }
}

/// Converts raw module bytes into a [`LoadOutput`].
///
/// Implementations are pure over their input: the graph builder caches the
/// result per path and never calls `load` twice for an unchanged file.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path, kind: AssetKind, source: &[u8]) -> Result<LoadOutput, LoaderError>;
}
