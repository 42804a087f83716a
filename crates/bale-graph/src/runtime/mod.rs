//! Filesystem runtime abstraction.
//!
//! Every read the graph builder performs and every write the emitter performs
//! goes through the `Runtime` trait. The native implementation wraps `std::fs`;
//! tests use [`test_utils::TestRuntime`], which can refuse writes under a
//! directory to simulate an unwritable output location.

pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Write refused (read-only location, permissions)
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

impl RuntimeError {
    pub(crate) fn from_io(path: &Path, action: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => RuntimeError::FileNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                RuntimeError::PermissionDenied(path.to_path_buf())
            }
            _ => RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), err)),
        }
    }
}

/// Platform runtime trait
///
/// Reads are whole-file and writes replace the target; no handle outlives a
/// single call.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file to the filesystem
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Create a directory
    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// Remove a directory and everything below it
    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path exists and is a regular file.
    ///
    /// Synchronous so that resolution stays a plain function over the
    /// filesystem state.
    fn is_file(&self, path: &Path) -> bool;

    /// Get the current working directory
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;
}
