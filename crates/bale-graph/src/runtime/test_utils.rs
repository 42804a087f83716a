//! Test utilities for bale crates.
//!
//! `TestRuntime` performs real filesystem I/O (tests run inside a
//! `tempfile::TempDir`) and adds hooks the native runtime lacks:
//!
//! - read counting, so tests can check that cached modules are not re-read
//! - write denial under a directory, which behaves like a read-only mount
//!   regardless of the user the tests run as
//! - read pauses, which hold a build in the middle of its graph walk

// Test utilities are allowed to use std::fs since they only run on native platforms
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Notify;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Filesystem runtime for tests with read counting and write denial.
///
/// ```rust
/// use bale_graph::runtime::Runtime;
/// use bale_graph::test_utils::TestRuntime;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let temp = tempfile::TempDir::new().unwrap();
/// let runtime = TestRuntime::new(temp.path());
/// runtime.deny_writes_under(temp.path().join("dist"));
///
/// let err = runtime.write_file(&temp.path().join("dist/a.js"), b"x").await;
/// assert!(err.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TestRuntime {
    cwd: PathBuf,
    denied: Arc<RwLock<Vec<PathBuf>>>,
    reads: Arc<RwLock<FxHashMap<PathBuf, usize>>>,
    pauses: Arc<RwLock<FxHashMap<PathBuf, ReadPause>>>,
}

/// Handle for a paused read, see [`TestRuntime::pause_next_read`].
#[derive(Debug, Clone, Default)]
pub struct ReadPause {
    reached: Arc<Notify>,
    released: Arc<Notify>,
}

impl ReadPause {
    /// Wait until the paused read has started.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    /// Let the paused read continue.
    pub fn release(&self) {
        self.released.notify_one();
    }
}

impl TestRuntime {
    /// Create a new test runtime with the specified working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            denied: Arc::new(RwLock::new(Vec::new())),
            reads: Arc::new(RwLock::new(FxHashMap::default())),
            pauses: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    /// Refuse every write and directory creation at or below `dir`.
    pub fn deny_writes_under(&self, dir: impl Into<PathBuf>) {
        self.denied.write().push(dir.into());
    }

    /// Hold the next read of `path` until the returned handle is released.
    /// Only one read is held; later reads go straight through.
    pub fn pause_next_read(&self, path: impl Into<PathBuf>) -> ReadPause {
        let pause = ReadPause::default();
        self.pauses.write().insert(path.into(), pause.clone());
        pause
    }

    /// Number of times `path` has been read through this runtime.
    pub fn read_count(&self, path: &Path) -> usize {
        self.reads.read().get(path).copied().unwrap_or(0)
    }

    fn check_writable(&self, path: &Path) -> RuntimeResult<()> {
        if self.denied.read().iter().any(|dir| path.starts_with(dir)) {
            return Err(RuntimeError::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        *self.reads.write().entry(path.to_path_buf()).or_default() += 1;
        let pause = self.pauses.write().remove(path);
        if let Some(pause) = pause {
            pause.reached.notify_one();
            pause.released.notified().await;
        }
        std::fs::read(path).map_err(|e| RuntimeError::from_io(path, "read", e))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        self.check_writable(path)?;
        std::fs::write(path, content).map_err(|e| RuntimeError::from_io(path, "write", e))
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        // Creating an already existing directory is not a write.
        if path.is_dir() {
            return Ok(());
        }
        self.check_writable(path)?;
        let result = if recursive {
            std::fs::create_dir_all(path)
        } else {
            std::fs::create_dir(path)
        };
        result.map_err(|e| RuntimeError::from_io(path, "create directory", e))
    }

    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        self.check_writable(path)?;
        std::fs::remove_dir_all(path).map_err(|e| RuntimeError::from_io(path, "remove directory", e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
