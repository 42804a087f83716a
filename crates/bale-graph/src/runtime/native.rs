//! Native Runtime Implementation
//!
//! Wraps `std::fs` behind the `Runtime` trait. Blocking calls run on tokio's
//! blocking pool so the async walk never stalls the executor.

// NativeRuntime is the one place allowed to touch std::fs directly
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::task;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Native filesystem Runtime implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a new NativeRuntime instance.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || {
            std::fs::read(&path).map_err(|e| RuntimeError::from_io(&path, "read", e))
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = path.to_path_buf();
        let content = content.to_vec();

        task::spawn_blocking(move || {
            std::fs::write(&path, content).map_err(|e| RuntimeError::from_io(&path, "write", e))
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || {
            let result = if recursive {
                std::fs::create_dir_all(&path)
            } else {
                std::fs::create_dir(&path)
            };
            result.map_err(|e| RuntimeError::from_io(&path, "create directory", e))
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    async fn remove_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        let path = path.to_path_buf();

        task::spawn_blocking(move || {
            std::fs::remove_dir_all(&path)
                .map_err(|e| RuntimeError::from_io(&path, "remove directory", e))
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|e| {
            RuntimeError::Io(format!("Failed to get current working directory: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_write_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        let runtime = NativeRuntime::new();
        runtime.write_file(&file_path, b"Hello, World!").await.unwrap();

        let read_content = runtime.read_file(&file_path).await.unwrap();
        assert_eq!(read_content, b"Hello, World!");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let runtime = NativeRuntime::new();

        let err = runtime
            .read_file(&temp_dir.path().join("missing.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_is_file_distinguishes_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("dir")).unwrap();
        fs::write(temp_dir.path().join("file.js"), b"x").unwrap();

        let runtime = NativeRuntime::new();
        assert!(runtime.is_file(&temp_dir.path().join("file.js")));
        assert!(!runtime.is_file(&temp_dir.path().join("dir")));
        assert!(runtime.exists(&temp_dir.path().join("dir")));
    }

    #[tokio::test]
    async fn test_create_and_remove_dir_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("c");

        let runtime = NativeRuntime::new();
        runtime.create_dir(&nested_path, true).await.unwrap();
        assert!(nested_path.is_dir());

        runtime
            .remove_dir_all(&temp_dir.path().join("a"))
            .await
            .unwrap();
        assert!(!temp_dir.path().join("a").exists());
    }
}
