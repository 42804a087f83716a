//! Output writing.
//!
//! Every file name is validated against the output directory before it is
//! written, so a template like `../[name].js` cannot escape it. Writes go
//! through the [`Runtime`] one file at a time and are not rolled back: when
//! a write fails, files already written stay on disk.

use std::path::{Path, PathBuf};

use bale_graph::Runtime;
use path_clean::PathClean;
use tracing::trace;

use crate::{Error, Result};

pub(crate) struct OutputWriter<'a> {
    runtime: &'a dyn Runtime,
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl<'a> OutputWriter<'a> {
    pub(crate) fn new(runtime: &'a dyn Runtime, dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            dir: dir.into().clean(),
            written: Vec::new(),
        }
    }

    /// Create the output directory, removing it first when `clean` is set.
    pub(crate) async fn prepare(&self, clean: bool) -> Result<()> {
        if clean && self.runtime.exists(&self.dir) {
            self.runtime
                .remove_dir_all(&self.dir)
                .await
                .map_err(|source| Error::Emit {
                    path: self.dir.clone(),
                    source,
                })?;
        }
        self.runtime
            .create_dir(&self.dir, true)
            .await
            .map_err(|source| Error::Emit {
                path: self.dir.clone(),
                source,
            })
    }

    /// Write `content` to `name` inside the output directory.
    pub(crate) async fn write(&mut self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = validate_output_path(&self.dir, name)?;

        if let Some(parent) = path.parent().filter(|parent| *parent != self.dir) {
            self.runtime
                .create_dir(parent, true)
                .await
                .map_err(|source| Error::Emit {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        self.runtime
            .write_file(&path, content)
            .await
            .map_err(|source| Error::Emit {
                path: path.clone(),
                source,
            })?;

        trace!(path = %path.display(), bytes = content.len(), "wrote output file");
        self.written.push(path.clone());
        Ok(path)
    }

    /// Paths written so far, in write order.
    pub(crate) fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// Join `filename` onto `base_dir`, refusing names that leave it.
pub(crate) fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Filename is empty".to_string()));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bale_graph::test_utils::TestRuntime;
    use tempfile::TempDir;

    #[test]
    fn test_validate_output_path_nested() {
        let base = Path::new("/tmp/output");
        assert_eq!(
            validate_output_path(base, "assets/images/logo.svg").unwrap(),
            Path::new("/tmp/output/assets/images/logo.svg")
        );
        assert_eq!(
            validate_output_path(base, "./index.js").unwrap(),
            Path::new("/tmp/output/index.js")
        );
    }

    #[test]
    fn test_validate_output_path_traversal() {
        let base = Path::new("/tmp/output");
        let err = validate_output_path(base, "../etc/passwd").unwrap_err();
        assert!(matches!(err, Error::InvalidOutputPath(_)));
        assert!(validate_output_path(base, "safe/../../../../etc/passwd").is_err());
        assert!(validate_output_path(base, "/etc/passwd").is_err());
        assert!(validate_output_path(base, "file\0name.js").is_err());
        assert!(validate_output_path(base, ".").is_err());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_earlier_files() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path());
        let dist = temp.path().join("dist");
        runtime.deny_writes_under(dist.join("assets"));

        let mut writer = OutputWriter::new(&runtime, &dist);
        writer.prepare(false).await.unwrap();
        writer.write("main.js", b"ok").await.unwrap();

        let err = writer.write("assets/logo.svg", b"<svg/>").await.unwrap_err();
        assert!(matches!(err, Error::Emit { ref path, .. } if path.starts_with(dist.join("assets"))));
        assert!(dist.join("main.js").exists());
        assert_eq!(writer.written(), &[dist.join("main.js")]);
    }

    #[tokio::test]
    async fn test_prepare_cleans_output() {
        let temp = TempDir::new().unwrap();
        let runtime = TestRuntime::new(temp.path());
        let dist = temp.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("stale.js"), "old").unwrap();

        let writer = OutputWriter::new(&runtime, &dist);
        writer.prepare(true).await.unwrap();
        assert!(dist.is_dir());
        assert!(!dist.join("stale.js").exists());
    }
}
