//! Specifier resolution.
//!
//! Order of checks:
//!
//! 1. alias prefixes (longest key first)
//! 2. relative (`./`, `../`) and absolute specifiers, joined onto the
//!    importing directory
//! 3. anything else is a bare package name and stays external
//!
//! Local candidates are then checked in order: the exact path, the candidate with each
//! configured extension, then `index` files. Lookup reads nothing but
//! file-existence through the [`Runtime`].

mod aliases;
mod lookup;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::Runtime;
use aliases::AliasTable;

/// Extensions tried when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".json", ".jsx", ".ts", ".tsx"];

/// Alias table and extension list, passed in explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Alias key to absolute directory.
    #[serde(default)]
    pub aliases: IndexMap<String, PathBuf>,
    /// Ordered extensions tried for extensionless specifiers.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            aliases: IndexMap::new(),
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A file on disk.
    Local(PathBuf),
    /// A bare package name, left to the host page.
    External(String),
}

/// No file matched the specifier.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Cannot resolve '{specifier}' from '{}'", .from_dir.display())]
pub struct ResolutionError {
    /// The specifier exactly as written in the importing module.
    pub specifier: String,
    /// Directory the search started from.
    pub from_dir: PathBuf,
    /// Every path that was checked, in order.
    pub tried: Vec<PathBuf>,
}

/// Maps `(specifier, directory)` to a file.
#[derive(Debug, Clone)]
pub struct Resolver {
    aliases: AliasTable,
    extensions: Vec<String>,
    runtime: Arc<dyn Runtime>,
}

impl Resolver {
    pub fn new(config: ResolveConfig, runtime: Arc<dyn Runtime>) -> Self {
        let extensions = config
            .extensions
            .into_iter()
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self {
            aliases: AliasTable::new(config.aliases),
            extensions,
            runtime,
        }
    }

    /// Resolve `specifier` as imported from a module in `from_dir`.
    pub fn resolve(&self, specifier: &str, from_dir: &Path) -> Result<Resolved, ResolutionError> {
        let candidate = if let Some(aliased) = self.aliases.apply(specifier) {
            aliased.clean()
        } else if is_path_like(specifier) {
            from_dir.join(specifier).clean()
        } else {
            return Ok(Resolved::External(specifier.to_string()));
        };

        let mut tried = Vec::new();
        match lookup::find_file(self.runtime.as_ref(), &candidate, &self.extensions, &mut tried) {
            Some(path) => {
                tracing::debug!(specifier, resolved = %path.display(), "resolved");
                Ok(Resolved::Local(path))
            }
            None => Err(ResolutionError {
                specifier: specifier.to_string(),
                from_dir: from_dir.to_path_buf(),
                tried,
            }),
        }
    }
}

fn is_path_like(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute()
}
