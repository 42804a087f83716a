use std::fmt;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

/// Identity of a module: its cleaned absolute path.
///
/// The `name` is the path relative to the project root with `/` separators.
/// It is what emitted code uses as the module key, so output does not depend
/// on where the project is checked out. Modules outside the root get a
/// `../` name, which no module inside the root can have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    path: PathBuf,
    name: String,
}

impl ModuleId {
    /// Create an id for `path`, naming it relative to `root`.
    pub fn new(path: impl AsRef<Path>, root: impl AsRef<Path>) -> Self {
        let path = path.as_ref().clean();
        let name = display_name(&path, root.as_ref());
        Self { path, name }
    }

    /// Absolute path of the module source.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Root-relative, `/`-separated name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory imports of this module are resolved from.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn display_name(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root.clean()).unwrap_or_else(|| path.to_path_buf());
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}
