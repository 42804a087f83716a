use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::Runtime;

/// Look up `candidate` as-is, then with each extension appended, then as a
/// directory containing `index` with each extension. Every checked path is
/// pushed onto `tried`.
pub(crate) fn find_file(
    runtime: &dyn Runtime,
    candidate: &Path,
    extensions: &[String],
    tried: &mut Vec<PathBuf>,
) -> Option<PathBuf> {
    if candidate.extension().is_some() {
        tried.push(candidate.to_path_buf());
        if runtime.is_file(candidate) {
            return Some(candidate.to_path_buf());
        }
    }

    for ext in extensions {
        let with_ext = append_extension(candidate, ext);
        tried.push(with_ext.clone());
        if runtime.is_file(&with_ext) {
            return Some(with_ext);
        }
    }

    for ext in extensions {
        let index = append_extension(&candidate.join("index"), ext);
        tried.push(index.clone());
        if runtime.is_file(&index) {
            return Some(index);
        }
    }

    None
}

/// `foo.config` + `.js` is `foo.config.js`, never `foo.js`.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_existing_dots() {
        assert_eq!(
            append_extension(Path::new("/p/foo.config"), ".js"),
            PathBuf::from("/p/foo.config.js")
        );
    }
}
