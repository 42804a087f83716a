use std::path::Path;

/// Parse an `--entry` value.
///
/// Accepts `NAME=PATH` or a bare `PATH`, in which case the file stem
/// becomes the name (`src/admin.ts` is entry `admin`).
///
/// # Errors
///
/// Returns an error message when the name or path is empty or the name
/// contains a path separator.
pub fn parse_entry(s: &str) -> Result<(String, String), String> {
    let (name, path) = match s.split_once('=') {
        Some((name, path)) => (name.trim().to_string(), path.trim()),
        None => {
            let stem = Path::new(s.trim())
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            (stem, s.trim())
        }
    };

    if path.is_empty() {
        return Err(format!("Entry '{}' has no path", s));
    }
    if name.is_empty() {
        return Err(format!(
            "Entry '{}' has no name. Use NAME=PATH, e.g. main=src/index.js",
            s
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!(
            "Entry name '{}' cannot contain path separators",
            name
        ));
    }

    Ok((name, path.to_string()))
}
