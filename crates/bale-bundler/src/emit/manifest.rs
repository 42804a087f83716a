use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Files an entry point needs, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFiles {
    pub js: Vec<String>,
    pub css: Vec<String>,
}

/// Logical name to emitted file, written as `manifest.json`.
///
/// Paths are relative to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// `main.js`, `main.css`, `main.js.map`, asset module names, copies.
    pub files: IndexMap<String, String>,
    /// Per entry: required shared chunks first, then the entry's own files.
    pub entrypoints: IndexMap<String, EntryFiles>,
}

impl Manifest {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Every file of every entry point, without repeats, in manifest order.
    pub fn page_files(&self) -> (Vec<&str>, Vec<&str>) {
        let mut js: Vec<&str> = Vec::new();
        let mut css: Vec<&str> = Vec::new();
        for files in self.entrypoints.values() {
            for file in &files.css {
                if !css.contains(&file.as_str()) {
                    css.push(file);
                }
            }
            for file in &files.js {
                if !js.contains(&file.as_str()) {
                    js.push(file);
                }
            }
        }
        (js, css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_files_dedupe_shared_chunks() {
        let mut manifest = Manifest::default();
        manifest.entrypoints.insert(
            "main".into(),
            EntryFiles {
                js: vec!["shared.js".into(), "main.js".into()],
                css: vec!["main.css".into()],
            },
        );
        manifest.entrypoints.insert(
            "stat".into(),
            EntryFiles {
                js: vec!["shared.js".into(), "stat.js".into()],
                css: Vec::new(),
            },
        );
        let (js, css) = manifest.page_files();
        assert_eq!(js, vec!["shared.js", "main.js", "stat.js"]);
        assert_eq!(css, vec!["main.css"]);
    }

    #[test]
    fn test_manifest_json_parses_back() {
        let mut manifest = Manifest::default();
        manifest.files.insert("main.js".into(), "main.1234.js".into());
        let parsed: Manifest = serde_json::from_str(&manifest.to_json()).unwrap();
        assert_eq!(parsed, manifest);
    }
}
