use std::path::{Path, PathBuf};

/// Alias prefixes, longest key first so `@model` wins over `@`.
#[derive(Debug, Clone, Default)]
pub(crate) struct AliasTable {
    entries: Vec<(String, PathBuf)>,
}

impl AliasTable {
    pub(crate) fn new<I>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (String, PathBuf)>,
    {
        let mut entries: Vec<(String, PathBuf)> = aliases.into_iter().collect();
        // Stable sort keeps configuration order among equal lengths.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    /// Substitute the matching alias prefix. A key matches the whole specifier
    /// or a prefix followed by `/`.
    pub(crate) fn apply(&self, specifier: &str) -> Option<PathBuf> {
        self.entries.iter().find_map(|(key, dir)| {
            let rest = specifier.strip_prefix(key.as_str())?;
            if rest.is_empty() {
                Some(dir.clone())
            } else {
                rest.strip_prefix('/').map(|rest| join_rest(dir, rest))
            }
        })
    }
}

fn join_rest(dir: &Path, rest: &str) -> PathBuf {
    rest.split('/')
        .filter(|part| !part.is_empty())
        .fold(dir.to_path_buf(), |acc, part| acc.join(part))
}
