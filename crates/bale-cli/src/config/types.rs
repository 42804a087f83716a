use bale_bundler::OutputConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) fn default_context() -> PathBuf {
    PathBuf::from(".")
}

/// `output` section. Mirrors [`OutputConfig`] with config-file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct OutputOptions {
    /// Output directory.
    pub path: PathBuf,
    pub filename: String,
    pub css_filename: String,
    pub image_filename: String,
    pub font_filename: String,
    pub public_path: String,
    pub manifest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_filenames: Option<bool>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputConfig::default().into()
    }
}

/// `watch` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct WatchOptions {
    /// Quiet period before a batch of changes triggers a rebuild.
    pub debounce_ms: u64,
    /// Root-relative directories, or `*.ext` patterns, to ignore.
    pub ignore: Vec<String>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            ignore: vec!["node_modules".to_string()],
        }
    }
}
