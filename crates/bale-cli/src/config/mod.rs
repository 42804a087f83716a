//! Configuration loading for the bale CLI.
//!
//! Sources, lowest to highest priority:
//!
//! 1. built-in defaults
//! 2. `bale.config.json` (or `--config`)
//! 3. `NODE_ENV` (`mode` only)
//! 4. `BALE_*` environment variables (`BALE_MODE`, `BALE_OUTPUT__PATH`, ...)
//! 5. command-line flags
//!
//! The merged [`BaleConfig`] is converted into the bundler's explicit
//! [`BuildConfig`](bale_bundler::BuildConfig); nothing downstream reads the
//! environment.

mod conversions;
mod loading;
mod tests;
mod types;
mod validation;

use bale_bundler::{CopyPattern, Devtool, HtmlConfig, Mode, PluginConfig, SplitPolicy};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loading::{CONFIG_FILE, ProjectConfig};
pub use types::{OutputOptions, WatchOptions};

/// Contents of `bale.config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BaleConfig {
    #[serde(default)]
    pub mode: Mode,

    /// Directory entry paths are resolved from, relative to the project root.
    #[serde(default = "types::default_context")]
    pub context: PathBuf,

    /// Entry name to module path, e.g. `{"main": "./index.js"}`.
    #[serde(default)]
    pub entry: IndexMap<String, String>,

    /// Import prefix to directory, e.g. `{"@model": "src/model"}`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub alias: IndexMap<String, PathBuf>,

    /// Extensions tried for extensionless imports, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    #[serde(default)]
    pub output: OutputOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<Devtool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,

    #[serde(default)]
    pub plugins: PluginConfig,

    #[serde(default)]
    pub split_chunks: SplitPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<HtmlConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy: Vec<CopyPattern>,

    /// Remove the output directory before writing.
    #[serde(default)]
    pub clean: bool,

    #[serde(default)]
    pub watch: WatchOptions,
}

impl Default for BaleConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            context: types::default_context(),
            entry: IndexMap::new(),
            alias: IndexMap::new(),
            extensions: None,
            output: OutputOptions::default(),
            devtool: None,
            minify: None,
            plugins: PluginConfig::default(),
            split_chunks: SplitPolicy::default(),
            html: None,
            copy: Vec::new(),
            clean: false,
            watch: WatchOptions::default(),
        }
    }
}
