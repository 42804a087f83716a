//! Build configuration types.
//!
//! `BuildConfig` is the single explicit input of a [`Pipeline`](crate::Pipeline).
//! Nothing is read from the environment here; the CLI layers files, env vars
//! and flags on top and hands the merged result in.
//!
//! Relative paths (context, aliases, output dir, html template, copy sources)
//! are interpreted against `root`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bale_graph::ResolveConfig;
use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::split::DEFAULT_SHARED_CHUNK;
use crate::{Error, Result};

/// Build mode. Selects the defaults for hashing, source maps and minification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn is_production(self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(format!(
                "Invalid mode '{}'. Expected 'development' or 'production'",
                other
            )),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

/// Source map emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Devtool {
    None,
    /// External `<file>.map` plus a `sourceMappingURL` comment.
    SourceMap,
}

/// Extra stages for script modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptPlugin {
    /// Strip TypeScript syntax from `.ts`/`.tsx`.
    Typescript,
    /// Compile JSX (classic runtime) in `.js`/`.jsx`/`.tsx`.
    Jsx,
}

/// Extra stages for style modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePlugin {
    /// Compile `.scss` and `.sass`.
    Sass,
}

/// Per-kind plugin lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub script: Vec<ScriptPlugin>,
    #[serde(default)]
    pub style: Vec<StylePlugin>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            script: vec![ScriptPlugin::Typescript, ScriptPlugin::Jsx],
            style: vec![StylePlugin::Sass],
        }
    }
}

impl PluginConfig {
    pub fn has_script(&self, plugin: ScriptPlugin) -> bool {
        self.script.contains(&plugin)
    }

    pub fn has_style(&self, plugin: StylePlugin) -> bool {
        self.style.contains(&plugin)
    }
}

/// A named shared-chunk group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    pub name: String,
    /// Regex matched against the module's root-relative name.
    #[serde(default)]
    pub test: Option<String>,
    /// Minimum number of entries that must reach a module.
    #[serde(default = "default_min_chunks")]
    pub min_chunks: usize,
}

fn default_min_chunks() -> usize {
    2
}

impl CacheGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: None,
            min_chunks: default_min_chunks(),
        }
    }

    pub fn test(mut self, pattern: impl Into<String>) -> Self {
        self.test = Some(pattern.into());
        self
    }

    pub fn min_chunks(mut self, count: usize) -> Self {
        self.min_chunks = count;
        self
    }
}

/// Ordered shared groups. Modules matching none go to the `shared` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPolicy {
    #[serde(default)]
    pub groups: Vec<CacheGroup>,
}

/// HTML page generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlConfig {
    /// Template file; a minimal page is generated when absent.
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default = "default_html_filename")]
    pub filename: String,
    #[serde(default = "default_html_title")]
    pub title: String,
}

fn default_html_filename() -> String {
    "index.html".to_string()
}

fn default_html_title() -> String {
    "bale app".to_string()
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            template: None,
            filename: default_html_filename(),
            title: default_html_title(),
        }
    }
}

/// A static file copied into the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPattern {
    pub from: PathBuf,
    /// Output-relative destination. Defaults to the source file name.
    #[serde(default)]
    pub to: Option<String>,
}

impl CopyPattern {
    pub fn new(from: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: None,
        }
    }
}

/// Output directory, filename templates and manifest location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub filename: String,
    pub css_filename: String,
    pub image_filename: String,
    pub font_filename: String,
    /// Prefix of asset URLs exported by binary modules.
    pub public_path: String,
    pub manifest: String,
    /// Overrides the mode default for hashed chunk filenames.
    pub hash_filenames: Option<bool>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            filename: "[name].[contenthash].js".to_string(),
            css_filename: "[name].[contenthash].css".to_string(),
            image_filename: "assets/images/[name].[hash][ext]".to_string(),
            font_filename: "assets/fonts/[name].[hash][ext]".to_string(),
            public_path: String::new(),
            manifest: "manifest.json".to_string(),
            hash_filenames: None,
        }
    }
}

/// Everything a build needs, passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub mode: Mode,
    /// Project root. Module names are relative to it.
    pub root: PathBuf,
    /// Directory entry specifiers are resolved from.
    pub context: PathBuf,
    /// Entry name to specifier, in configuration order.
    pub entries: IndexMap<String, String>,
    pub resolve: ResolveConfig,
    pub output: OutputConfig,
    /// Overrides the mode default when set.
    pub devtool: Option<Devtool>,
    /// Overrides the mode default when set.
    pub minify: Option<bool>,
    pub plugins: PluginConfig,
    pub split: SplitPolicy,
    pub html: Option<HtmlConfig>,
    pub copy: Vec<CopyPattern>,
    /// Remove the output directory before writing.
    pub clean: bool,
}

impl BuildConfig {
    /// Configuration rooted at `root` with development defaults.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            mode: Mode::default(),
            context: root.clone(),
            root,
            entries: IndexMap::new(),
            resolve: ResolveConfig::default(),
            output: OutputConfig::default(),
            devtool: None,
            minify: None,
            plugins: PluginConfig::default(),
            split: SplitPolicy::default(),
            html: None,
            copy: Vec::new(),
            clean: false,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn context(mut self, dir: impl Into<PathBuf>) -> Self {
        self.context = dir.into();
        self
    }

    /// Add a named entry point.
    pub fn entry(mut self, name: impl Into<String>, specifier: impl Into<String>) -> Self {
        self.entries.insert(name.into(), specifier.into());
        self
    }

    /// Add a path alias (`@model` -> `src/model`).
    pub fn alias(mut self, key: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.resolve.aliases.insert(key.into(), dir.into());
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolve.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.dir = dir.into();
        self
    }

    pub fn hash_filenames(mut self, enabled: bool) -> Self {
        self.output.hash_filenames = Some(enabled);
        self
    }

    pub fn devtool(mut self, devtool: Devtool) -> Self {
        self.devtool = Some(devtool);
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = Some(enabled);
        self
    }

    pub fn plugins(mut self, plugins: PluginConfig) -> Self {
        self.plugins = plugins;
        self
    }

    /// Add a shared-chunk group.
    pub fn cache_group(mut self, group: CacheGroup) -> Self {
        self.split.groups.push(group);
        self
    }

    pub fn html(mut self, html: HtmlConfig) -> Self {
        self.html = Some(html);
        self
    }

    pub fn copy(mut self, pattern: CopyPattern) -> Self {
        self.copy.push(pattern);
        self
    }

    pub fn clean(mut self, enabled: bool) -> Self {
        self.clean = enabled;
        self
    }

    /// Hashed filenames: explicit setting, else on in production.
    pub fn hashed(&self) -> bool {
        self.output
            .hash_filenames
            .unwrap_or(self.mode.is_production())
    }

    /// Source maps: explicit devtool, else on in development.
    pub fn source_maps(&self) -> bool {
        match self.devtool {
            Some(devtool) => devtool == Devtool::SourceMap,
            None => !self.mode.is_production(),
        }
    }

    /// Minification: explicit setting, else on in production.
    pub fn minified(&self) -> bool {
        self.minify.unwrap_or(self.mode.is_production())
    }

    pub fn out_dir_path(&self) -> PathBuf {
        self.absolute(&self.output.dir)
    }

    pub fn context_path(&self) -> PathBuf {
        self.absolute(&self.context)
    }

    /// Resolve configuration with alias directories made absolute.
    pub fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            aliases: self
                .resolve
                .aliases
                .iter()
                .map(|(key, dir)| (key.clone(), self.absolute(dir)))
                .collect(),
            extensions: self.resolve.extensions.clone(),
        }
    }

    /// Join a relative path onto the root.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.root.join(path).clean()
        }
    }

    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when there are no entries, an entry
    /// takes the shared chunk's name, a group regex does not compile, a group has `min_chunks < 2`, or the chunk
    /// filename template lacks `[name]` (chunks would overwrite each other).
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one entry point is required".into(),
            ));
        }

        for (name, specifier) in &self.entries {
            if name.is_empty() || specifier.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "entry '{}' has an empty name or path",
                    name
                )));
            }
        }

        if self.entries.contains_key(DEFAULT_SHARED_CHUNK) {
            return Err(Error::InvalidConfig(format!(
                "entry name '{}' is reserved for the shared chunk",
                DEFAULT_SHARED_CHUNK
            )));
        }

        for group in &self.split.groups {
            if group.min_chunks < 2 {
                return Err(Error::InvalidConfig(format!(
                    "split group '{}' needs minChunks >= 2, got {}",
                    group.name, group.min_chunks
                )));
            }
            if let Some(test) = &group.test {
                regex::Regex::new(test).map_err(|e| {
                    Error::InvalidConfig(format!(
                        "split group '{}' has an invalid test pattern: {}",
                        group.name, e
                    ))
                })?;
            }
            if self.entries.contains_key(&group.name) {
                return Err(Error::InvalidConfig(format!(
                    "split group '{}' has the same name as an entry",
                    group.name
                )));
            }
        }

        for (label, template) in [
            ("filename", &self.output.filename),
            ("cssFilename", &self.output.css_filename),
        ] {
            if !template.contains("[name]") {
                return Err(Error::InvalidConfig(format!(
                    "output.{} must contain [name], got '{}'",
                    label, template
                )));
            }
        }

        if self.output.manifest.is_empty() {
            return Err(Error::InvalidConfig("output.manifest is empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BuildConfig {
        BuildConfig::new("/project").entry("main", "./index.js")
    }

    #[test]
    fn test_mode_defaults() {
        let dev = config();
        assert!(!dev.hashed());
        assert!(dev.source_maps());
        assert!(!dev.minified());

        let prod = config().mode(Mode::Production);
        assert!(prod.hashed());
        assert!(!prod.source_maps());
        assert!(prod.minified());
    }

    #[test]
    fn test_explicit_settings_override_mode() {
        let cfg = config()
            .mode(Mode::Production)
            .hash_filenames(false)
            .devtool(Devtool::SourceMap)
            .minify(false);
        assert!(!cfg.hashed());
        assert!(cfg.source_maps());
        assert!(!cfg.minified());
    }

    #[test]
    fn test_relative_paths_join_root() {
        let cfg = config().context("src").alias("@model", "src/model");
        assert_eq!(cfg.context_path(), PathBuf::from("/project/src"));
        assert_eq!(cfg.out_dir_path(), PathBuf::from("/project/dist"));
        assert_eq!(
            cfg.resolve_config().aliases.get("@model"),
            Some(&PathBuf::from("/project/src/model"))
        );
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());
        assert!(BuildConfig::new("/project").validate().is_err());
        assert!(
            config()
                .cache_group(CacheGroup::new("vendor").test("("))
                .validate()
                .is_err()
        );
        assert!(
            config()
                .cache_group(CacheGroup::new("vendor").min_chunks(1))
                .validate()
                .is_err()
        );

        let mut cfg = config();
        cfg.output.filename = "bundle.js".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_shared_chunk_name_is_reserved() {
        let err = config().entry("shared", "./a.js").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("shared")));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("production".parse::<Mode>().unwrap(), Mode::Production);
        assert_eq!("DEV".parse::<Mode>().unwrap(), Mode::Development);
        assert!("staging".parse::<Mode>().is_err());
    }
}
