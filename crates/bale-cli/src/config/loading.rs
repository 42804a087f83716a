use bale_bundler::Mode;
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::BaleConfig;
use crate::cli::BuildArgs;
use crate::error::{ConfigError, Result};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "bale.config.json";

/// Top-level fields that `BALE_*` variables may set. Other `BALE_*`
/// variables are not configuration and are skipped.
const ENV_FIELDS: &[&str] = &[
    "mode",
    "context",
    "entry",
    "alias",
    "extensions",
    "output",
    "devtool",
    "minify",
    "plugins",
    "splitChunks",
    "html",
    "copy",
    "clean",
    "watch",
];

/// A loaded configuration and the directory its relative paths belong to.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Directory of the config file, or the working directory without one.
    pub root: PathBuf,
    /// The config file that was read, if any.
    pub file: Option<PathBuf>,
    pub config: BaleConfig,
}

impl ProjectConfig {
    /// Load and merge every configuration source, then apply `args`.
    ///
    /// `cwd` anchors `--config`, `--out-dir` and `--entry` paths.
    pub fn load(args: &BuildArgs, cwd: &Path) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                let path = cwd.join(path).clean();
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let path = cwd.join(CONFIG_FILE);
                path.is_file().then_some(path)
            }
        };
        let root = file
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());

        let mut config: BaleConfig = Self::figment(file.as_deref())
            .extract()
            .map_err(|e| ConfigError::InvalidValue {
                field: if e.path.is_empty() {
                    "configuration".to_string()
                } else {
                    e.path.join(".")
                },
                value: e.kind.to_string(),
                hint: format!(
                    "Check {} for typos and field types",
                    file.as_deref()
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| "BALE_* environment variables".to_string())
                ),
            })?;
        apply_args(&mut config, args, cwd);

        debug!(root = %root.display(), file = ?file, mode = %config.mode, "configuration loaded");
        Ok(Self { root, file, config })
    }

    /// Every source except the command line, lowest priority first.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(BaleConfig::default()));

        if let Some(path) = file {
            figment = figment.merge(Json::file(path));
        }

        if let Some(mode) = node_env_mode() {
            figment = figment.merge(Serialized::default("mode", mode));
        }

        figment.merge(env_provider())
    }
}

/// `BALE_MODE`, `BALE_OUTPUT__CSS_FILENAME`, `BALE_WATCH__DEBOUNCE_MS`, ...
fn env_provider() -> Env {
    Env::prefixed("BALE_")
        .map(|key| env_key(key.as_str()).into())
        .filter(|key| {
            let field = key.as_str().split('.').next().unwrap_or_default();
            ENV_FIELDS.contains(&field)
        })
        .lowercase(false)
}

/// `OUTPUT__CSS_FILENAME` becomes `output.cssFilename`.
fn env_key(name: &str) -> String {
    name.split("__").map(camel_case).collect::<Vec<_>>().join(".")
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
        let word = word.to_ascii_lowercase();
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if i > 0 => {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(&word),
        }
    }
    out
}

fn node_env_mode() -> Option<Mode> {
    let value = std::env::var("NODE_ENV").ok()?;
    match value.parse() {
        Ok(mode) => Some(mode),
        Err(_) => {
            debug!(node_env = %value, "ignoring NODE_ENV that is not a build mode");
            None
        }
    }
}

/// Flags win over every other source. `--entry` replaces the configured
/// entries rather than adding to them.
fn apply_args(config: &mut BaleConfig, args: &BuildArgs, cwd: &Path) {
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if !args.entry.is_empty() {
        config.entry = args
            .entry
            .iter()
            .map(|(name, path)| {
                let path = cwd.join(path).clean();
                (name.clone(), path.to_string_lossy().into_owned())
            })
            .collect();
    }
    if let Some(dir) = &args.out_dir {
        config.output.path = cwd.join(dir).clean();
    }
    if args.clean {
        config.clean = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_is_camel_cased_per_segment() {
        assert_eq!(env_key("MODE"), "mode");
        assert_eq!(env_key("OUTPUT__CSS_FILENAME"), "output.cssFilename");
        assert_eq!(env_key("WATCH__DEBOUNCE_MS"), "watch.debounceMs");
        assert_eq!(env_key("SPLIT_CHUNKS"), "splitChunks");
    }
}
