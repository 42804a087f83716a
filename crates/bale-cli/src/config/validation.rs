use super::loading::ProjectConfig;
use crate::error::{ConfigError, Result};

impl ProjectConfig {
    /// Catch mistakes the bundler would only report mid-build.
    ///
    /// Structural checks (split groups, filename templates) are left to
    /// [`BuildConfig::validate`](bale_bundler::BuildConfig::validate).
    pub fn validate(&self) -> Result<()> {
        let config = &self.config;

        if config.entry.is_empty() {
            return Err(ConfigError::MissingField {
                field: "entry".to_string(),
                hint: format!(
                    "Add an \"entry\" map to {} or pass --entry NAME=PATH",
                    super::CONFIG_FILE
                ),
            }
            .into());
        }

        let context = self.root.join(&config.context);
        if !context.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "context".to_string(),
                value: context.display().to_string(),
                hint: "context must be an existing directory, relative to the config file"
                    .to_string(),
            }
            .into());
        }

        if let Some(template) = config.html.as_ref().and_then(|html| html.template.as_ref()) {
            let path = self.root.join(template);
            if !path.is_file() {
                return Err(ConfigError::InvalidValue {
                    field: "html.template".to_string(),
                    value: path.display().to_string(),
                    hint: "Point html.template at an existing file or remove it to use the built-in page"
                        .to_string(),
                }
                .into());
            }
        }

        if config.watch.debounce_ms > 10_000 {
            return Err(ConfigError::InvalidValue {
                field: "watch.debounceMs".to_string(),
                value: config.watch.debounce_ms.to_string(),
                hint: "Use a debounce between 0 and 10000 milliseconds".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
