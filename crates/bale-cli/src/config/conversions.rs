use bale_bundler::{BuildConfig, OutputConfig};

use super::loading::ProjectConfig;
use super::types::OutputOptions;

impl From<OutputConfig> for OutputOptions {
    fn from(output: OutputConfig) -> Self {
        Self {
            path: output.dir,
            filename: output.filename,
            css_filename: output.css_filename,
            image_filename: output.image_filename,
            font_filename: output.font_filename,
            public_path: output.public_path,
            manifest: output.manifest,
            hash_filenames: output.hash_filenames,
        }
    }
}

impl From<OutputOptions> for OutputConfig {
    fn from(output: OutputOptions) -> Self {
        Self {
            dir: output.path,
            filename: output.filename,
            css_filename: output.css_filename,
            image_filename: output.image_filename,
            font_filename: output.font_filename,
            public_path: output.public_path,
            manifest: output.manifest,
            hash_filenames: output.hash_filenames,
        }
    }
}

impl ProjectConfig {
    /// The bundler's view of this configuration, rooted at [`Self::root`].
    pub fn to_build_config(&self) -> BuildConfig {
        let config = &self.config;
        let mut build = BuildConfig::new(&self.root)
            .mode(config.mode)
            .context(&config.context)
            .plugins(config.plugins.clone())
            .clean(config.clean);

        build.entries = config.entry.clone();
        build.resolve.aliases = config.alias.clone();
        if let Some(extensions) = &config.extensions {
            build.resolve.extensions = extensions.clone();
        }
        build.output = config.output.clone().into();
        build.devtool = config.devtool;
        build.minify = config.minify;
        build.split = config.split_chunks.clone();
        build.html = config.html.clone();
        build.copy = config.copy.clone();
        build
    }
}
