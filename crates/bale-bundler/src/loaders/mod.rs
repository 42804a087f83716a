//! Loader chains.
//!
//! A module's chain is a list of [`Stage`] values derived from its kind and
//! the configured plugins. Stages are plain data; [`Stage::run`] is the only
//! place that interprets them, so there is no way to inject arbitrary code
//! into a chain.
//!
//! ```text
//! script  parse ─▶ transform? ─▶ module ─▶ minify?
//! style   sass? ─▶ css ─▶ extract      (.less goes straight to css)
//! data    json | xml | csv ─▶ serialize
//! binary  asset
//! ```

mod asset;
mod data;
pub(crate) mod script;
mod style;

use std::path::Path;

use bale_graph::{
    AssetKind, BinaryKind, DataKind, LoadOutput, LoaderError, ModuleLoader, ScriptKind, StyleKind,
};
use tracing::{trace, warn};

use crate::config::{BuildConfig, ScriptPlugin, StylePlugin};

/// One step of a loader chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Parse script source. Flags select the accepted syntax.
    Parse { typescript: bool, jsx: bool },
    /// Strip types and compile JSX, then print JavaScript.
    Transform { typescript: bool, jsx: bool },
    /// Rewrite ESM syntax into the bundle runtime's module-function form.
    Module,
    /// Reprint module code without whitespace.
    Minify,
    /// Compile SCSS (`indented: false`) or Sass to CSS.
    Sass { indented: bool },
    /// Parse CSS, lift relative `@import` rules into imports.
    Css { minify: bool },
    /// Move the CSS into a stylesheet side-output.
    Extract,
    Json,
    Xml,
    Csv,
    /// Print a data value as module code.
    Serialize,
    /// Copy bytes to a hashed asset file and export its URL.
    Asset { kind: BinaryKind },
}

impl Stage {
    /// Name reported in [`LoaderError::stage`].
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Parse { .. } => "parse",
            Stage::Transform { .. } => "transform",
            Stage::Module => "module",
            Stage::Minify => "minify",
            Stage::Sass { .. } => "sass",
            Stage::Css { .. } => "css",
            Stage::Extract => "extract",
            Stage::Json => "json",
            Stage::Xml => "xml",
            Stage::Csv => "csv",
            Stage::Serialize => "serialize",
            Stage::Asset { .. } => "asset",
        }
    }

    /// Run this stage on `value`.
    pub(crate) fn run(&self, ctx: &StageContext<'_>, value: Value) -> Result<Value, LoaderError> {
        let fail = |message: String| LoaderError::new(self.name(), ctx.path, message);

        match (self, value) {
            (Stage::Parse { typescript, jsx }, value) => {
                let source = value.into_text().map_err(fail)?;
                script::check_syntax(&source, *typescript, *jsx).map_err(fail)?;
                Ok(Value::Source(source))
            }
            (Stage::Transform { typescript, jsx }, Value::Source(source)) => {
                script::transform(ctx.path, &source, *typescript, *jsx)
                    .map(Value::Source)
                    .map_err(fail)
            }
            (Stage::Module, Value::Source(source)) => {
                script::to_module(&source).map(Value::Output).map_err(fail)
            }
            (Stage::Minify, Value::Output(mut output)) => {
                output.code = script::minify(&output.code).map_err(fail)?;
                Ok(Value::Output(output))
            }
            (Stage::Sass { indented }, value) => {
                let source = value.into_text().map_err(fail)?;
                style::compile_sass(ctx.path, &source, *indented)
                    .map(Value::Source)
                    .map_err(fail)
            }
            (Stage::Css { minify }, value) => {
                let source = value.into_text().map_err(fail)?;
                let (css, imports) = style::process_css(ctx.path, &source, *minify).map_err(fail)?;
                Ok(Value::Style { css, imports })
            }
            (Stage::Extract, Value::Style { css, imports }) => {
                Ok(Value::Output(style::extract(css, imports)))
            }
            (Stage::Json, value) => {
                let source = value.into_text().map_err(fail)?;
                data::parse_json(&source).map(Value::Data).map_err(fail)
            }
            (Stage::Xml, value) => {
                let source = value.into_text().map_err(fail)?;
                data::parse_xml(&source).map(Value::Data).map_err(fail)
            }
            (Stage::Csv, value) => {
                let source = value.into_text().map_err(fail)?;
                data::parse_csv(&source).map(Value::Data).map_err(fail)
            }
            (Stage::Serialize, Value::Data(data)) => {
                data::serialize(&data).map(Value::Output).map_err(fail)
            }
            (Stage::Asset { kind }, Value::Bytes(bytes)) => {
                asset::emit(ctx, *kind, bytes).map(Value::Output).map_err(fail)
            }
            (_, value) => Err(fail(format!("unexpected {} input", value.label()))),
        }
    }
}

/// Data flowing between stages.
#[derive(Debug)]
pub(crate) enum Value {
    Bytes(Vec<u8>),
    Source(String),
    Style { css: String, imports: Vec<String> },
    Data(serde_json::Value),
    Output(LoadOutput),
}

impl Value {
    fn label(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "binary",
            Value::Source(_) => "source",
            Value::Style { .. } => "stylesheet",
            Value::Data(_) => "data",
            Value::Output(_) => "module",
        }
    }

    fn into_text(self) -> Result<String, String> {
        match self {
            Value::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|e| format!("source is not valid UTF-8: {}", e))
            }
            Value::Source(text) => Ok(text),
            other => Err(format!("expected source text, got {}", other.label())),
        }
    }
}

/// Per-module inputs shared by every stage.
pub(crate) struct StageContext<'a> {
    pub path: &'a Path,
    pub options: &'a LoaderOptions,
}

/// Loader settings taken from the build configuration.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub typescript: bool,
    pub jsx: bool,
    pub sass: bool,
    pub minify: bool,
    pub public_path: String,
    pub image_filename: String,
    pub font_filename: String,
}

impl LoaderOptions {
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            typescript: config.plugins.has_script(ScriptPlugin::Typescript),
            jsx: config.plugins.has_script(ScriptPlugin::Jsx),
            sass: config.plugins.has_style(StylePlugin::Sass),
            minify: config.minified(),
            public_path: config.output.public_path.clone(),
            image_filename: config.output.image_filename.clone(),
            font_filename: config.output.font_filename.clone(),
        }
    }
}

/// The fixed dispatcher: maps a module kind to its stages and runs them.
#[derive(Debug, Clone)]
pub struct LoaderChain {
    options: LoaderOptions,
}

impl LoaderChain {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(LoaderOptions::from_config(config))
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Stages applied to a module of `kind`, in execution order.
    pub fn stages(&self, kind: AssetKind) -> Vec<Stage> {
        let opts = &self.options;
        match kind {
            AssetKind::Script(script) => {
                let typescript = opts.typescript && matches!(script, ScriptKind::Ts | ScriptKind::Tsx);
                let jsx = opts.jsx && !matches!(script, ScriptKind::Ts);
                let mut stages = vec![Stage::Parse { typescript, jsx }];
                if typescript || jsx {
                    stages.push(Stage::Transform { typescript, jsx });
                }
                stages.push(Stage::Module);
                if opts.minify {
                    stages.push(Stage::Minify);
                }
                stages
            }
            AssetKind::Style(style) => {
                let mut stages = Vec::new();
                match style {
                    StyleKind::Css | StyleKind::Less => {}
                    StyleKind::Scss => stages.push(Stage::Sass { indented: false }),
                    StyleKind::Sass => stages.push(Stage::Sass { indented: true }),
                }
                stages.push(Stage::Css {
                    minify: opts.minify,
                });
                stages.push(Stage::Extract);
                stages
            }
            AssetKind::Data(data) => {
                let parse = match data {
                    DataKind::Json => Stage::Json,
                    DataKind::Xml => Stage::Xml,
                    DataKind::Csv => Stage::Csv,
                };
                vec![parse, Stage::Serialize]
            }
            AssetKind::Binary(kind) => vec![Stage::Asset { kind }],
        }
    }

    fn plugin_error(&self, path: &Path, kind: AssetKind) -> Option<LoaderError> {
        match kind {
            AssetKind::Style(StyleKind::Scss | StyleKind::Sass) if !self.options.sass => {
                Some(LoaderError::new(
                    "sass",
                    path,
                    "the sass plugin is not enabled for style modules",
                ))
            }
            _ => None,
        }
    }
}

impl ModuleLoader for LoaderChain {
    fn load(&self, path: &Path, kind: AssetKind, source: &[u8]) -> Result<LoadOutput, LoaderError> {
        if let Some(err) = self.plugin_error(path, kind) {
            return Err(err);
        }
        if kind == AssetKind::Style(StyleKind::Less) {
            warn!(path = %path.display(), "Less is not compiled, reading the file as plain CSS");
        }

        let ctx = StageContext {
            path,
            options: &self.options,
        };
        let mut value = Value::Bytes(source.to_vec());
        for stage in self.stages(kind) {
            trace!(path = %path.display(), stage = stage.name(), "running stage");
            value = stage.run(&ctx, value)?;
        }

        match value {
            Value::Output(output) => Ok(output),
            other => Err(LoaderError::new(
                "module",
                path,
                format!("chain ended with {} instead of module code", other.label()),
            )),
        }
    }
}
