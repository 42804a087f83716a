//! Style stages: sass, css, extract.

use std::path::Path;

use bale_graph::{LoadOutput, SideOutput};
use lightningcss::{
    printer::PrinterOptions,
    rules::CssRule,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};

/// Compile SCSS or indented Sass. `@use` and `@import` resolve next to the file.
pub(super) fn compile_sass(path: &Path, source: &str, indented: bool) -> Result<String, String> {
    let mut options = grass::Options::default();
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    if indented {
        options = options.input_syntax(grass::InputSyntax::Sass);
    }
    grass::from_string(source.to_string(), &options).map_err(|e| e.to_string())
}

/// Parse CSS, remove local `@import` rules and return their URLs as imports.
///
/// `.less` files take this path too; a parse failure there says so, since
/// the cause is usually Less-only syntax.
pub(super) fn process_css(
    path: &Path,
    source: &str,
    minify: bool,
) -> Result<(String, Vec<String>), String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: path.to_string_lossy().to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| {
        if is_less(path) {
            format!(
                "{} (Less is not compiled: .less files must be plain CSS, without variables, mixins or guards)",
                e
            )
        } else {
            e.to_string()
        }
    })?;

    let mut imports = Vec::new();
    stylesheet.rules.0.retain(|rule| match rule {
        CssRule::Import(import) => match import_specifier(&import.url) {
            Some(specifier) => {
                imports.push(specifier);
                false
            }
            None => true,
        },
        _ => true,
    });

    if minify {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| e.to_string())?;
    }

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            ..Default::default()
        })
        .map_err(|e| e.to_string())?;

    Ok((result.code, imports))
}

fn is_less(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("less"))
}

/// Module specifier for a CSS `@import` URL, or `None` when the rule should
/// stay in the stylesheet (remote URLs).
///
/// CSS resolves `@import "base.css"` next to the importing file, so plain
/// names become `./base.css`. A leading `~` marks a package and `@` an alias.
fn import_specifier(url: &str) -> Option<String> {
    if url.contains("://") || url.starts_with("//") || url.starts_with("data:") {
        return None;
    }
    if let Some(package) = url.strip_prefix('~') {
        return Some(package.to_string());
    }
    if url.starts_with("./") || url.starts_with("../") || url.starts_with('/') || url.starts_with('@')
    {
        return Some(url.to_string());
    }
    Some(format!("./{}", url))
}

/// Move CSS into a stylesheet side-output. The module only marks its exports.
pub(super) fn extract(css: String, imports: Vec<String>) -> LoadOutput {
    LoadOutput {
        code: "__bale__.r(exports);\n".to_string(),
        imports,
        side_outputs: vec![SideOutput::Stylesheet { css }],
    }
}
