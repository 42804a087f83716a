use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ModuleId;

/// Script dialects, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Js,
    Jsx,
    Ts,
    Tsx,
}

/// Stylesheet dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    Css,
    /// SCSS syntax (`.scss`)
    Scss,
    /// Indented Sass syntax (`.sass`)
    Sass,
    /// `.less` files, read as plain CSS
    Less,
}

/// Structured data formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Json,
    Xml,
    Csv,
}

/// Binary assets that are copied verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryKind {
    Image,
    Font,
}

/// Detected kind of a module's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "dialect", rename_all = "lowercase")]
pub enum AssetKind {
    Script(ScriptKind),
    Style(StyleKind),
    Data(DataKind),
    Binary(BinaryKind),
}

impl AssetKind {
    /// Detect the kind from a path's extension. `None` for unknown extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let kind = match ext.as_str() {
            "js" | "mjs" | "cjs" => AssetKind::Script(ScriptKind::Js),
            "jsx" => AssetKind::Script(ScriptKind::Jsx),
            "ts" | "mts" | "cts" => AssetKind::Script(ScriptKind::Ts),
            "tsx" => AssetKind::Script(ScriptKind::Tsx),
            "css" => AssetKind::Style(StyleKind::Css),
            "scss" => AssetKind::Style(StyleKind::Scss),
            "sass" => AssetKind::Style(StyleKind::Sass),
            "less" => AssetKind::Style(StyleKind::Less),
            "json" => AssetKind::Data(DataKind::Json),
            "xml" => AssetKind::Data(DataKind::Xml),
            "csv" => AssetKind::Data(DataKind::Csv),
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "avif" | "ico" | "bmp" => {
                AssetKind::Binary(BinaryKind::Image)
            }
            "woff" | "woff2" | "eot" | "ttf" | "otf" => AssetKind::Binary(BinaryKind::Font),
            _ => return None,
        };
        Some(kind)
    }

    /// Short label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Script(_) => "script",
            AssetKind::Style(_) => "style",
            AssetKind::Data(_) => "data",
            AssetKind::Binary(_) => "binary",
        }
    }
}

/// An asset produced while loading a module that is not part of its code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideOutput {
    /// Extracted stylesheet text, merged per chunk.
    Stylesheet { css: String },
    /// A file copied to the output directory under `name` (already hashed).
    File { name: String, bytes: Vec<u8> },
}

/// A loaded module.
///
/// Created once per resolved path and never mutated afterwards; the graph and
/// the cache share it through `Arc`.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub kind: AssetKind,
    /// Raw bytes as read from disk.
    pub source: Vec<u8>,
    /// Import specifiers in source order, unresolved.
    pub imports: Vec<String>,
    /// Code evaluated by the bundle runtime.
    pub code: String,
    pub side_outputs: Vec<SideOutput>,
}

impl Module {
    /// Size used for shared-group balancing.
    pub fn size(&self) -> usize {
        self.code.len()
    }

    pub fn stylesheets(&self) -> impl Iterator<Item = &str> {
        self.side_outputs.iter().filter_map(|output| match output {
            SideOutput::Stylesheet { css } => Some(css.as_str()),
            SideOutput::File { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_kinds_from_extension() {
        assert_eq!(
            AssetKind::from_path(Path::new("src/index.jsx")),
            Some(AssetKind::Script(ScriptKind::Jsx))
        );
        assert_eq!(
            AssetKind::from_path(Path::new("src/statistics.TS")),
            Some(AssetKind::Script(ScriptKind::Ts))
        );
        assert_eq!(
            AssetKind::from_path(Path::new("styles/main.scss")),
            Some(AssetKind::Style(StyleKind::Scss))
        );
        assert_eq!(
            AssetKind::from_path(Path::new("less/style.less")),
            Some(AssetKind::Style(StyleKind::Less))
        );
        assert_eq!(
            AssetKind::from_path(Path::new("data/table.csv")),
            Some(AssetKind::Data(DataKind::Csv))
        );
        assert_eq!(
            AssetKind::from_path(Path::new("assets/logo.woff2")),
            Some(AssetKind::Binary(BinaryKind::Font))
        );
    }

    #[test]
    fn test_unknown_extensions_have_no_kind() {
        assert_eq!(AssetKind::from_path(Path::new("Makefile")), None);
        assert_eq!(AssetKind::from_path(Path::new("notes.txt")), None);
    }
}
