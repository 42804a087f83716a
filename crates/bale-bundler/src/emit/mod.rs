//! Asset emission.
//!
//! Turns chunks into files in the output directory:
//!
//! ```text
//! chunks ──▶ render ──▶ hash ──▶ name (template) ──▶ write
//!               │                                      │
//!               └──▶ stylesheets, maps, binaries       └──▶ manifest.json
//! ```
//!
//! Names only depend on content, so every name is known before the first
//! write. Files are written in a fixed order: chunks, stylesheets, source
//! maps, binary assets, static copies, html, manifest.

pub mod hash;
mod html;
mod manifest;
mod render;
mod sourcemap;
pub mod template;
mod writer;

pub use manifest::{EntryFiles, Manifest};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bale_graph::{ModuleGraph, Runtime, SideOutput};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::config::{BuildConfig, HtmlConfig};
use crate::split::Chunk;
use crate::{Error, Result};
use hash::{combined_hash, content_hash};
use render::{RenderedChunk, render_chunk};
use template::{TemplateVars, name_and_ext, render};
use writer::OutputWriter;

/// What an emitted file is, for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Script,
    Stylesheet,
    SourceMap,
    Asset,
    Copy,
    Html,
    Manifest,
}

/// One file written by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Path relative to the output directory.
    pub name: String,
    pub kind: FileKind,
    pub size: usize,
}

/// Result of a successful emission.
#[derive(Debug, Clone, Default)]
pub struct Emitted {
    pub manifest: Manifest,
    /// Files in write order.
    pub files: Vec<EmittedFile>,
}

/// A static file copied verbatim.
#[derive(Debug, Clone)]
struct StaticCopy {
    from: PathBuf,
    to: String,
}

/// Writes chunks and their assets through a [`Runtime`].
#[derive(Debug)]
pub struct Emitter {
    runtime: Arc<dyn Runtime>,
    out_dir: PathBuf,
    filename: String,
    css_filename: String,
    manifest_name: String,
    public_path: String,
    hashed: bool,
    source_maps: bool,
    clean: bool,
    html: Option<(Option<PathBuf>, HtmlConfig)>,
    copies: Vec<StaticCopy>,
}

/// Chunk with everything needed to name and write it.
struct Prepared<'a> {
    chunk: &'a Chunk,
    rendered: RenderedChunk<'a>,
    js_hash: String,
    css: Option<(String, String)>,
}

/// Final names of one chunk's files.
struct ChunkFiles {
    js: String,
    css: Option<String>,
    map: Option<String>,
}

impl Emitter {
    pub fn new(config: &BuildConfig, runtime: Arc<dyn Runtime>) -> Self {
        let html = config.html.as_ref().map(|html| {
            let template = html.template.as_deref().map(|path| config.absolute(path));
            (template, html.clone())
        });
        let copies = config
            .copy
            .iter()
            .map(|pattern| {
                let from = config.absolute(&pattern.from);
                let to = pattern.to.clone().unwrap_or_else(|| {
                    from.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });
                StaticCopy { from, to }
            })
            .collect();

        Self {
            runtime,
            out_dir: config.out_dir_path(),
            filename: config.output.filename.clone(),
            css_filename: config.output.css_filename.clone(),
            manifest_name: config.output.manifest.clone(),
            public_path: config.output.public_path.clone(),
            hashed: config.hashed(),
            source_maps: config.source_maps(),
            clean: config.clean,
            html,
            copies,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write every chunk and asset, then the manifest.
    ///
    /// # Errors
    ///
    /// [`Error::Emit`] for the first failed write; files written before it
    /// stay on disk. [`Error::Read`] when a template or copy source cannot be
    /// read. [`Error::InvalidOutputPath`] when a rendered name leaves the
    /// output directory or two chunks render to the same file. Name checks
    /// run before anything is written.
    pub async fn emit(&self, chunks: &[Chunk], graph: &ModuleGraph) -> Result<Emitted> {
        let prepared: Vec<Prepared<'_>> = chunks
            .iter()
            .map(|chunk| {
                let rendered = render_chunk(chunk, graph);
                let js_hash = content_hash(rendered.code.as_bytes());
                let css = chunk_css(chunk).map(|css| {
                    let hash = content_hash(css.as_bytes());
                    (css, hash)
                });
                Prepared {
                    chunk,
                    rendered,
                    js_hash,
                    css,
                }
            })
            .collect();

        let full_hash = combined_hash(prepared.iter().flat_map(|p| {
            std::iter::once(p.js_hash.as_str()).chain(p.css.as_ref().map(|(_, h)| h.as_str()))
        }));
        let names: Vec<ChunkFiles> = prepared
            .iter()
            .map(|p| self.chunk_files(p, &full_hash))
            .collect();
        check_unique_names(&prepared, &names)?;

        let mut emitted = Emitted {
            manifest: manifest_for(&prepared, &names),
            files: Vec::new(),
        };
        let mut writer = OutputWriter::new(self.runtime.as_ref(), &self.out_dir);
        writer.prepare(self.clean).await?;
        info!(chunks = chunks.len(), dir = %self.out_dir.display(), "emitting");

        for (p, files) in prepared.iter().zip(&names) {
            let mut code = p.rendered.code.clone();
            if let Some(map) = &files.map {
                code.push_str(&sourcemap::mapping_comment(map));
            }
            write(&mut writer, &mut emitted, &files.js, code.as_bytes(), FileKind::Script).await?;
        }

        for (p, files) in prepared.iter().zip(&names) {
            if let (Some((css, _)), Some(name)) = (&p.css, &files.css) {
                write(&mut writer, &mut emitted, name, css.as_bytes(), FileKind::Stylesheet)
                    .await?;
            }
        }

        for (p, files) in prepared.iter().zip(&names) {
            if let Some(map) = &files.map {
                let json = sourcemap::line_map(&files.js, &p.rendered);
                write(&mut writer, &mut emitted, map, json.as_bytes(), FileKind::SourceMap)
                    .await?;
            }
        }

        let mut seen = FxHashSet::default();
        for chunk in chunks {
            for module in &chunk.modules {
                for output in &module.side_outputs {
                    if let SideOutput::File { name, bytes } = output {
                        if !seen.insert(name.as_str()) {
                            continue;
                        }
                        emitted
                            .manifest
                            .files
                            .insert(module.id.name().to_string(), name.clone());
                        write(&mut writer, &mut emitted, name, bytes, FileKind::Asset).await?;
                    }
                }
            }
        }

        for copy in &self.copies {
            let bytes = self.read(&copy.from).await?;
            emitted
                .manifest
                .files
                .insert(copy.to.clone(), copy.to.clone());
            write(&mut writer, &mut emitted, &copy.to, &bytes, FileKind::Copy).await?;
        }

        if let Some((template, html)) = &self.html {
            let template = match template {
                Some(path) => Some(String::from_utf8_lossy(&self.read(path).await?).into_owned()),
                None => None,
            };
            let page = html::render_page(
                template.as_deref(),
                &html.title,
                &emitted.manifest,
                &self.public_path,
            );
            emitted
                .manifest
                .files
                .insert(html.filename.clone(), html.filename.clone());
            write(&mut writer, &mut emitted, &html.filename, page.as_bytes(), FileKind::Html)
                .await?;
        }

        let json = emitted.manifest.to_json();
        write(
            &mut writer,
            &mut emitted,
            &self.manifest_name,
            json.as_bytes(),
            FileKind::Manifest,
        )
        .await?;

        debug!(files = writer.written().len(), "emission finished");
        Ok(emitted)
    }

    fn chunk_files(&self, p: &Prepared<'_>, full_hash: &str) -> ChunkFiles {
        let vars = |hash: &str, ext: &'static str| -> String {
            let hash = self.hashed.then_some(hash);
            let full_hash = self.hashed.then_some(full_hash);
            let template = if ext == ".css" {
                &self.css_filename
            } else {
                &self.filename
            };
            render(
                template,
                &TemplateVars {
                    name: &p.chunk.name,
                    ext,
                    hash,
                    full_hash,
                },
            )
        };

        let js = vars(&p.js_hash, ".js");
        let css = p.css.as_ref().map(|(_, hash)| vars(hash, ".css"));
        let map = self.source_maps.then(|| format!("{}.map", js));
        ChunkFiles { js, css, map }
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.runtime
            .read_file(path)
            .await
            .map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Stylesheets of a chunk's modules, in module order.
fn chunk_css(chunk: &Chunk) -> Option<String> {
    let sheets: Vec<&str> = chunk
        .modules
        .iter()
        .flat_map(|module| module.stylesheets())
        .collect();
    if sheets.is_empty() {
        return None;
    }
    let mut css = sheets.join("\n");
    if !css.ends_with('\n') {
        css.push('\n');
    }
    Some(css)
}

/// Two chunks rendering to one file would silently overwrite each other.
fn check_unique_names(prepared: &[Prepared<'_>], names: &[ChunkFiles]) -> Result<()> {
    let mut owners: FxHashMap<&str, &str> = FxHashMap::default();
    for (p, files) in prepared.iter().zip(names) {
        let chunk = p.chunk.name.as_str();
        let all = std::iter::once(files.js.as_str())
            .chain(files.css.as_deref())
            .chain(files.map.as_deref());
        for name in all {
            if let Some(other) = owners.insert(name, chunk) {
                return Err(Error::InvalidOutputPath(format!(
                    "chunks '{}' and '{}' both render to '{}'",
                    other, chunk, name
                )));
            }
        }
    }
    Ok(())
}

fn manifest_for(prepared: &[Prepared<'_>], names: &[ChunkFiles]) -> Manifest {
    let mut manifest = Manifest::default();
    for (p, files) in prepared.iter().zip(names) {
        let name = &p.chunk.name;
        manifest.files.insert(format!("{}.js", name), files.js.clone());
        if let Some(css) = &files.css {
            manifest.files.insert(format!("{}.css", name), css.clone());
        }
        if let Some(map) = &files.map {
            manifest.files.insert(format!("{}.js.map", name), map.clone());
        }
    }

    let by_name = |wanted: &str| {
        prepared
            .iter()
            .zip(names)
            .find(|(p, _)| p.chunk.name == wanted)
            .map(|(_, files)| files)
    };

    for p in prepared.iter().filter(|p| p.chunk.is_entry()) {
        let mut entry = EntryFiles::default();
        let own = by_name(p.chunk.name.as_str());
        for files in p
            .chunk
            .requires
            .iter()
            .filter_map(|name| by_name(name.as_str()))
            .chain(own)
        {
            entry.js.push(files.js.clone());
            if let Some(css) = &files.css {
                entry.css.push(css.clone());
            }
        }
        manifest.entrypoints.insert(p.chunk.name.clone(), entry);
    }
    manifest
}

async fn write(
    writer: &mut OutputWriter<'_>,
    emitted: &mut Emitted,
    name: &str,
    content: &[u8],
    kind: FileKind,
) -> Result<()> {
    writer.write(name, content).await?;
    emitted.files.push(EmittedFile {
        name: name.to_string(),
        kind,
        size: content.len(),
    });
    Ok(())
}

/// Output name of a binary asset: always content-hashed, so equally named
/// files from different directories do not collide.
pub(crate) fn asset_name(file_name: &str, template: &str, bytes: &[u8]) -> String {
    let (name, ext) = name_and_ext(file_name);
    let hash = content_hash(bytes);
    render(
        template,
        &TemplateVars {
            name,
            ext,
            hash: Some(&hash),
            full_hash: None,
        },
    )
}
