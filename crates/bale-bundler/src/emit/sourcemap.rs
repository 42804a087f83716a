use oxc_sourcemap::SourceMapBuilder;

use super::render::RenderedChunk;

/// Line-level source map: every line of a module body maps to column 0 of the
/// same line in that module's loaded code, which is embedded as
/// `sourcesContent`.
pub(crate) fn line_map(file: &str, rendered: &RenderedChunk<'_>) -> String {
    let mut builder = SourceMapBuilder::default();
    builder.set_file(file);

    for (start, module) in &rendered.bodies {
        let source = builder.add_source_and_content(module.id.name(), &module.code);
        let lines = module.code.lines().count() as u32;
        for line in 0..lines {
            builder.add_token(start + line, 0, line, 0, Some(source), None);
        }
    }

    builder.into_sourcemap().to_json_string()
}

/// Comment appended to a chunk that has a map next to it.
pub(crate) fn mapping_comment(map_file: &str) -> String {
    let base = map_file.rsplit('/').next().unwrap_or(map_file);
    format!("//# sourceMappingURL={}\n", base)
}
