use bale_graph::{BinaryKind, LoadOutput, SideOutput};

use super::StageContext;
use super::script::js_string;
use crate::emit::asset_name;

/// Copy a binary file under its hashed name and export the public URL.
pub(super) fn emit(
    ctx: &StageContext<'_>,
    kind: BinaryKind,
    bytes: Vec<u8>,
) -> Result<LoadOutput, String> {
    let file_name = ctx
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| "asset path has no file name".to_string())?;
    let template = match kind {
        BinaryKind::Image => &ctx.options.image_filename,
        BinaryKind::Font => &ctx.options.font_filename,
    };
    let output_name = asset_name(&file_name, template, &bytes);

    let url = format!("{}{}", ctx.options.public_path, output_name);
    Ok(LoadOutput {
        code: format!("module.exports = {};\n", js_string(&url)),
        imports: Vec::new(),
        side_outputs: vec![SideOutput::File {
            name: output_name,
            bytes,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::hash::content_hash;
    use crate::loaders::LoaderOptions;
    use std::path::Path;

    fn options() -> LoaderOptions {
        LoaderOptions {
            typescript: true,
            jsx: true,
            sass: true,
            minify: false,
            public_path: "/static/".into(),
            image_filename: "assets/images/[name].[hash][ext]".into(),
            font_filename: "assets/fonts/[name].[hash:8][ext]".into(),
        }
    }

    #[test]
    fn test_image_is_copied_under_hashed_name() {
        let options = options();
        let ctx = StageContext {
            path: Path::new("/p/src/assets/logo.svg"),
            options: &options,
        };
        let bytes = b"<svg/>".to_vec();
        let hash = content_hash(&bytes);

        let out = emit(&ctx, BinaryKind::Image, bytes.clone()).unwrap();
        let expected = format!("assets/images/logo.{}.svg", hash);
        assert_eq!(
            out.code,
            format!("module.exports = \"/static/{}\";\n", expected)
        );
        assert_eq!(
            out.side_outputs,
            vec![SideOutput::File {
                name: expected,
                bytes
            }]
        );
    }

    #[test]
    fn test_font_template_truncates_hash() {
        let options = options();
        let ctx = StageContext {
            path: Path::new("/p/fonts/Roboto.woff2"),
            options: &options,
        };
        let out = emit(&ctx, BinaryKind::Font, vec![1, 2, 3]).unwrap();
        let SideOutput::File { name, .. } = &out.side_outputs[0] else {
            panic!("expected a file side output");
        };
        assert!(name.starts_with("assets/fonts/Roboto."));
        assert!(name.ends_with(".woff2"));
        assert_eq!(name.len(), "assets/fonts/Roboto.".len() + 8 + ".woff2".len());
    }
}
