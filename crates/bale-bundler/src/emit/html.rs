//! HTML page generation.

use super::manifest::Manifest;

fn default_page(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{}</title>\n</head>\n<body>\n</body>\n</html>\n",
        escape(title)
    )
}

/// Inject stylesheet links and deferred scripts for every entry point.
///
/// Links go before `</head>` and scripts before `</body>`; a page missing
/// either tag gets the tags appended instead.
pub(crate) fn render_page(
    template: Option<&str>,
    title: &str,
    manifest: &Manifest,
    public_path: &str,
) -> String {
    let mut page = match template {
        Some(template) => template.to_string(),
        None => default_page(title),
    };
    let (js, css) = manifest.page_files();

    let links: String = css
        .iter()
        .map(|file| {
            format!(
                "  <link rel=\"stylesheet\" href=\"{}{}\">\n",
                public_path,
                escape(file)
            )
        })
        .collect();
    let scripts: String = js
        .iter()
        .map(|file| {
            format!(
                "  <script defer src=\"{}{}\"></script>\n",
                public_path,
                escape(file)
            )
        })
        .collect();

    insert_before(&mut page, "</head>", &links);
    insert_before(&mut page, "</body>", &scripts);
    page
}

fn insert_before(page: &mut String, tag: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    match page.rfind(tag) {
        Some(at) => page.insert_str(at, text),
        None => page.push_str(text),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
