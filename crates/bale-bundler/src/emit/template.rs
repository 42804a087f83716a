//! Filename templates.
//!
//! Supported placeholders: `[name]`, `[ext]` (with its leading dot),
//! `[hash]`, `[contenthash]`, `[chunkhash]` and `[fullhash]`. Hash
//! placeholders accept a length, e.g. `[contenthash:8]`. Unknown
//! placeholders are kept as written.
//!
//! Without hashes (development builds) every hash placeholder is dropped
//! together with one preceding `.`, `-` or `_`, so `[name].[contenthash].js`
//! renders as `main.js`.

/// Values substituted into a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateVars<'a> {
    pub name: &'a str,
    pub ext: &'a str,
    /// Content hash of the file, `None` when hashing is off.
    pub hash: Option<&'a str>,
    /// Hash over every chunk of the build.
    pub full_hash: Option<&'a str>,
}

pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let token = &after[..close];
        rest = &after[close + 1..];

        let (key, len) = match token.split_once(':') {
            Some((key, len)) => match len.parse::<usize>() {
                Ok(len) => (key, Some(len)),
                Err(_) => (token, None),
            },
            None => (token, None),
        };

        let hash = match key {
            "name" if len.is_none() => {
                out.push_str(vars.name);
                continue;
            }
            "ext" if len.is_none() => {
                out.push_str(vars.ext);
                continue;
            }
            "hash" | "contenthash" | "chunkhash" => vars.hash,
            "fullhash" => vars.full_hash.or(vars.hash),
            _ => {
                out.push('[');
                out.push_str(token);
                out.push(']');
                continue;
            }
        };

        match hash {
            Some(hash) => {
                let end = len.map_or(hash.len(), |len| len.min(hash.len()));
                out.push_str(&hash[..end]);
            }
            None => {
                if out.ends_with(['.', '-', '_']) {
                    out.pop();
                }
            }
        }
    }

    out.push_str(rest);
    out
}

/// Split a file name into the `[name]` and `[ext]` parts.
pub fn name_and_ext(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(dot) => (&file_name[..dot], &file_name[dot..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(name: &'a str, ext: &'a str, hash: Option<&'a str>) -> TemplateVars<'a> {
        TemplateVars {
            name,
            ext,
            hash,
            full_hash: Some("ffffffffffffffffffff"),
        }
    }

    #[test]
    fn test_hashed_names() {
        let hash = "0123456789abcdef0123";
        assert_eq!(
            render("[name].[contenthash].js", &vars("main", "", Some(hash))),
            "main.0123456789abcdef0123.js"
        );
        assert_eq!(
            render("assets/images/[name].[hash:8][ext]", &vars("logo", ".svg", Some(hash))),
            "assets/images/logo.01234567.svg"
        );
        assert_eq!(
            render("[name].[fullhash].css", &vars("stat", "", Some(hash))),
            "stat.ffffffffffffffffffff.css"
        );
    }

    #[test]
    fn test_unhashed_names_drop_placeholder_and_separator() {
        assert_eq!(render("[name].[contenthash].js", &vars("main", "", None)), "main.js");
        assert_eq!(render("[name]-[hash:8].css", &vars("main", "", None)), "main.css");
    }

    #[test]
    fn test_unknown_placeholders_are_kept() {
        assert_eq!(render("[id].[name].js", &vars("main", "", None)), "[id].main.js");
        assert_eq!(render("[name.js", &vars("main", "", None)), "[name.js");
    }

    #[test]
    fn test_name_and_ext() {
        assert_eq!(name_and_ext("logo.svg"), ("logo", ".svg"));
        assert_eq!(name_and_ext("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(name_and_ext(".env"), (".env", ""));
        assert_eq!(name_and_ext("README"), ("README", ""));
    }
}
