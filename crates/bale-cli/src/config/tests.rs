#![cfg(test)]

use super::*;
use crate::cli::{BuildArgs, ModeArg};
use crate::error::{CliError, ConfigError};
use bale_bundler::{Devtool, Mode};
use figment::Jail;
use std::path::{Path, PathBuf};

fn load(args: &BuildArgs, dir: &Path) -> ProjectConfig {
    ProjectConfig::load(args, dir).unwrap()
}

#[test]
fn test_defaults_without_config_file() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        let project = load(&BuildArgs::default(), jail.directory());

        assert_eq!(project.root, jail.directory());
        assert!(project.file.is_none());
        assert_eq!(project.config.mode, Mode::Development);
        assert_eq!(project.config.output.path, PathBuf::from("dist"));
        assert_eq!(project.config.watch.debounce_ms, 100);
        assert!(project.config.entry.is_empty());
        Ok(())
    });
}

#[test]
fn test_source_priority() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.create_file(
            CONFIG_FILE,
            r#"{
                "mode": "development",
                "entry": { "main": "./index.js" },
                "output": { "path": "build", "publicPath": "/static/" }
            }"#,
        )?;
        let dir = jail.directory().to_path_buf();

        jail.set_env("NODE_ENV", "production");
        assert_eq!(load(&BuildArgs::default(), &dir).config.mode, Mode::Production);

        jail.set_env("BALE_MODE", "development");
        assert_eq!(load(&BuildArgs::default(), &dir).config.mode, Mode::Development);

        let args = BuildArgs {
            mode: Some(ModeArg::Production),
            ..Default::default()
        };
        let project = load(&args, &dir);
        assert_eq!(project.config.mode, Mode::Production);
        assert_eq!(project.file, Some(dir.join(CONFIG_FILE)));
        assert_eq!(project.config.output.public_path, "/static/");
        Ok(())
    });
}

#[test]
fn test_env_nested_keys_merge_with_file() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.create_file(
            CONFIG_FILE,
            r#"{ "entry": { "main": "./index.js" }, "output": { "publicPath": "/" } }"#,
        )?;
        jail.set_env("BALE_OUTPUT__PATH", "out");
        jail.set_env("BALE_CLEAN", "true");

        let project = load(&BuildArgs::default(), jail.directory());
        assert_eq!(project.config.output.path, PathBuf::from("out"));
        assert_eq!(project.config.output.public_path, "/");
        assert!(project.config.clean);
        Ok(())
    });
}

#[test]
fn test_env_sets_camel_case_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.set_env("BALE_OUTPUT__CSS_FILENAME", "styles/[name].css");
        jail.set_env("BALE_OUTPUT__PUBLIC_PATH", "/static/");
        jail.set_env("BALE_WATCH__DEBOUNCE_MS", "250");

        let project = load(&BuildArgs::default(), jail.directory());
        assert_eq!(project.config.output.css_filename, "styles/[name].css");
        assert_eq!(project.config.output.public_path, "/static/");
        assert_eq!(project.config.watch.debounce_ms, 250);
        Ok(())
    });
}

#[test]
fn test_unrelated_bale_variables_are_skipped() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.set_env("BALE_TOKEN", "secret");
        jail.set_env("BALE_HOME", "/opt/bale");
        jail.set_env("BALE_CLEAN", "true");

        let project = load(&BuildArgs::default(), jail.directory());
        assert!(project.config.clean);
        Ok(())
    });
}

#[test]
fn test_unrecognised_node_env_is_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.set_env("NODE_ENV", "test");
        let project = load(&BuildArgs::default(), jail.directory());
        assert_eq!(project.config.mode, Mode::Development);
        Ok(())
    });
}

#[test]
fn test_cli_entries_replace_config_entries() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.create_file(
            CONFIG_FILE,
            r#"{ "entry": { "main": "./index.js", "stat": "./statistics.js" } }"#,
        )?;
        let dir = jail.directory().to_path_buf();
        let args = BuildArgs {
            entry: vec![("admin".to_string(), "src/admin.js".to_string())],
            out_dir: Some(PathBuf::from("public")),
            clean: true,
            ..Default::default()
        };

        let project = load(&args, &dir);
        let entries: Vec<_> = project.config.entry.iter().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "admin");
        assert_eq!(
            PathBuf::from(entries[0].1),
            dir.join("src").join("admin.js")
        );
        assert_eq!(project.config.output.path, dir.join("public"));
        assert!(project.config.clean);
        Ok(())
    });
}

#[test]
fn test_explicit_config_sets_root() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        std::fs::create_dir_all(jail.directory().join("site")).unwrap();
        jail.create_file("site/custom.json", r#"{ "entry": { "main": "./a.js" } }"#)?;
        let dir = jail.directory().to_path_buf();
        let args = BuildArgs {
            config: Some(PathBuf::from("site/custom.json")),
            ..Default::default()
        };

        let project = load(&args, &dir);
        assert_eq!(project.root, dir.join("site"));
        assert_eq!(project.to_build_config().out_dir_path(), dir.join("site/dist"));
        Ok(())
    });
}

#[test]
fn test_missing_explicit_config() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        let args = BuildArgs {
            config: Some(PathBuf::from("nope.json")),
            ..Default::default()
        };
        let err = ProjectConfig::load(&args, jail.directory()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
        Ok(())
    });
}

#[test]
fn test_unknown_field_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.create_file(CONFIG_FILE, r#"{ "entry": {}, "outDir": "dist" }"#)?;
        let err = ProjectConfig::load(&BuildArgs::default(), jail.directory()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::InvalidValue { .. })));
        assert!(err.to_string().contains("outDir"));
        Ok(())
    });
}

#[test]
fn test_validate() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        let dir = jail.directory().to_path_buf();

        let project = load(&BuildArgs::default(), &dir);
        let err = project.validate().unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::MissingField { ref field, .. }) if field == "entry"
        ));

        jail.create_file(
            CONFIG_FILE,
            r#"{ "context": "src", "entry": { "main": "./index.js" } }"#,
        )?;
        let err = load(&BuildArgs::default(), &dir).validate().unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "context"
        ));

        std::fs::create_dir_all(dir.join("src")).unwrap();
        assert!(load(&BuildArgs::default(), &dir).validate().is_ok());
        Ok(())
    });
}

#[test]
fn test_to_build_config() {
    Jail::expect_with(|jail| {
        jail.set_env("NODE_ENV", "");
        jail.create_file(
            CONFIG_FILE,
            r#"{
                "mode": "production",
                "context": "src",
                "entry": { "main": "./index.jsx", "stat": "./statistics.ts" },
                "alias": { "@": "src" },
                "extensions": [".ts", ".js"],
                "output": { "filename": "[name].js", "hashFilenames": false },
                "devtool": "source-map",
                "plugins": { "script": ["typescript"] },
                "splitChunks": { "groups": [{ "name": "vendor", "test": "^lib/", "minChunks": 2 }] },
                "html": { "title": "Demo" },
                "copy": [{ "from": "public/robots.txt" }]
            }"#,
        )?;
        let dir = jail.directory().to_path_buf();
        let build = load(&BuildArgs::default(), &dir).to_build_config();

        assert_eq!(build.mode, Mode::Production);
        assert_eq!(build.context_path(), dir.join("src"));
        assert_eq!(
            build.entries.keys().map(String::as_str).collect::<Vec<_>>(),
            ["main", "stat"]
        );
        assert_eq!(
            build.resolve_config().aliases.get("@"),
            Some(&dir.join("src"))
        );
        assert_eq!(build.resolve.extensions, [".ts", ".js"]);
        assert!(!build.hashed());
        assert_eq!(build.devtool, Some(Devtool::SourceMap));
        assert!(build.source_maps());
        assert_eq!(build.plugins.script.len(), 1);
        assert!(build.plugins.has_style(bale_bundler::StylePlugin::Sass));
        assert_eq!(build.split.groups[0].name, "vendor");
        assert_eq!(build.split.groups[0].min_chunks, 2);
        assert_eq!(build.html.as_ref().map(|html| html.title.as_str()), Some("Demo"));
        assert_eq!(build.html.as_ref().map(|html| html.filename.as_str()), Some("index.html"));
        assert_eq!(build.copy.len(), 1);
        assert!(build.validate().is_ok());
        Ok(())
    });
}
