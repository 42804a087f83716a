//! End-to-end tests of the `bale` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn bale(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bale").unwrap();
    cmd.current_dir(dir)
        .env_remove("NODE_ENV")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(
        src.join("index.js"),
        "import { message } from './message.js';\nimport './style.css';\nconsole.log(message);\n",
    )
    .unwrap();
    fs::write(src.join("message.js"), "export const message = 'hi';\n").unwrap();
    fs::write(src.join("style.css"), "body { margin: 0; }\n").unwrap();
    temp
}

#[test]
fn test_build_from_config_file() {
    let temp = project();
    fs::write(
        temp.path().join("bale.config.json"),
        r#"{ "context": "src", "entry": { "main": "./index.js" }, "html": { "title": "Demo" } }"#,
    )
    .unwrap();

    bale(temp.path())
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("Build Summary"))
        .stderr(predicate::str::contains("main.js"));

    let dist = temp.path().join("dist");
    assert!(dist.join("main.js").is_file());
    assert!(dist.join("main.css").is_file());
    assert!(dist.join("main.js.map").is_file());
    let html = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(html.contains("<title>Demo</title>"));
    assert!(html.contains("src=\"main.js\""));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dist.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["files"]["main.js"], "main.js");
    assert_eq!(manifest["entrypoints"]["main"]["css"][0], "main.css");
}

#[test]
fn test_build_from_flags_in_production() {
    let temp = project();

    bale(temp.path())
        .args([
            "build",
            "--entry",
            "app=src/index.js",
            "--out-dir",
            "public",
            "--mode",
            "production",
        ])
        .assert()
        .success();

    let out = temp.path().join("public");
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    let app = manifest["files"]["app.js"].as_str().unwrap();
    assert!(app.starts_with("app.") && app.ends_with(".js") && app != "app.js");
    assert!(out.join(app).is_file());
    assert!(manifest["files"].get("app.js.map").is_none());
}

#[test]
fn test_node_env_selects_mode() {
    let temp = project();
    fs::write(
        temp.path().join("bale.config.json"),
        r#"{ "context": "src", "entry": { "main": "./index.js" } }"#,
    )
    .unwrap();

    bale(temp.path())
        .env("NODE_ENV", "production")
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("production mode"));

    assert!(!temp.path().join("dist/main.js").exists());
}

#[test]
fn test_unresolved_import_fails_without_output() {
    let temp = project();
    fs::write(
        temp.path().join("src/index.js"),
        "import './nope.js';\n",
    )
    .unwrap();

    bale(temp.path())
        .args(["build", "--entry", "main=src/index.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("./nope.js"));

    assert!(!temp.path().join("dist/manifest.json").exists());
}

#[test]
fn test_missing_entry_is_reported() {
    let temp = TempDir::new().unwrap();

    bale(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field: entry"));
}

#[test]
fn test_invalid_config_value() {
    let temp = project();
    fs::write(
        temp.path().join("bale.config.json"),
        r#"{ "entry": { "main": "./src/index.js" }, "mode": "staging" }"#,
    )
    .unwrap();

    bale(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mode"));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    let temp = TempDir::new().unwrap();
    bale(temp.path())
        .args(["-v", "-q", "build"])
        .assert()
        .failure();
}

#[test]
fn test_build_help_lists_flags() {
    let temp = TempDir::new().unwrap();
    bale(temp.path())
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--entry"))
        .stdout(predicate::str::contains("--watch"));
}
